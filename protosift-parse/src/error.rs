use std::fmt;

use miette::{Diagnostic, NamedSource, SourceCode};
use thiserror::Error;

/// A byte-offset range into the source text.
pub(crate) type Span = std::ops::Range<usize>;

/// An error that may occur while parsing a schema source file.
#[derive(Error, Diagnostic)]
#[error("{}", kind)]
#[diagnostic(forward(kind))]
pub struct ParseError {
    kind: Box<ParseErrorKind>,
    #[source_code]
    source_code: NamedSource<String>,
}

#[derive(Error, Debug, Diagnostic, PartialEq, Eq)]
pub(crate) enum ParseErrorKind {
    #[error("expected {expected}, but found '{found}'")]
    UnexpectedToken {
        expected: String,
        found: String,
        #[label("found here")]
        span: Span,
    },
    #[error("expected {expected}, but reached end of file")]
    UnexpectedEof { expected: String },
    #[error("expected an integer, but found '{value}'")]
    InvalidIntLiteral {
        value: String,
        #[label("defined here")]
        span: Span,
    },
    #[error("integer is out of range")]
    IntegerOutOfRange {
        #[label("defined here")]
        span: Span,
    },
    #[error("unterminated string")]
    UnterminatedString {
        #[label("string starts here")]
        span: Span,
    },
    #[error("unterminated block comment")]
    UnterminatedComment {
        #[label("comment starts here")]
        span: Span,
    },
    #[error("multiple package names specified")]
    DuplicatePackage {
        #[label("defined here…")]
        first: Span,
        #[label("…and again here")]
        second: Span,
    },
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, name: &str, source: String) -> Self {
        ParseError {
            kind: Box::new(kind),
            source_code: NamedSource::new(name, source),
        }
    }

    /// Gets the name of the file in which this error occurred.
    pub fn file(&self) -> &str {
        self.source_code.name()
    }

    /// Gets the primary source span associated with this error, if any.
    pub fn span(&self) -> Option<Span> {
        match &*self.kind {
            ParseErrorKind::UnexpectedToken { span, .. } => Some(span.clone()),
            ParseErrorKind::UnexpectedEof { .. } => None,
            ParseErrorKind::InvalidIntLiteral { span, .. } => Some(span.clone()),
            ParseErrorKind::IntegerOutOfRange { span } => Some(span.clone()),
            ParseErrorKind::UnterminatedString { span } => Some(span.clone()),
            ParseErrorKind::UnterminatedComment { span } => Some(span.clone()),
            ParseErrorKind::DuplicatePackage { second, .. } => Some(second.clone()),
        }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> ParseErrorKind {
        *self.kind
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span_contents = self
            .span()
            .and_then(|span| self.source_code.read_span(&span.into(), 0, 0).ok());
        match span_contents {
            Some(contents) => write!(
                f,
                "{}:{}:{}: {}",
                self.file(),
                contents.line() + 1,
                contents.column() + 1,
                self
            ),
            None => write!(f, "{}: {}", self.file(), self),
        }
    }
}
