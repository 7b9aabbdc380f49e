use std::{fmt, io, path::PathBuf};

use miette::Diagnostic;
use protosift_parse::ParseError;
use thiserror::Error;

/// An error that can occur when loading, qualifying or filtering schema
/// files.
#[derive(Diagnostic, Error)]
#[error(transparent)]
#[diagnostic(transparent)]
pub struct Error {
    kind: Box<ErrorKind>,
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum ErrorKind {
    #[error("{}", err)]
    #[diagnostic(forward(err))]
    Parse { err: ParseError },
    #[error("error opening file '{}'", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        err: io::Error,
    },
    #[error("file '{}' is not valid utf-8", path.display())]
    FileInvalidUtf8 { path: PathBuf },
    #[error("file '{}' not found", path.display())]
    #[diagnostic(help("searched directories: {}", format_directories(searched)))]
    FileNotFound {
        path: PathBuf,
        searched: Vec<PathBuf>,
    },
    #[error("import '{name}' not found (imported by '{}')", referenced_by.display())]
    #[diagnostic(help("searched directories: {}", format_directories(searched)))]
    ImportNotFound {
        name: String,
        referenced_by: PathBuf,
        searched: Vec<PathBuf>,
    },
    #[error("duplicate declaration of type '{name}' in '{first_file}' and '{second_file}'")]
    DuplicateType {
        name: String,
        first_file: String,
        second_file: String,
    },
    #[error("unknown type '{name}' in '{scope}'")]
    UnknownType { name: String, scope: String },
    #[error("unknown type '{name}'")]
    UnknownRoot { name: String },
}

impl Error {
    pub(crate) fn from_kind(kind: ErrorKind) -> Self {
        Error {
            kind: Box::new(kind),
        }
    }

    #[cfg(test)]
    pub(crate) fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns true if this error is caused by an invalid schema source
    /// file.
    pub fn is_parse(&self) -> bool {
        matches!(&*self.kind, ErrorKind::Parse { .. })
    }

    /// Returns true if this error is caused by a missing file or import.
    pub fn is_file_not_found(&self) -> bool {
        matches!(
            &*self.kind,
            ErrorKind::FileNotFound { .. } | ErrorKind::ImportNotFound { .. }
        )
    }

    /// Returns true if this error is caused by an IO error while opening a
    /// file.
    pub fn is_io(&self) -> bool {
        matches!(&*self.kind, ErrorKind::OpenFile { .. })
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::from_kind(ErrorKind::Parse { err })
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.kind {
            ErrorKind::Parse { err } => err.fmt(f),
            ErrorKind::OpenFile { err, .. } => write!(f, "{}: {}", self, err),
            _ => write!(f, "{}", self),
        }
    }
}

fn format_directories(directories: &[PathBuf]) -> String {
    let mut result = String::new();
    for directory in directories {
        if !result.is_empty() {
            result.push_str(", ");
        }
        result.push('\'');
        result.push_str(&directory.display().to_string());
        result.push('\'');
    }
    result
}
