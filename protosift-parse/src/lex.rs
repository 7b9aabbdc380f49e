use crate::error::{ParseErrorKind, Span};


/// The largest tag value usable by a field, `2^29 - 1`.
pub(crate) const MAX_TAG: i32 = 536_870_911;

/// A character-level cursor over a schema source file.
///
/// All reading primitives skip leading whitespace and comments, so the
/// parser only ever sees significant characters. Documentation comments are
/// the exception: [`read_documentation`](Lexer::read_documentation) must run
/// before a declaration is consumed, while the comments are still ahead of
/// the cursor.
pub(crate) struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.src[self.pos..].starts_with(prefix)
    }

    /// Advances past spaces, tabs and newlines, and optionally past `//` and
    /// `/*...*/` comments. An unterminated block comment is consumed to end
    /// of input; the next read reports the end of file.
    pub fn skip_whitespace(&mut self, skip_comments: bool) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\n') => {
                    self.bump();
                }
                Some('/') if skip_comments && self.starts_with("//") => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.bump();
                    }
                }
                Some('/') if skip_comments && self.starts_with("/*") => {
                    self.bump();
                    self.bump();
                    while !self.starts_with("*/") && self.peek().is_some() {
                        self.bump();
                    }
                    self.bump();
                    self.bump();
                }
                _ => return,
            }
        }
    }

    pub fn at_eof(&mut self) -> bool {
        self.skip_whitespace(true);
        self.pos == self.src.len()
    }

    /// Returns the next significant character without consuming it.
    pub fn peek_char(&mut self, expected: &str) -> Result<char, ParseErrorKind> {
        self.skip_whitespace(true);
        self.peek().ok_or_else(|| ParseErrorKind::UnexpectedEof {
            expected: expected.to_owned(),
        })
    }

    /// Consumes and returns the next significant character.
    pub fn read_char(&mut self, expected: &str) -> Result<char, ParseErrorKind> {
        let ch = self.peek_char(expected)?;
        self.pos += ch.len_utf8();
        Ok(ch)
    }

    /// Consumes one already-peeked significant character.
    pub fn skip_char(&mut self) {
        self.skip_whitespace(true);
        self.bump();
    }

    /// Consumes the next significant character, which must be `expected`.
    pub fn expect_char(&mut self, expected: char) -> Result<(), ParseErrorKind> {
        self.skip_whitespace(true);
        match self.peek() {
            None => Err(ParseErrorKind::UnexpectedEof {
                expected: format!("'{}'", expected),
            }),
            Some(ch) if ch == expected => {
                self.bump();
                Ok(())
            }
            Some(ch) => Err(ParseErrorKind::UnexpectedToken {
                expected: format!("'{}'", expected),
                found: ch.to_string(),
                span: self.pos..self.pos + ch.len_utf8(),
            }),
        }
    }

    fn is_word_char(ch: char) -> bool {
        ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-')
    }

    /// Greedily consumes `[A-Za-z0-9_.-]+`; fails if nothing was consumed.
    pub fn read_word(&mut self) -> Result<(&'a str, Span), ParseErrorKind> {
        self.skip_whitespace(true);
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if Self::is_word_char(ch)) {
            self.bump();
        }
        if self.pos == start {
            return match self.peek() {
                None => Err(ParseErrorKind::UnexpectedEof {
                    expected: "a word".to_owned(),
                }),
                Some(ch) => Err(ParseErrorKind::UnexpectedToken {
                    expected: "a word".to_owned(),
                    found: ch.to_string(),
                    span: self.pos..self.pos + ch.len_utf8(),
                }),
            };
        }
        Ok((&self.src[start..self.pos], start..self.pos))
    }

    /// Like [`read_word`](Lexer::read_word), but unwraps a single layer of
    /// `(...)` or `[...]` extension-option syntax around the word.
    pub fn read_name(&mut self) -> Result<(&'a str, Span), ParseErrorKind> {
        match self.peek_char("a name")? {
            '(' => {
                self.bump();
                let (name, span) = self.read_word()?;
                self.expect_char(')')?;
                Ok((name, span))
            }
            '[' => {
                self.bump();
                let (name, span) = self.read_word()?;
                self.expect_char(']')?;
                Ok((name, span))
            }
            _ => self.read_word(),
        }
    }

    /// Consumes a `"`-delimited string honoring backslash escapes.
    pub fn read_quoted_string(&mut self) -> Result<String, ParseErrorKind> {
        self.skip_whitespace(true);
        let start = self.pos;
        self.expect_char('"')?;

        let mut result = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(ParseErrorKind::UnterminatedString {
                        span: start..self.pos,
                    })
                }
                Some('"') => {
                    self.bump();
                    return Ok(result);
                }
                Some('\\') => {
                    self.bump();
                    match self.bump() {
                        None => {
                            return Err(ParseErrorKind::UnterminatedString {
                                span: start..self.pos,
                            })
                        }
                        Some('n') => result.push('\n'),
                        Some('r') => result.push('\r'),
                        Some('t') => result.push('\t'),
                        Some('0') => result.push('\0'),
                        Some(ch) => result.push(ch),
                    }
                }
                Some(ch) => {
                    self.bump();
                    result.push(ch);
                }
            }
        }
    }

    /// Reads a word and parses it as a decimal or `0x`-prefixed hex integer.
    pub fn read_int(&mut self) -> Result<i32, ParseErrorKind> {
        let (word, span) = self.read_word()?;
        parse_int(word, span)
    }

    /// Collects the contiguous run of `//` and `/*...*/` comments before the
    /// next declaration, stripping per-line comment markers. Returns an
    /// empty string if no comment precedes the declaration.
    pub fn read_documentation(&mut self) -> Result<String, ParseErrorKind> {
        let mut lines: Vec<String> = Vec::new();
        loop {
            self.skip_whitespace(false);
            if self.starts_with("//") {
                let start = self.pos;
                while !matches!(self.peek(), None | Some('\n')) {
                    self.bump();
                }
                lines.push(clean_documentation_line(&self.src[start..self.pos]));
            } else if self.starts_with("/*") {
                let start = self.pos;
                self.bump();
                self.bump();
                let body_start = self.pos;
                while !self.starts_with("*/") {
                    if self.bump().is_none() {
                        return Err(ParseErrorKind::UnterminatedComment {
                            span: start..start + 2,
                        });
                    }
                }
                let body = &self.src[body_start..self.pos];
                self.bump();
                self.bump();
                lines.extend(body.lines().map(clean_documentation_line));
            } else {
                break;
            }
        }

        Ok(lines.join("\n").trim_matches('\n').to_owned())
    }
}

/// Parses a previously-read word as an integer literal.
pub(crate) fn parse_int(word: &str, span: Span) -> Result<i32, ParseErrorKind> {
    let (negative, body) = match word.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, word),
    };

    let parsed = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => i64::from_str_radix(hex, 16),
        _ => body.parse::<i64>(),
    };

    match parsed {
        Err(_) => Err(ParseErrorKind::InvalidIntLiteral {
            value: word.to_owned(),
            span,
        }),
        Ok(value) => {
            let value = if negative { -value } else { value };
            i32::try_from(value).map_err(|_| ParseErrorKind::IntegerOutOfRange { span })
        }
    }
}

/// Strips the comment markers and surrounding whitespace from one line of a
/// documentation comment.
fn clean_documentation_line(line: &str) -> String {
    line.trim()
        .trim_start_matches(|ch: char| ch == '/' || ch == '*' || ch.is_whitespace())
        .trim_end()
        .to_owned()
}
