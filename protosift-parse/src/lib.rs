//! Parsing of `.proto` schema source files.
//!
//! This crate turns a single schema source file into the declaration model
//! in [`ast`]: packages, imports, options, messages, enums, services and
//! extend declarations, with documentation comments attached to the
//! declaration they precede. Type references are left exactly as written;
//! resolving them against the whole file universe is the job of the
//! `protosift` crate.
//!
//! # Examples
//!
//! ```
//! let file = protosift_parse::parse("person.proto", "
//!     package wire;
//!
//!     // An individual.
//!     message Person {
//!         required string name = 1;
//!     }
//! ").unwrap();
//!
//! assert_eq!(file.package_name.as_deref(), Some("wire"));
//! assert_eq!(file.types[0].fully_qualified_name(), "wire.Person");
//! ```
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod ast;

mod error;
mod lex;
mod parse;

pub use self::error::ParseError;

/// Parses a single schema source file into a [`ast::ProtoFile`].
///
/// `name` is used only in diagnostics and becomes
/// [`file_name`](ast::ProtoFile::file_name) on the result.
///
/// # Errors
///
/// The first malformed construct aborts the parse of the file; there is no
/// error recovery. The returned [`ParseError`] carries the file name and
/// the source position of the offending construct.
pub fn parse(name: &str, source: &str) -> Result<ast::ProtoFile, ParseError> {
    parse::parse_file(name, source).map_err(|kind| ParseError::new(kind, name, source.to_owned()))
}
