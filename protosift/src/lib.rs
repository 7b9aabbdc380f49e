//! A schema compiler front end for `.proto` interface definitions.
//!
//! Schemas are compiled in three stages:
//!
//! 1. The [`Loader`] reads a set of entry files and every file they
//!    transitively import, resolving import names against a list of search
//!    directories and parsing each file once.
//! 2. [`Schema::fully_qualify`] resolves every type reference to the fully
//!    qualified name of its declaration, searching enclosing scopes
//!    innermost first.
//! 3. [`Schema::retain_roots`] optionally narrows the schema to a set of
//!    root types and services plus everything they transitively reference.
//!
//! [`compile`] runs the first two stages in one call:
//!
//! ```
//! # fn main() -> Result<(), protosift::Error> {
//! # let tempdir = assert_fs::TempDir::new().unwrap();
//! # std::fs::write(tempdir.path().join("person.proto"), "
//! #     package wire;
//! #     message Person {
//! #         required string name = 1;
//! #     }
//! # ").unwrap();
//! # std::env::set_current_dir(&tempdir).unwrap();
//! let schema = protosift::compile(["person.proto"], ["."])?;
//!
//! assert_eq!(schema.type_names(), ["wire.Person"]);
//! # Ok(())
//! # }
//! ```
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod file;

mod error;
mod filter;
mod loader;
mod qualify;

use std::collections::HashSet;
use std::path::Path;

use protosift_parse::ast::{ProtoFile, Type};

pub use self::error::Error;
pub use self::loader::Loader;
pub use self::qualify::resolve_type;
pub use protosift_parse::ast;

/// Compiles the given schema files and their transitive imports, with type
/// references resolved to fully qualified names.
///
/// Equivalent to loading the files with a [`Loader`] and calling
/// [`Schema::fully_qualify`] on the result.
pub fn compile(
    files: impl IntoIterator<Item = impl AsRef<Path>>,
    includes: impl IntoIterator<Item = impl AsRef<Path>>,
) -> Result<Schema, Error> {
    Loader::new(includes.into_iter().map(|include| include.as_ref().to_owned()))
        .load(files)?
        .fully_qualify()
}

/// A set of loaded schema files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub files: Vec<ProtoFile>,
}

impl Schema {
    /// Collects the fully qualified name of every type declared in this
    /// schema, including nested types.
    ///
    /// # Errors
    ///
    /// Fails if the same fully qualified name is declared in more than one
    /// file, naming both files.
    pub fn collect_type_names(&self) -> Result<HashSet<String>, Error> {
        loader::collect_type_names(&self.files)
    }

    /// Returns a copy of this schema with every type reference rewritten
    /// to the fully qualified name of its declaration.
    ///
    /// Message fields, method request and response types, and extend
    /// declarations (their target and their fields) are all resolved. The
    /// result only contains absolute references, so applying this again is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Fails if a reference does not resolve to any declaration, or if
    /// [`collect_type_names`](Schema::collect_type_names) fails.
    pub fn fully_qualify(&self) -> Result<Schema, Error> {
        let all_types = self.collect_type_names()?;
        Ok(Schema {
            files: qualify::fully_qualify(&self.files, &all_types)?,
        })
    }

    /// Returns a copy of this schema narrowed to `roots` and everything
    /// they transitively reference.
    ///
    /// Each root is the fully qualified name of a type or service. A kept
    /// nested type keeps its enclosing types, and extend declarations are
    /// kept exactly when the type they extend is kept. Files left with no
    /// declarations are dropped. The schema must be fully qualified first,
    /// see [`fully_qualify`](Schema::fully_qualify).
    ///
    /// # Errors
    ///
    /// Fails if a root does not name any declaration.
    pub fn retain_roots(
        &self,
        roots: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Schema, Error> {
        Ok(Schema {
            files: filter::retain_roots(&self.files, roots)?,
        })
    }

    /// Returns the fully qualified name of every type declared in this
    /// schema, sorted, including nested types.
    pub fn type_names(&self) -> Vec<String> {
        fn walk(ty: &Type, out: &mut Vec<String>) {
            out.push(ty.fully_qualified_name().to_owned());
            for nested in ty.nested_types() {
                walk(nested, out);
            }
        }

        let mut names = Vec::new();
        for file in &self.files {
            for ty in &file.types {
                walk(ty, &mut names);
            }
        }
        names.sort();
        names
    }
}
