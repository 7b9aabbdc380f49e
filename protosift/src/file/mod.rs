//! Access to schema source files.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::error::{Error, ErrorKind};

/// A source of schema files.
///
/// The [`Loader`](crate::Loader) reads every file it loads through this
/// trait, so schemas can be compiled from sources other than the local
/// filesystem, such as an in-memory map in tests.
pub trait Filesystem {
    /// Returns whether `path` exists, as a file or a directory.
    fn exists(&self, path: &Path) -> bool;

    /// Returns whether `path` is an existing file.
    fn is_file(&self, path: &Path) -> bool;

    /// Returns whether `path` is an existing directory.
    fn is_directory(&self, path: &Path) -> bool;

    /// Lists the direct children of the directory at `path`.
    fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>, Error>;

    /// Reads the file at `path` as UTF-8 text.
    fn contents_utf8(&self, path: &Path) -> Result<String, Error>;
}

impl<T> Filesystem for Box<T>
where
    T: Filesystem + ?Sized,
{
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        (**self).is_file(path)
    }

    fn is_directory(&self, path: &Path) -> bool {
        (**self).is_directory(path)
    }

    fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>, Error> {
        (**self).list_files(path)
    }

    fn contents_utf8(&self, path: &Path) -> Result<String, Error> {
        (**self).contents_utf8(path)
    }
}

/// A [`Filesystem`] backed by the local filesystem.
#[derive(Debug, Default)]
pub struct OsFilesystem {
    _priv: (),
}

impl OsFilesystem {
    pub fn new() -> Self {
        OsFilesystem::default()
    }
}

impl Filesystem for OsFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>, Error> {
        let entries = fs::read_dir(path).map_err(|err| open_err(path, err))?;

        let mut files = Vec::new();
        for entry in entries {
            files.push(entry.map_err(|err| open_err(path, err))?.path());
        }
        files.sort();
        Ok(files)
    }

    fn contents_utf8(&self, path: &Path) -> Result<String, Error> {
        let bytes = fs::read(path).map_err(|err| open_err(path, err))?;
        String::from_utf8(bytes).map_err(|_| {
            Error::from_kind(ErrorKind::FileInvalidUtf8 {
                path: path.to_owned(),
            })
        })
    }
}

/// An in-memory [`Filesystem`], useful for compiling schemas without
/// touching the disk.
///
/// # Examples
///
/// ```
/// # use protosift::file::{Filesystem, MemoryFilesystem};
/// # use std::path::Path;
/// let mut filesystem = MemoryFilesystem::new();
/// filesystem.add("wire/person.proto", "message Person {}");
///
/// assert!(filesystem.is_file(Path::new("wire/person.proto")));
/// assert!(filesystem.is_directory(Path::new("wire")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        MemoryFilesystem::default()
    }

    /// Adds a file at `path` with the given contents, replacing any
    /// previous file at that path.
    pub fn add(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_directory(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn is_directory(&self, path: &Path) -> bool {
        !self.files.contains_key(path) && self.files.keys().any(|file| file.starts_with(path))
    }

    fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>, Error> {
        let mut children = Vec::new();
        for file in self.files.keys() {
            let Ok(relative) = file.strip_prefix(path) else {
                continue;
            };
            if let Some(component) = relative.components().next() {
                let child = path.join(component);
                if children.last() != Some(&child) {
                    children.push(child);
                }
            }
        }
        Ok(children)
    }

    fn contents_utf8(&self, path: &Path) -> Result<String, Error> {
        match self.files.get(path) {
            Some(contents) => Ok(contents.clone()),
            None => Err(open_err(
                path,
                io::Error::new(io::ErrorKind::NotFound, "file not found"),
            )),
        }
    }
}

fn open_err(path: &Path, err: io::Error) -> Error {
    Error::from_kind(ErrorKind::OpenFile {
        path: path.to_owned(),
        err,
    })
}
