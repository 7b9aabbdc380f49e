use std::{
    collections::{HashMap, HashSet, VecDeque},
    fmt,
    path::{Path, PathBuf},
};

use protosift_parse::ast::{ProtoFile, Type};

use crate::{
    error::{Error, ErrorKind},
    file::{Filesystem, OsFilesystem},
    Schema,
};

/// Loads a set of schema files and every file they transitively import.
///
/// Imports are resolved against a list of search directories, tried in
/// order. Each file is parsed at most once, keyed by its resolved path, so
/// diamond-shaped import graphs do not produce duplicates.
pub struct Loader<F = OsFilesystem> {
    filesystem: F,
    search_directories: Vec<PathBuf>,
}

impl Loader<OsFilesystem> {
    /// Creates a new loader reading from the local filesystem.
    pub fn new(search_directories: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Loader::with_filesystem(OsFilesystem::new(), search_directories)
    }
}

impl<F> Loader<F>
where
    F: Filesystem,
{
    /// Creates a new loader reading from the given [`Filesystem`].
    pub fn with_filesystem(
        filesystem: F,
        search_directories: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        Loader {
            filesystem,
            search_directories: search_directories.into_iter().map(Into::into).collect(),
        }
    }

    /// Loads `entry_files` and the transitive closure of their imports.
    ///
    /// Entry files may be given as paths to existing files, or as names
    /// relative to one of the search directories, like imports.
    ///
    /// Files appear in the returned [`Schema`] in the order they were
    /// reached, entry files first.
    pub fn load(
        &self,
        entry_files: impl IntoIterator<Item = impl AsRef<Path>>,
    ) -> Result<Schema, Error> {
        let mut queue = VecDeque::new();
        for entry in entry_files {
            queue.push_back(self.resolve_entry(entry.as_ref())?);
        }

        let mut seen = HashSet::new();
        let mut files = Vec::new();
        while let Some(path) = queue.pop_front() {
            if !seen.insert(path.clone()) {
                continue;
            }

            let source = self.filesystem.contents_utf8(&path)?;
            let file = protosift_parse::parse(&display_name(&path), &source)?;

            for dependency in &file.dependencies {
                let resolved = self.resolve_import(dependency, &path)?;
                if !seen.contains(&resolved) {
                    queue.push_back(resolved);
                }
            }

            files.push(file);
        }

        Ok(Schema { files })
    }

    fn resolve_entry(&self, path: &Path) -> Result<PathBuf, Error> {
        if self.filesystem.is_file(path) {
            return Ok(path.to_owned());
        }

        for directory in &self.search_directories {
            let candidate = directory.join(path);
            if self.filesystem.is_file(&candidate) {
                return Ok(candidate);
            }
        }

        Err(Error::from_kind(ErrorKind::FileNotFound {
            path: path.to_owned(),
            searched: self.search_directories.clone(),
        }))
    }

    fn resolve_import(&self, name: &str, referenced_by: &Path) -> Result<PathBuf, Error> {
        for directory in &self.search_directories {
            let candidate = directory.join(name);
            if self.filesystem.is_file(&candidate) {
                return Ok(candidate);
            }
        }

        Err(Error::from_kind(ErrorKind::ImportNotFound {
            name: name.to_owned(),
            referenced_by: referenced_by.to_owned(),
            searched: self.search_directories.clone(),
        }))
    }
}

impl<F> fmt::Debug for Loader<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("search_directories", &self.search_directories)
            .finish_non_exhaustive()
    }
}

/// The name a file is known by in diagnostics and in
/// [`ProtoFile::file_name`]: the last component of its path.
fn display_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    }
}

/// Collects the fully qualified name of every type declared in `files`,
/// including nested types.
///
/// Fails if the same fully qualified name is declared in two files.
pub(crate) fn collect_type_names(files: &[ProtoFile]) -> Result<HashSet<String>, Error> {
    let mut names: HashMap<String, String> = HashMap::new();
    for file in files {
        let mut queue: VecDeque<&Type> = file.types.iter().collect();
        while let Some(ty) = queue.pop_front() {
            let name = ty.fully_qualified_name();
            if let Some(first_file) = names.get(name) {
                return Err(Error::from_kind(ErrorKind::DuplicateType {
                    name: name.to_owned(),
                    first_file: first_file.clone(),
                    second_file: file.file_name.clone(),
                }));
            }
            names.insert(name.to_owned(), file.file_name.clone());
            queue.extend(ty.nested_types());
        }
    }

    Ok(names.into_keys().collect())
}
