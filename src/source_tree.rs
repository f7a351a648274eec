use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use globwalk::{FileType, GlobWalkerBuilder};
use log::{debug, trace};

use crate::{
    error::{ConfigurationError, Error},
    path::{self, DEPENDENCY_DIRECTORY},
};

/// One file of a project snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    relative_path: String,
    is_declaration: bool,
    references: Vec<String>,
}

impl SourceFile {
    /// `relative_path` is relative to the working directory. Whether the
    /// file is declaration-only is derived from its name.
    pub fn new<S: AsRef<str>>(relative_path: S) -> Self {
        let relative_path = path::normalize_relative(relative_path.as_ref());
        let file_name = relative_path.rsplit('/').next().unwrap_or(&relative_path);
        let is_declaration = path::is_declaration_file(file_name);
        Self {
            relative_path,
            is_declaration,
            references: Vec::new(),
        }
    }

    pub fn declaration(mut self, is_declaration: bool) -> Self {
        self.is_declaration = is_declaration;
        self
    }

    /// Files this one imports or otherwise pulls into the compilation, as
    /// paths relative to the working directory (not to this file).
    pub fn references<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.references = references
            .into_iter()
            .map(|reference| path::normalize_relative(reference.as_ref()))
            .collect();
        self
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn is_declaration(&self) -> bool {
        self.is_declaration
    }

    pub fn referenced_paths(&self) -> &[String] {
        &self.references
    }
}

impl From<&str> for SourceFile {
    fn from(relative_path: &str) -> Self {
        Self::new(relative_path)
    }
}

/// Read-only listing of the files under a working directory. It is either
/// assembled by the caller or scanned from disk, and is never refreshed
/// behind the caller's back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceTree {
    working_dir: PathBuf,
    files: BTreeMap<String, SourceFile>,
}

impl SourceTree {
    pub fn new<P: Into<PathBuf>>(working_dir: P) -> Self {
        Self {
            working_dir: working_dir.into(),
            files: BTreeMap::new(),
        }
    }

    /// Add `file`, replacing any file already listed at the same path.
    pub fn insert(&mut self, file: SourceFile) {
        self.files.insert(file.relative_path.clone(), file);
    }

    pub fn with_file<F: Into<SourceFile>>(mut self, file: F) -> Self {
        self.insert(file.into());
        self
    }

    /// Record that `from` references `to`. Returns `false` when `from` is
    /// not part of the tree.
    pub fn add_reference<S, T>(&mut self, from: S, to: T) -> bool
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let from = path::normalize_relative(from.as_ref());
        match self.files.get_mut(&from) {
            Some(file) => {
                file.references
                    .push(path::normalize_relative(to.as_ref()));
                true
            }
            None => false,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn get(&self, relative_path: &str) -> Option<&SourceFile> {
        self.files.get(relative_path)
    }

    /// Files in lexicographic order of their relative path.
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Snapshot every file under `working_dir`. The dependency directory is
    /// pruned during the walk. No source is parsed, so the files carry no
    /// references.
    pub fn from_directory<P: AsRef<Path>>(working_dir: P) -> Result<Self, Error> {
        let requested = working_dir.as_ref();
        let unreadable = |source| ConfigurationError::UnreadableWorkingDir {
            source,
            path: requested.to_owned(),
        };

        let metadata = fs::metadata(requested).map_err(unreadable)?;
        if !metadata.is_dir() {
            return Err(ConfigurationError::WorkingDirNotADirectory {
                path: requested.to_owned(),
            }
            .into());
        }
        // surface permission problems as configuration errors rather than
        // as a failure halfway through the walk
        fs::read_dir(requested).map_err(unreadable)?;
        let working_dir = fs::canonicalize(requested).map_err(unreadable)?;

        let patterns = [String::from("**"), format!("!{DEPENDENCY_DIRECTORY}")];
        let walker = GlobWalkerBuilder::from_patterns(&working_dir, &patterns[..])
            .file_type(FileType::FILE)
            .build()
            .map_err(|source| Error::BuildWalker {
                source,
                path: working_dir.clone(),
            })?;

        let mut tree = Self::new(&working_dir);
        for dir_entry in walker {
            let dir_entry = dir_entry.map_err(|source| Error::Walk {
                source,
                path: working_dir.clone(),
            })?;
            let Ok(relative_path) = dir_entry.path().strip_prefix(&working_dir) else {
                trace!("skipping {:?}: outside {:?}", dir_entry.path(), working_dir);
                continue;
            };
            tree.insert(SourceFile::new(path::to_slash(relative_path)));
        }

        debug!("scanned {} files under {:?}", tree.len(), working_dir);
        Ok(tree)
    }
}
