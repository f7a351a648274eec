use std::{io, path::PathBuf};

use crate::config::ConfigFileError;

/// Reasons a project cannot be resolved. Every failure is terminal: a
/// resolution either describes the whole build or nothing at all.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("File {file:?} is not under rootDir {root_dir:?}. rootDir is expected to contain all source files.")]
    RootDirViolation { file: PathBuf, root_dir: PathBuf },

    #[error("{output:?} would be written by both {first:?} and {second:?}")]
    OutputCollision {
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    #[error("Error building a directory walker for {path:?}")]
    BuildWalker {
        #[source]
        source: globwalk::GlobError,
        path: PathBuf,
    },

    #[error("Error enumerating files under {path:?}")]
    Walk {
        #[source]
        source: globwalk::WalkError,
        path: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    #[error("{config_file:?} does not set compilerOptions.outDir")]
    MissingOutDir { config_file: PathBuf },

    #[error("outDir {out_dir:?} is the working directory, outputs would be written over inputs")]
    OutDirIsWorkingDir { out_dir: PathBuf },

    #[error("outDir {out_dir:?} contains the working directory {working_dir:?}")]
    OutDirContainsWorkingDir {
        out_dir: PathBuf,
        working_dir: PathBuf,
    },

    #[error("working directory {path:?} is not an absolute path")]
    WorkingDirNotAbsolute { path: PathBuf },

    #[error("working directory {path:?} is not a directory")]
    WorkingDirNotADirectory { path: PathBuf },

    #[error("working directory {path:?} cannot be read")]
    UnreadableWorkingDir {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    #[error("invalid glob pattern {pattern:?}")]
    InvalidPattern {
        #[source]
        source: globset::Error,
        pattern: String,
    },
}
