//! Work out which source files a TypeScript project compiles, and where the
//! compiler writes each of them. The answer is a list of compilation units
//! sorted by their path below the project's root directory.
//!
//! The rules follow the [include], [exclude], [rootDir] and [outDir]
//! settings of `tsconfig.json`:
//!
//! - `node_modules` and `outDir` are never part of the compilation, whatever
//!   `include` says.
//! - `exclude` only filters what `include` selected. A file referenced by a
//!   compiled file is compiled too, even when excluded.
//! - Without `rootDir`, the root is the longest common ancestor of the
//!   non-declaration source files. Every compiled file must live below it.
//! - Outputs mirror the layout below the root inside `outDir`.
//!
//! From the [tsconfig exclude] documentation:
//!
//! > Important: `exclude` *only* changes which files are included as a result
//! > of the `include` setting. A file specified by exclude can still become
//! > part of your codebase due to an import statement in your code, a types
//! > inclusion, a `/// <reference` directive, or being specified in the
//! > `files` list.
//!
//! Source files are not parsed here. Callers that know which files reference
//! which list those references in the [`SourceTree`].
//!
//! Resolution is a pure function of a [`SourceTree`] snapshot and a
//! [`ProjectConfig`]; re-running it after a change on disk means taking a
//! new snapshot.
//!
//! [include]: https://www.typescriptlang.org/tsconfig#include
//! [exclude]: https://www.typescriptlang.org/tsconfig#exclude
//! [rootDir]: https://www.typescriptlang.org/tsconfig#rootDir
//! [outDir]: https://www.typescriptlang.org/tsconfig#outDir
//! [tsconfig exclude]: https://www.typescriptlang.org/tsconfig#exclude

#![forbid(unsafe_code)]
#![deny(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod find_up;
mod path;
mod pattern;
pub mod resolve;
pub mod source_tree;

pub use config::ProjectConfig;
pub use error::{ConfigurationError, Error};
pub use find_up::find_tsconfig;
pub use path::DEPENDENCY_DIRECTORY;
pub use resolve::{
    resolve, resolve_tsconfig_file, resolve_tsconfig_files, CompilationUnit, Resolution,
};
pub use source_tree::{SourceFile, SourceTree};
