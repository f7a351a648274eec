use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    iter,
    path::{Path, PathBuf},
};

use log::{debug, trace};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    config::ProjectConfig,
    error::{ConfigurationError, Error},
    path::{
        self, is_in_dependency_directory, normalize, output_file_name, resolve_against, to_slash,
    },
    pattern::PatternSet,
    source_tree::{SourceFile, SourceTree},
};

/// A source file selected for compilation, and where its output goes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationUnit {
    pub source_path: PathBuf,
    /// Path below the resolved root directory, `/`-separated. Never starts
    /// with `..`.
    pub relative_path: String,
    pub output_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_map_path: Option<PathBuf>,
    pub is_declaration: bool,
}

/// The build plan of one project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub root_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Sorted by `relative_path`.
    pub units: Vec<CompilationUnit>,
}

/// Decide which files of `tree` are compiled under `config`, and where each
/// compiled file is written.
///
/// 1. The dependency directory and `outDir` are dropped from the listing.
/// 2. A file is kept if an `include` pattern matches it ...
/// 3. ... and no `exclude` pattern does.
/// 4. Files referenced by kept files are added back, transitively, even
///    when an `exclude` pattern matched them.
/// 5. The root directory is `rootDir` when configured, otherwise the
///    common ancestor of the kept non-declaration files (widened to contain
///    the kept declaration files too).
/// 6. Every kept file must live under the root directory.
/// 7. Outputs mirror the root directory's layout inside `outDir`, and no two
///    sources may be written to the same output.
pub fn resolve(tree: &SourceTree, config: &ProjectConfig) -> Result<Resolution, Error> {
    if !tree.working_dir().is_absolute() {
        return Err(ConfigurationError::WorkingDirNotAbsolute {
            path: tree.working_dir().to_owned(),
        }
        .into());
    }
    let working_dir = normalize(tree.working_dir());
    let out_dir = resolve_against(&working_dir, &config.out_dir);
    if out_dir == working_dir {
        return Err(ConfigurationError::OutDirIsWorkingDir { out_dir }.into());
    }
    if working_dir.starts_with(&out_dir) {
        return Err(ConfigurationError::OutDirContainsWorkingDir {
            out_dir,
            working_dir,
        }
        .into());
    }

    let patterns = PatternSet::new(
        &config.include,
        &config.exclude,
        config.recognized_extensions(),
    )?;

    let is_eligible = |file: &SourceFile| -> bool {
        !is_in_dependency_directory(file.relative_path())
            && !absolute_path(&working_dir, file).starts_with(&out_dir)
    };

    let mut surviving: BTreeSet<&str> = tree
        .files()
        .filter(|file| is_eligible(*file))
        .map(SourceFile::relative_path)
        .filter(|relative_path| {
            patterns.is_included(relative_path) && !patterns.is_excluded(relative_path)
        })
        .collect();
    debug!(
        "{} of {} files under {:?} selected by include/exclude",
        surviving.len(),
        tree.len(),
        working_dir
    );

    reinclude_referenced_files(tree, &mut surviving, is_eligible);

    let surviving: Vec<(&SourceFile, PathBuf)> = surviving
        .into_iter()
        .filter_map(|relative_path| tree.get(relative_path))
        .map(|file| (file, absolute_path(&working_dir, file)))
        .collect();

    let root_dir = match &config.root_dir {
        Some(root_dir) => resolve_against(&working_dir, root_dir),
        None => infer_root_dir(&working_dir, &surviving),
    };
    debug!("rootDir: {:?}, outDir: {:?}", root_dir, out_dir);

    let mut units = surviving
        .into_iter()
        .map(|(file, source_path)| {
            compilation_unit(file, source_path, &root_dir, &out_dir, config)
        })
        .collect::<Result<Vec<_>, _>>()?;
    units.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    check_output_collisions(&units)?;

    trace!("compilation units: {:?}", units);
    Ok(Resolution {
        root_dir,
        out_dir,
        units,
    })
}

/// Read `tsconfig_file`, snapshot the directory holding it and resolve the
/// project.
pub fn resolve_tsconfig_file<P: AsRef<Path>>(tsconfig_file: P) -> Result<Resolution, Error> {
    let (working_dir, config) = ProjectConfig::from_tsconfig_file(tsconfig_file)?;
    let tree = SourceTree::from_directory(&working_dir)?;
    resolve(&tree, &config)
}

/// Resolve several independent projects, keyed by the tsconfig file each
/// one was read from. Projects are resolved in parallel; the first failure
/// is returned.
pub fn resolve_tsconfig_files<P>(
    tsconfig_files: &[P],
) -> Result<BTreeMap<PathBuf, Resolution>, Error>
where
    P: AsRef<Path> + Sync,
{
    tsconfig_files
        .par_iter()
        .map(|tsconfig_file| -> Result<(_, _), Error> {
            let resolution = resolve_tsconfig_file(tsconfig_file)?;
            Ok((tsconfig_file.as_ref().to_owned(), resolution))
        })
        .collect()
}

fn absolute_path(working_dir: &Path, file: &SourceFile) -> PathBuf {
    resolve_against(working_dir, Path::new(file.relative_path()))
}

/// Follow references out of the surviving set until nothing new turns up.
/// The surviving set doubles as the visited set, which is what stops
/// reference cycles.
fn reinclude_referenced_files<'a, F>(
    tree: &'a SourceTree,
    surviving: &mut BTreeSet<&'a str>,
    is_eligible: F,
) where
    F: Fn(&SourceFile) -> bool,
{
    let mut pending: VecDeque<&'a str> = surviving.iter().copied().collect();
    while let Some(relative_path) = pending.pop_front() {
        let Some(file) = tree.get(relative_path) else {
            continue;
        };
        for reference in file.referenced_paths() {
            let Some(referenced) = tree.get(reference) else {
                debug!(
                    "{:?} references {:?}, which is not in the source tree",
                    relative_path, reference
                );
                continue;
            };
            if !is_eligible(referenced) {
                trace!(
                    "not re-including {:?}: dependency directory or outDir",
                    reference
                );
                continue;
            }
            if surviving.insert(referenced.relative_path()) {
                debug!(
                    "re-including {:?}, referenced by {:?}",
                    reference, relative_path
                );
                pending.push_back(referenced.relative_path());
            }
        }
    }
}

fn infer_root_dir(working_dir: &Path, files: &[(&SourceFile, PathBuf)]) -> PathBuf {
    let directories = |declarations: bool| {
        files
            .iter()
            .filter(move |(file, _)| file.is_declaration() == declarations)
            .filter_map(|(_, source_path)| source_path.parent())
    };

    match path::common_ancestor(directories(false)) {
        // Declaration files do not steer the inference, but the root still
        // has to contain them.
        Some(ancestor) => path::common_ancestor(
            iter::once(ancestor.as_path()).chain(directories(true)),
        )
        .unwrap_or_else(|| ancestor.clone()),
        None => working_dir.to_owned(),
    }
}

fn compilation_unit(
    file: &SourceFile,
    source_path: PathBuf,
    root_dir: &Path,
    out_dir: &Path,
    config: &ProjectConfig,
) -> Result<CompilationUnit, Error> {
    // A rootDir naming the file itself leaves nothing to mirror.
    let relative_to_root = match source_path.strip_prefix(root_dir) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative.to_owned(),
        _ => {
            return Err(Error::RootDirViolation {
                file: source_path,
                root_dir: root_dir.to_owned(),
            })
        }
    };

    let file_name = relative_to_root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let output_path = out_dir.join(
        relative_to_root.with_file_name(output_file_name(&file_name, file.is_declaration())),
    );
    let source_map_path = (config.source_map && !file.is_declaration()).then(|| {
        let mut source_map = output_path.clone().into_os_string();
        source_map.push(".map");
        PathBuf::from(source_map)
    });

    Ok(CompilationUnit {
        relative_path: to_slash(&relative_to_root),
        source_path,
        output_path,
        source_map_path,
        is_declaration: file.is_declaration(),
    })
}

/// `a.ts` next to `a.tsx`, or `b.ts` next to `b.js` under `allowJs`, both
/// compile to the same file.
fn check_output_collisions(units: &[CompilationUnit]) -> Result<(), Error> {
    let mut outputs: BTreeMap<&Path, &Path> = BTreeMap::new();
    for unit in units {
        if let Some(first) = outputs.insert(&unit.output_path, &unit.source_path) {
            return Err(Error::OutputCollision {
                output: unit.output_path.clone(),
                first: first.to_owned(),
                second: unit.source_path.clone(),
            });
        }
    }
    Ok(())
}
