use std::path::{Component, Path, PathBuf};

/// Directory name that is never part of a compilation, whatever the
/// `include` and `exclude` settings say.
pub const DEPENDENCY_DIRECTORY: &str = "node_modules";

/// Lexically normalize `path`: `.` components are dropped and `..` removes
/// the preceding component. The filesystem is not consulted.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Resolve a configured path (absolute, or relative to `working_dir`).
pub(crate) fn resolve_against(working_dir: &Path, path: &Path) -> PathBuf {
    normalize(&working_dir.join(path))
}

/// Normalize a path relative to the working directory into its
/// `/`-separated form. Leading `..` segments are kept, since a file may
/// legitimately live next to the project rather than inside it.
pub(crate) fn normalize_relative(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            segment => segments.push(segment),
        }
    }
    segments.join("/")
}

pub(crate) fn to_slash(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Longest common ancestor of a set of directories, compared component by
/// component so that `/a/bc` and `/a/b` share `/a` and not `/a/b`.
pub(crate) fn common_ancestor<'a, I>(directories: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut directories = directories.into_iter();
    let mut ancestor: Vec<Component<'a>> = directories.next()?.components().collect();
    for directory in directories {
        let shared = ancestor
            .iter()
            .zip(directory.components())
            .take_while(|(left, right)| **left == *right)
            .count();
        ancestor.truncate(shared);
    }
    Some(ancestor.iter().collect())
}

/// Declaration-only files carry type information and no executable code;
/// by convention their name ends in `.d.<extension>`.
pub(crate) fn is_declaration_file(file_name: &str) -> bool {
    match file_name.rsplit_once('.') {
        Some((stem, _extension)) => stem.ends_with(".d"),
        None => false,
    }
}

/// Name of the artifact the compiler writes for `file_name`.
pub(crate) fn output_file_name(file_name: &str, is_declaration: bool) -> String {
    if is_declaration {
        return file_name.to_owned();
    }
    let Some((stem, extension)) = file_name.rsplit_once('.') else {
        return file_name.to_owned();
    };
    let output_extension = match extension {
        "ts" | "tsx" | "js" | "jsx" => "js",
        "mts" | "mjs" => "mjs",
        "cts" | "cjs" => "cjs",
        // explicitly included assets (json and friends) are copied verbatim
        other => other,
    };
    format!("{stem}.{output_extension}")
}

pub(crate) fn is_in_dependency_directory(relative_path: &str) -> bool {
    relative_path
        .split('/')
        .any(|segment| segment == DEPENDENCY_DIRECTORY)
}
