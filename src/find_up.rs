use std::path::{Path, PathBuf};

const TSCONFIG_FILE_NAME: &str = "tsconfig.json";

/// Find the `tsconfig.json` governing `starting_from` (a file or a
/// directory) by walking up towards the filesystem root, the way `tsc`
/// locates a project when none is named.
pub fn find_tsconfig<P: AsRef<Path>>(starting_from: P) -> Option<PathBuf> {
    let starting_from = starting_from.as_ref();
    let mut directory = if starting_from.is_dir() {
        starting_from.to_owned()
    } else {
        starting_from.parent()?.to_owned()
    };

    loop {
        let candidate = directory.join(TSCONFIG_FILE_NAME);
        if candidate.is_file() {
            break Some(candidate);
        }
        if !directory.pop() {
            break None;
        }
    }
}
