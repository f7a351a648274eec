use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::ConfigurationError;

/// Include pattern used when a project names none.
const DEFAULT_INCLUDE: &str = "**/*";

/// Compiled `include` and `exclude` globs, matched against `/`-separated
/// paths relative to the working directory.
#[derive(Debug)]
pub(crate) struct PatternSet {
    include: GlobSet,
    /// Indexed like the globs in `include`: whether a match through that
    /// glob still requires a recognized source extension.
    include_requires_recognized_extension: Vec<bool>,
    exclude: GlobSet,
    recognized_extensions: Vec<&'static str>,
}

impl PatternSet {
    pub(crate) fn new(
        include: &[String],
        exclude: &[String],
        recognized_extensions: Vec<&'static str>,
    ) -> Result<Self, ConfigurationError> {
        let default_include = [DEFAULT_INCLUDE.to_owned()];
        let include = if include.is_empty() {
            &default_include[..]
        } else {
            include
        };

        let mut include_builder = GlobSetBuilder::new();
        let mut include_requires_recognized_extension = Vec::new();
        for pattern in include {
            for (glob, names_extension) in compile(pattern)? {
                include_builder.add(glob);
                include_requires_recognized_extension.push(!names_extension);
            }
        }

        let mut exclude_builder = GlobSetBuilder::new();
        for pattern in exclude {
            for (glob, _) in compile(pattern)? {
                exclude_builder.add(glob);
            }
        }

        Ok(Self {
            include: build(include_builder)?,
            include_requires_recognized_extension,
            exclude: build(exclude_builder)?,
            recognized_extensions,
        })
    }

    pub(crate) fn is_included(&self, relative_path: &str) -> bool {
        self.include
            .matches(relative_path)
            .into_iter()
            .any(|index| {
                !self.include_requires_recognized_extension[index]
                    || self.has_recognized_extension(relative_path)
            })
    }

    pub(crate) fn is_excluded(&self, relative_path: &str) -> bool {
        self.exclude.is_match(relative_path)
    }

    fn has_recognized_extension(&self, relative_path: &str) -> bool {
        // Path::extension would only see the last extension, and `.d.ts`
        // has to be accepted through `.ts` anyway.
        self.recognized_extensions
            .iter()
            .any(|extension| relative_path.ends_with(extension))
    }
}

/// Compile one configured pattern. When the last segment is a plain name, a
/// glob for everything beneath it is added so that a bare directory (`src`,
/// `dist`) covers its whole subtree. The flag tells whether the glob names a
/// file extension of its own.
fn compile(pattern: &str) -> Result<Vec<(Glob, bool)>, ConfigurationError> {
    let trimmed = pattern.trim_start_matches("./").trim_end_matches('/');
    let trimmed = if trimmed.is_empty() || trimmed == "." {
        "**"
    } else {
        trimmed
    };

    let mut globs = vec![(glob(pattern, trimmed)?, names_file_extension(trimmed))];
    let last_segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if !last_segment.contains(['*', '?', '[']) {
        globs.push((glob(pattern, &format!("{trimmed}/**"))?, false));
    }
    Ok(globs)
}

fn glob(pattern: &str, expression: &str) -> Result<Glob, ConfigurationError> {
    GlobBuilder::new(expression)
        .literal_separator(true)
        .build()
        .map_err(|source| ConfigurationError::InvalidPattern {
            source,
            pattern: pattern.to_owned(),
        })
}

fn build(builder: GlobSetBuilder) -> Result<GlobSet, ConfigurationError> {
    builder
        .build()
        .map_err(|source| ConfigurationError::InvalidPattern {
            source,
            pattern: String::from("<pattern set>"),
        })
}

/// Whether the last path segment of `pattern` spells out an extension after
/// its final wildcard: `*.test.ts` and `index.ts` do, `*` and `src` do not.
fn names_file_extension(pattern: &str) -> bool {
    let last_segment = pattern.rsplit('/').next().unwrap_or(pattern);
    last_segment
        .rsplit(['*', '?'])
        .next()
        .map_or(false, |suffix| suffix.contains('.'))
}
