use std::{
    error::Error,
    fmt::Display,
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;
use serde::Deserialize;

use crate::error::ConfigurationError;

const TYPESCRIPT_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".mts", ".cts"];
const JAVASCRIPT_EXTENSIONS: &[&str] = &[".js", ".jsx", ".mjs", ".cjs"];

/// The options that decide which files a project compiles and where their
/// outputs land.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Globs selecting source files, relative to the working directory.
    /// Empty means every file with a recognized extension.
    pub include: Vec<String>,
    /// Globs removing files from the included set.
    pub exclude: Vec<String>,
    /// Directory mirrored into `out_dir`; inferred from the sources when
    /// absent.
    pub root_dir: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub allow_js: bool,
    pub source_map: bool,
}

impl ProjectConfig {
    pub fn new<P: Into<PathBuf>>(out_dir: P) -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            root_dir: None,
            out_dir: out_dir.into(),
            allow_js: false,
            source_map: false,
        }
    }

    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn root_dir<P: Into<PathBuf>>(mut self, root_dir: P) -> Self {
        self.root_dir = Some(root_dir.into());
        self
    }

    pub fn allow_js(mut self, allow_js: bool) -> Self {
        self.allow_js = allow_js;
        self
    }

    pub fn source_map(mut self, source_map: bool) -> Self {
        self.source_map = source_map;
        self
    }

    /// Extensions a wildcard include pattern picks up. Declaration files
    /// (`.d.ts` and friends) are covered by their final extension.
    pub fn recognized_extensions(&self) -> Vec<&'static str> {
        let mut extensions = TYPESCRIPT_EXTENSIONS.to_vec();
        if self.allow_js {
            extensions.extend_from_slice(JAVASCRIPT_EXTENSIONS);
        }
        extensions
    }

    /// Read a `tsconfig.json`. Returns the project's working directory (the
    /// directory holding the file, made absolute) along with its
    /// configuration.
    pub fn from_tsconfig_file<P: AsRef<Path>>(
        tsconfig_file: P,
    ) -> Result<(PathBuf, Self), crate::Error> {
        let tsconfig_file = tsconfig_file.as_ref();
        let tsconfig = read_typescript_config(tsconfig_file)?;
        debug!("{:?}: {:?}", tsconfig_file, tsconfig);

        let parent = match tsconfig_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let working_dir = fs::canonicalize(parent).map_err(|source| {
            ConfigurationError::UnreadableWorkingDir {
                source,
                path: parent.to_owned(),
            }
        })?;

        let TypescriptConfig {
            compiler_options,
            include,
            exclude,
        } = tsconfig;
        let out_dir =
            compiler_options
                .out_dir
                .ok_or_else(|| ConfigurationError::MissingOutDir {
                    config_file: tsconfig_file.to_owned(),
                })?;

        let config = Self {
            include,
            exclude,
            root_dir: compiler_options.root_dir,
            out_dir,
            allow_js: compiler_options.allow_js,
            source_map: compiler_options.source_map,
        };
        Ok((working_dir, config))
    }
}

// Everything else tsc understands (target, strict, module, ...) has no
// bearing on file layout and is skipped by serde.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompilerOptions {
    root_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    #[serde(default)]
    allow_js: bool,
    #[serde(default)]
    source_map: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypescriptConfig {
    #[serde(default)]
    compiler_options: CompilerOptions,
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

#[derive(Debug)]
#[non_exhaustive]
pub struct ConfigFileError {
    path: PathBuf,
    kind: ConfigFileErrorKind,
}

impl ConfigFileError {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ConfigFileErrorKind::Read(_) => write!(f, "unable to read file {:?}", self.path),
            ConfigFileErrorKind::Parse(_) => write!(f, "unable to parse file {:?}", self.path),
        }
    }
}

impl Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            ConfigFileErrorKind::Read(err) => Some(err),
            ConfigFileErrorKind::Parse(err) => Some(err),
        }
    }
}

#[derive(Debug)]
pub enum ConfigFileErrorKind {
    #[non_exhaustive]
    Read(io::Error),
    #[non_exhaustive]
    Parse(serde_json::Error),
}

fn read_typescript_config(path: &Path) -> Result<TypescriptConfig, ConfigFileError> {
    (|| {
        let contents = fs::read_to_string(path).map_err(ConfigFileErrorKind::Read)?;
        let tsconfig = serde_json::from_str(&strip_jsonc_comments(&contents))
            .map_err(ConfigFileErrorKind::Parse)?;
        Ok(tsconfig)
    })()
    .map_err(|kind| ConfigFileError {
        path: path.to_owned(),
        kind,
    })
}

/// tsconfig files are JSON with comments. Drop `//` and `/* */` comments
/// outside of string literals so serde_json can read the rest.
fn strip_jsonc_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                out.push(ch);
                while let Some(c) = chars.next() {
                    out.push(c);
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                out.push(escaped);
                            }
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                while chars.peek().map_or(false, |&c| c != '\n') {
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for c in chars.by_ref() {
                    if previous == '*' && c == '/' {
                        break;
                    }
                    previous = c;
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_jsonc_removes_line_and_block_comments() {
        let input = "{\n  // output\n  \"outDir\": \"./dist\" /* compiled */\n}";
        let parsed: serde_json::Value =
            serde_json::from_str(&strip_jsonc_comments(input)).expect("valid json");
        assert_eq!(parsed["outDir"], "./dist");
    }

    #[test]
    fn strip_jsonc_preserves_strings_with_slashes() {
        let input = r#"{"include": ["src/**/*"], "note": "a // b \" /* c */"}"#;
        assert_eq!(strip_jsonc_comments(input), input);
    }

    #[test]
    fn block_comment_closing_needs_its_own_star() {
        assert_eq!(strip_jsonc_comments("1/*/ still comment */2"), "12");
    }

    #[test]
    fn tsconfig_fields_are_camel_case() {
        let tsconfig: TypescriptConfig = serde_json::from_str(
            r#"{
                "compilerOptions": {
                    "target": "ES2020",
                    "rootDir": "./src",
                    "outDir": "./dist",
                    "allowJs": true,
                    "sourceMap": true
                },
                "include": ["src/**/*"],
                "exclude": ["node_modules", "dist"]
            }"#,
        )
        .expect("valid tsconfig");

        assert_eq!(tsconfig.compiler_options.root_dir, Some(PathBuf::from("./src")));
        assert_eq!(tsconfig.compiler_options.out_dir, Some(PathBuf::from("./dist")));
        assert!(tsconfig.compiler_options.allow_js);
        assert!(tsconfig.compiler_options.source_map);
        assert_eq!(tsconfig.include, vec!["src/**/*"]);
        assert_eq!(tsconfig.exclude, vec!["node_modules", "dist"]);
    }

    #[test]
    fn allow_js_widens_recognized_extensions() {
        let config = ProjectConfig::new("dist");
        assert!(!config.recognized_extensions().contains(&".js"));
        assert!(config.allow_js(true).recognized_extensions().contains(&".jsx"));
    }
}
