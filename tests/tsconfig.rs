use std::fs;
use std::path::{Path, PathBuf};

use tsconfig_layout::{
    find_tsconfig, resolve_tsconfig_file, resolve_tsconfig_files, ConfigurationError, Error,
    ProjectConfig, SourceTree,
};

fn fixture(name: &str) -> PathBuf {
    fs::canonicalize(Path::new("test-data").join(name))
        .expect("fixture directory should exist")
}

fn check(tsconfig: &str, root_dir: &str, expected: &[(&str, &str)]) {
    let project = fixture(tsconfig);
    match resolve_tsconfig_file(project.join("tsconfig.json")) {
        Ok(actual) => {
            assert_eq!(actual.root_dir, project.join(root_dir));
            assert_eq!(
                actual
                    .units
                    .iter()
                    .map(|unit| (unit.source_path.clone(), unit.output_path.clone()))
                    .collect::<Vec<_>>(),
                expected
                    .iter()
                    .map(|(source, output)| (project.join(source), project.join(output)))
                    .collect::<Vec<_>>()
            );
        }
        Err(err) => {
            panic!("Unexpected error: {:?}", err);
        }
    };
}

#[test]
fn resolve_happy_path_with_explicit_root_dir() {
    check(
        "happy-path",
        "src",
        &[
            ("src/index.ts", "dist/index.js"),
            ("src/utils/helper.ts", "dist/utils/helper.js"),
        ],
    );
}

#[test]
fn resolve_inferred_root_dir() {
    check(
        "inferred-root",
        ".",
        &[
            ("core/a.ts", "dist/core/a.js"),
            ("core/b.ts", "dist/core/b.js"),
            ("core/sub/c.ts", "dist/core/sub/c.js"),
            ("types.d.ts", "dist/types.d.ts"),
        ],
    );
}

#[test]
fn source_maps_follow_the_tsconfig() {
    let resolution = resolve_tsconfig_file(fixture("happy-path").join("tsconfig.json"))
        .expect("happy path resolves");
    assert!(resolution
        .units
        .iter()
        .all(|unit| unit.source_map_path.is_some()));
}

#[test]
fn scanning_skips_the_dependency_directory() {
    let tree = SourceTree::from_directory(fixture("happy-path")).expect("fixture is readable");
    let files: Vec<_> = tree.files().map(|file| file.relative_path()).collect();
    assert_eq!(
        files,
        vec![
            "README.md",
            "dist/index.js",
            "src/index.ts",
            "src/styles.css",
            "src/utils/helper.test.ts",
            "src/utils/helper.ts",
            "tsconfig.json",
        ]
    );
    assert_eq!(tree.working_dir(), fixture("happy-path"));
}

#[test]
fn scanned_declaration_files_are_flagged() {
    let tree = SourceTree::from_directory(fixture("inferred-root")).expect("fixture is readable");
    let declaration = tree.get("types.d.ts").expect("types.d.ts is scanned");
    assert!(declaration.is_declaration());
    assert!(!tree.get("core/a.ts").expect("core/a.ts is scanned").is_declaration());
}

#[test]
fn references_can_be_added_after_scanning() {
    let mut tree = SourceTree::from_directory(fixture("happy-path")).expect("fixture is readable");
    assert!(tree.add_reference("src/utils/helper.ts", "src/utils/helper.test.ts"));
    assert!(!tree.add_reference("src/missing.ts", "src/index.ts"));

    let (_, config) =
        ProjectConfig::from_tsconfig_file(fixture("happy-path").join("tsconfig.json"))
            .expect("happy path tsconfig parses");
    let resolution = tsconfig_layout::resolve(&tree, &config).expect("happy path resolves");
    assert!(resolution
        .units
        .iter()
        .any(|unit| unit.relative_path == "utils/helper.test.ts"));
}

#[test]
fn resolve_several_projects() {
    let tsconfig_files = [
        fixture("happy-path").join("tsconfig.json"),
        fixture("inferred-root").join("tsconfig.json"),
    ];
    let resolutions = resolve_tsconfig_files(&tsconfig_files).expect("both projects resolve");
    assert_eq!(
        resolutions.keys().cloned().collect::<Vec<_>>(),
        tsconfig_files.to_vec()
    );
    assert_eq!(resolutions[&tsconfig_files[0]].units.len(), 2);
    assert_eq!(resolutions[&tsconfig_files[1]].units.len(), 4);
}

#[test]
fn resolve_several_projects_reports_failures() {
    let tsconfig_files = [
        fixture("happy-path").join("tsconfig.json"),
        fixture("missing-out-dir").join("tsconfig.json"),
    ];
    assert!(resolve_tsconfig_files(&tsconfig_files).is_err());
}

#[test]
fn missing_out_dir_is_a_configuration_error() {
    let result = resolve_tsconfig_file(fixture("missing-out-dir").join("tsconfig.json"));
    assert!(matches!(
        result,
        Err(Error::Configuration(ConfigurationError::MissingOutDir { .. }))
    ));
}

#[test]
fn malformed_tsconfig_names_the_file() {
    let tsconfig = fixture("malformed").join("tsconfig.json");
    match resolve_tsconfig_file(&tsconfig) {
        Err(Error::ConfigFile(err)) => assert_eq!(err.path(), tsconfig),
        other => panic!("Expected a config file error, got {:?}", other),
    }
}

#[test]
fn missing_tsconfig_names_the_file() {
    let tsconfig = fixture("happy-path").join("tsconfig.build.json");
    assert!(matches!(
        resolve_tsconfig_file(&tsconfig),
        Err(Error::ConfigFile(_))
    ));
}

#[test]
fn missing_working_dir_is_a_configuration_error() {
    let result = SourceTree::from_directory("test-data/does-not-exist");
    assert!(matches!(
        result,
        Err(Error::Configuration(
            ConfigurationError::UnreadableWorkingDir { .. }
        ))
    ));
}

#[test]
fn file_as_working_dir_is_a_configuration_error() {
    let result = SourceTree::from_directory(fixture("happy-path").join("README.md"));
    assert!(matches!(
        result,
        Err(Error::Configuration(
            ConfigurationError::WorkingDirNotADirectory { .. }
        ))
    ));
}

#[test]
fn find_tsconfig_walks_up_from_nested_directories() {
    let project = fixture("happy-path");
    assert_eq!(
        find_tsconfig(project.join("src/utils")),
        Some(project.join("tsconfig.json"))
    );
    assert_eq!(
        find_tsconfig(project.join("src/utils/helper.ts")),
        Some(project.join("tsconfig.json"))
    );
}
