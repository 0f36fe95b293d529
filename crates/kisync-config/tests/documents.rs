//! Loading and writing YAML documents from disk.

use std::path::{Path, PathBuf};

use kisync_config::{ConfigError, load_projects, load_skiplists, write_project};
use kisync_core::skiplist::{self, Deployment};
use pretty_assertions::assert_eq;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn later_files_replace_projects_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(
        dir.path(),
        "a.yaml",
        r"
projects:
  - name: LKFT
    url: https://qa-reports.linaro.org
    projects: [lkft/old]
  - name: AOSP
    url: https://qa-reports.linaro.org
",
    );
    let second = write(
        dir.path(),
        "b.yaml",
        r"
projects:
  - name: LKFT
    url: https://qa-reports.linaro.org
    projects: [lkft/new]
",
    );

    let projects = load_projects(&[first, second]).unwrap();
    let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["AOSP", "LKFT"]);
    assert_eq!(projects[1].projects, vec!["lkft/new".to_string()]);
}

#[test]
fn project_without_url_fails_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "bad.yaml", "projects:\n  - name: LKFT\n");

    let err = load_projects(&[path]).unwrap_err();
    assert!(matches!(err, ConfigError::Project { .. }));
    assert!(err.to_string().contains("project 'LKFT' has no url"));
}

#[test]
fn unreadable_and_invalid_files_are_config_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = load_projects(&[dir.path().join("absent.yaml")]).unwrap_err();
    assert!(matches!(missing, ConfigError::Io { .. }));

    let garbage = write(dir.path(), "garbage.yaml", "projects: [unterminated");
    let invalid = load_projects(&[garbage]).unwrap_err();
    assert!(matches!(invalid, ConfigError::Yaml { .. }));
}

#[test]
fn skiplists_concatenate_in_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let one = write(
        dir.path(),
        "one.yaml",
        "skiplist:\n  - tests: a\n    boards: all\n    branches: all\n    environments: all\n",
    );
    let two = write(
        dir.path(),
        "two.yaml",
        "skiplist:\n  - tests: [b, c]\n    boards: [x15]\n    branches: [4.9]\n    \
         environments: staging\n",
    );
    let empty = write(dir.path(), "empty.yaml", "{}\n");

    let entries = load_skiplists(&[one, two, empty]).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].environments.as_deref(), Some("staging"));
}

#[test]
fn converted_projects_load_back_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let source = write(
        dir.path(),
        "skip.yaml",
        "skiplist:\n  - tests: fork13\n    reason: hangs\n    boards: all\n    \
         branches: all\n    environments: production\n",
    );
    let conversion = skiplist::convert(&load_skiplists(&[source]).unwrap(), "ltp");

    let production = dir.path().join("ltp-production.yaml");
    let staging = dir.path().join("ltp-staging.yaml");
    write_project(&production, conversion.project(Deployment::Production)).unwrap();
    write_project(&staging, conversion.project(Deployment::Staging)).unwrap();

    let loaded = load_projects(&[&production]).unwrap();
    assert_eq!(loaded, vec![conversion.production.clone()]);

    let loaded = load_projects(&[&staging]).unwrap();
    assert_eq!(loaded[0].name, "LKFT-staging");
    assert!(loaded[0].known_issues.is_empty());
}
