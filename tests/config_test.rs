use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use scaffold::ci::CiKind;
use scaffold::config::{AbsolutePaths, Config, ConfigLoader, PathResolver};
use scaffold::constants::CONFIG_FILE;
use scaffold::error::Error;
use scaffold::vcs::VcsKind;
use tempfile::TempDir;

fn write_config(dir: &Path, content: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let file = dir.join(CONFIG_FILE);
    fs::write(&file, content).unwrap();
    file
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn load(dir: &Path, env: &HashMap<String, String>) -> (Result<Config, Error>, String) {
    let mut out = Vec::new();
    let result = ConfigLoader::new(&AbsolutePaths, env).load(dir, &mut out);
    (result, String::from_utf8(out).unwrap())
}

struct FailingPaths;

impl PathResolver for FailingPaths {
    fn absolute(&self, _path: &Path) -> io::Result<PathBuf> {
        Err(io::Error::other("cannot resolve"))
    }
}

#[test]
fn test_nearest_file_wins() {
    let temp_dir = TempDir::new().unwrap();
    let parent = write_config(
        temp_dir.path(),
        r#"
vcs:
  github:
    token: parent-token
    organisation: parent-org
registry: registry.parent.com
organisation: parent
"#,
    );
    let child_dir = temp_dir.path().join("child");
    let child = write_config(
        &child_dir,
        r#"
ci:
  buildkite:
    token: bk-token
    organisation: bk-org
organisation: child
"#,
    );

    let (config, output) = load(&child_dir, &HashMap::new());
    let config = config.unwrap();

    assert_eq!(config.organisation, "child");
    assert_eq!(config.registry_url, "registry.parent.com");
    assert_eq!(config.vcs.github.token, "parent-token");
    assert_eq!(config.vcs.github.organisation, "parent-org");
    assert_eq!(config.ci.buildkite.token, "bk-token");
    assert_eq!(config.active_vcs_kind(), Some(VcsKind::Github));
    assert_eq!(config.active_ci_kind(), Some(CiKind::Buildkite));

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Parsing config from file:"));
    assert!(lines[0].contains(&child.display().to_string()));
    assert!(lines[1].starts_with("Merging with config from file:"));
    assert!(lines[1].contains(&parent.display().to_string()));
}

#[test]
fn test_discover_order() {
    let temp_dir = TempDir::new().unwrap();
    let top = write_config(temp_dir.path(), "");
    let middle = write_config(&temp_dir.path().join("a"), "");
    let start = temp_dir.path().join("a/b/c");
    fs::create_dir_all(&start).unwrap();

    let empty: HashMap<String, String> = HashMap::new();
    let files = ConfigLoader::new(&AbsolutePaths, &empty).discover(&start).unwrap();

    assert_eq!(files, vec![middle, top]);
}

#[test]
fn test_discover_skips_siblings_of_parent_components() {
    let temp_dir = TempDir::new().unwrap();
    let top = write_config(temp_dir.path(), "organisation: top\n");
    write_config(&temp_dir.path().join("a/b"), "organisation: sibling\n");
    fs::create_dir_all(temp_dir.path().join("a/c")).unwrap();
    let start = temp_dir.path().join("a/b/../c");

    let empty: HashMap<String, String> = HashMap::new();
    let files = ConfigLoader::new(&AbsolutePaths, &empty).discover(&start).unwrap();
    assert_eq!(files, vec![top]);

    let (config, _) = load(&start, &empty);
    assert_eq!(config.unwrap().organisation, "top");
}

#[test]
fn test_environment_wins() {
    let temp_dir = TempDir::new().unwrap();
    write_config(
        temp_dir.path(),
        r#"
vcs:
  gitlab:
    token: file-token
    group: file-group
registry: file-registry
"#,
    );

    let (config, _) = load(
        temp_dir.path(),
        &env(&[("GITLAB_TOKEN", "env-token"), ("REGISTRY", "env-registry")]),
    );
    let config = config.unwrap();

    assert_eq!(config.vcs.gitlab.token, "env-token");
    assert_eq!(config.vcs.gitlab.group, "file-group");
    assert_eq!(config.ci.gitlab.token, "env-token");
    assert_eq!(config.registry_url, "env-registry");
    assert_eq!(config.active_vcs_kind(), Some(VcsKind::Gitlab));
    assert_eq!(config.active_ci_kind(), Some(CiKind::Gitlab));
}

#[test]
fn test_environment_only_selects_providers() {
    let temp_dir = TempDir::new().unwrap();
    let (config, output) = load(
        temp_dir.path(),
        &env(&[("GITHUB_TOKEN", "gh"), ("BUILDKITE_TOKEN", "bk")]),
    );
    let mut config = config.unwrap();

    assert!(output.is_empty());
    assert_eq!(config.active_vcs().map(|vcs| vcs.name()), Some("Github"));
    assert_eq!(config.active_ci().map(|ci| ci.name()), Some("Buildkite"));
    assert!(config.validate_config().is_ok());
    assert!(config.resolve().is_ok());
}

#[test]
fn test_unknown_field() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_config(temp_dir.path(), "vcs:\n  bitbucket:\n    token: abc\n");

    let (result, _) = load(temp_dir.path(), &HashMap::new());

    match result {
        Err(Error::ConfigParseError { path, .. }) => assert_eq!(path, file),
        other => panic!("expected ConfigParseError, got {other:?}"),
    }
}

#[test]
fn test_two_vcs_in_one_file() {
    let temp_dir = TempDir::new().unwrap();
    write_config(
        temp_dir.path(),
        "vcs:\n  github:\n    token: a\n  gitlab:\n    token: b\n",
    );

    let (result, _) = load(temp_dir.path(), &HashMap::new());

    assert_eq!(
        result.unwrap_err().to_string(),
        "scaffold VCS already defined, please check configuration"
    );
}

#[test]
fn test_two_ci_across_files() {
    let temp_dir = TempDir::new().unwrap();
    write_config(temp_dir.path(), "ci:\n  gitlab:\n    token: a\n");
    let child = temp_dir.path().join("child");
    write_config(&child, "ci:\n  buildkite:\n    token: b\n");

    let (result, _) = load(&child, &HashMap::new());

    assert!(matches!(result, Err(Error::ProviderAmbiguityError { group: "CI" })));
}

#[test]
fn test_no_providers() {
    let temp_dir = TempDir::new().unwrap();
    write_config(temp_dir.path(), "organisation: org\n");

    let (config, _) = load(temp_dir.path(), &HashMap::new());
    let mut config = config.unwrap();

    assert_eq!(config.active_vcs_kind(), None);
    assert_eq!(config.active_ci_kind(), None);
    assert_eq!(config.validate_config().unwrap_err().to_string(), "no VCS configured");
    assert_eq!(config.resolve().err().unwrap().to_string(), "no VCS configured");
}

#[test]
fn test_missing_ci() {
    let temp_dir = TempDir::new().unwrap();
    write_config(temp_dir.path(), "vcs:\n  github:\n    token: a\n");

    let (config, _) = load(temp_dir.path(), &HashMap::new());

    assert_eq!(config.unwrap().validate_config().unwrap_err().to_string(), "no CI configured");
}

#[test]
fn test_empty_file() {
    let temp_dir = TempDir::new().unwrap();
    write_config(temp_dir.path(), "");

    let (config, output) = load(temp_dir.path(), &HashMap::new());
    let config = config.unwrap();

    assert!(config.organisation.is_empty());
    assert_eq!(config.active_vcs_kind(), None);
    assert!(output.starts_with("Parsing config from file:"));
}

#[test]
fn test_path_resolution_error() {
    let empty: HashMap<String, String> = HashMap::new();
    let mut out = Vec::new();

    let result = ConfigLoader::new(&FailingPaths, &empty).load(Path::new("."), &mut out);

    assert_eq!(result.unwrap_err().to_string(), "cannot resolve");
}

#[test]
fn test_from_yaml() {
    let config = Config::from_yaml("organisation: org\nregistry: reg\n").unwrap();
    assert_eq!(config.organisation, "org");
    assert_eq!(config.registry_url, "reg");
    assert!(Config::from_yaml("registry_url: reg\n").is_err());
}
