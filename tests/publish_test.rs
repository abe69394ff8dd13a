use crmm_publish::commands::publish::{self, PublishError, PublishOptions};
use crmm_publish::commands::versions;
use crmm_publish::config::{PublishConfig, Settings};
use crmm_publish::domain::catalog::{CatalogError, GameVersionCatalog};
use crmm_publish::domain::changelog::{ChangelogError, ChangelogSource};
use crmm_publish::domain::resolution::ResolutionError;
use crmm_publish::domain::upload::{UploadError, VersionPublisher, VersionUpload};
use crmm_publish::domain::version::GameVersion;
use crmm_publish::infrastructure::document::FileDocuments;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Catalog served by the registry, most recent first
struct RegistryCatalog;

impl GameVersionCatalog for RegistryCatalog {
    fn fetch_game_versions(&self) -> Result<Value, CatalogError> {
        Ok(json!([
            {"value": "0.3.2", "releaseType": "release"},
            {"value": "0.3.2-rc1", "releaseType": "pre-release"},
            {"value": "0.3.1", "releaseType": "release"},
            {"value": "0.3.1-legacy"},
            {"value": "0.3.0", "releaseType": "beta"},
            {"value": "0.2.4", "releaseType": "alpha"},
            {"value": "0.2.4-snap", "releaseType": "snapshot"}
        ]))
    }
}

/// Release notes keyed by URL
struct Releases;

impl ChangelogSource for Releases {
    fn release_notes(&self, url: &str) -> Result<String, ChangelogError> {
        match url {
            "https://api.github.com/repos/user/mod/releases/tags/v0.1.5" => {
                Ok("- Fixed crash on startup".to_owned())
            }
            _ => Err(ChangelogError::Fetch {
                url: url.to_owned(),
                reason: "404 Not Found".to_owned(),
            }),
        }
    }
}

/// Publisher recording every upload it receives
#[derive(Default)]
struct Registry {
    uploads: RefCell<Vec<VersionUpload>>,
}

impl VersionPublisher for Registry {
    fn upload_version(
        &self,
        project_id: &str,
        _auth_token: &str,
        upload: &VersionUpload,
    ) -> Result<Value, UploadError> {
        self.uploads.borrow_mut().push(upload.clone());
        Ok(json!({"success": true, "message": "Version created", "project": project_id}))
    }
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

fn load(path: &Path) -> PublishConfig {
    PublishConfig::load(path, &Settings::default()).unwrap()
}

fn versions(list: &[&str]) -> Vec<GameVersion> {
    list.iter().copied().map(GameVersion::from).collect()
}

#[test]
fn publish_with_properties_and_external_versions() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "gradle.properties", "mod_version=0.1.5\nmod_name='My Mod'\n");
    write(
        root,
        "src/fabric.mod.json",
        r#"{"depends": {"minecraft": [">=0.3.1", "0.2.4"]}}"#,
    );
    write(root, "build/libs/mod-0.1.5.jar", "jar");
    write(root, "build/libs/mod-0.1.5-sources.jar", "sources");
    write(root, "build/libs/mod-0.1.5-javadoc.jar", "javadoc");
    let config_path = write(
        root,
        "publish.config.json",
        r#"{
            "properties": "gradle.properties",
            "title": "${mod_name} ${mod_version}",
            "version": "${mod_version}",
            "featured": true,
            "releaseChannel": "beta",
            "loaders": ["quilt"],
            "gameVersions": {"file": "src/fabric.mod.json", "key": "depends.minecraft"},
            "files": {
                "primary": "build/libs/mod-${mod_version}.jar",
                "additional": ["build/libs/mod-${mod_version}-*.jar"]
            },
            "repoApi": "https://api.github.com/repos/user/mod",
            "gitReleaseUrl": "/releases/tag/v${mod_version}",
            "crmm": {"authToken": "secret", "projectId": "my-mod"}
        }"#,
    );

    let config = load(&config_path);
    let registry = Registry::default();
    let report = publish::run(
        &config,
        &RegistryCatalog,
        &Releases,
        &registry,
        &FileDocuments,
        PublishOptions::default(),
    )
    .unwrap();

    let response = report.response.unwrap();
    assert_eq!(response["project"], "my-mod");

    let uploads = registry.uploads.borrow();
    assert_eq!(uploads.len(), 1);
    let upload = &uploads[0];
    assert_eq!(upload.title, "My Mod 0.1.5");
    assert_eq!(upload.version_number, "0.1.5");
    assert!(upload.featured);
    assert_eq!(upload.changelog, "- Fixed crash on startup");
    assert_eq!(upload.game_versions, versions(&["0.3.2", "0.3.1", "0.2.4"]));
    assert_eq!(upload.primary_file.name, "mod-0.1.5.jar");
    let additional: Vec<_> = upload.additional_files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(additional, ["mod-0.1.5-javadoc.jar", "mod-0.1.5-sources.jar"]);
}

#[test]
fn dry_run_builds_payload_without_credentials() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "mod.jar", "jar");
    let config_path = write(
        root,
        "publish.config.yaml",
        "version: 1.0.0\n\
         gameVersions: \"<=0.3.0\"\n\
         changelog: Initial release\n\
         files:\n  primary: mod.jar\n",
    );

    let config = load(&config_path);
    let registry = Registry::default();
    let report = publish::run(
        &config,
        &RegistryCatalog,
        &Releases,
        &registry,
        &FileDocuments,
        PublishOptions { dry_run: true },
    )
    .unwrap();

    assert!(report.response.is_none());
    assert_eq!(report.upload.changelog, "Initial release");
    assert_eq!(report.upload.game_versions, versions(&["0.3.0", "0.2.4"]));
    assert!(registry.uploads.borrow().is_empty());
}

#[test]
fn changelog_fetch_failure_aborts() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "mod.jar", "jar");
    let config_path = write(
        root,
        "publish.config.json",
        r#"{
            "version": "2.0.0",
            "gameVersions": "0.3.2",
            "files": {"primary": "mod.jar"},
            "gitReleaseUrl": "https://api.github.com/repos/user/mod/releases/latest"
        }"#,
    );

    let err = publish::run(
        &load(&config_path),
        &RegistryCatalog,
        &Releases,
        &Registry::default(),
        &FileDocuments,
        PublishOptions { dry_run: true },
    )
    .unwrap_err();

    assert!(matches!(err, PublishError::Changelog(_)));
}

#[test]
fn invalid_specifier_aborts() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "mod.jar", "jar");
    let config_path = write(
        root,
        "publish.config.json",
        r#"{"version": "1", "gameVersions": ["0.3.1", "0.3.1<"], "files": {"primary": "mod.jar"}}"#,
    );

    let err = publish::run(
        &load(&config_path),
        &RegistryCatalog,
        &Releases,
        &Registry::default(),
        &FileDocuments,
        PublishOptions { dry_run: true },
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "Cannot parse version string: '0.3.1<'");
}

#[test]
fn versions_only_unknown_exact_versions_fail() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(
        temp_dir.path(),
        "publish.config.json",
        r#"{"version": "1", "gameVersions": ["9.9.9", ">=8.0.0"], "files": {"primary": "mod.jar"}}"#,
    );

    let err = versions::run(&load(&config_path), &RegistryCatalog, &FileDocuments).unwrap_err();

    assert!(matches!(err, ResolutionError::NoValidVersions));
}

#[test]
fn versions_respects_allowed_classifications() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(
        temp_dir.path(),
        "publish.config.toml",
        "version = \"1\"\n\
         gameVersions = \">=0.2.4\"\n\
         allowedClassifications = [\"release\", \"snapshot\", \"pre-release\"]\n\
         [files]\nprimary = \"mod.jar\"\n",
    );

    let resolved = versions::run(&load(&config_path), &RegistryCatalog, &FileDocuments);

    // 0.2.4 is an alpha, so the boundary is not in the filtered catalog
    assert!(matches!(resolved, Err(ResolutionError::NoValidVersions)));
}

#[test]
fn versions_from_missing_source_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(
        temp_dir.path(),
        "publish.config.json",
        r#"{"version": "1", "gameVersions": {"file": "missing.json", "key": "versions"}, "files": {"primary": "mod.jar"}}"#,
    );

    let err = versions::run(&load(&config_path), &RegistryCatalog, &FileDocuments).unwrap_err();

    assert!(matches!(err, ResolutionError::Source(_)));
}
