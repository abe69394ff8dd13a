pub mod properties;

use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::catalog::AllowedReleaseTypes;
use crate::domain::changelog::Changelog;
use crate::domain::document::DocumentFormat;
use crate::domain::source::ConstraintSource;
use crate::domain::upload::ReleaseChannel;
use crate::infrastructure::crmm::CRMM_API_URL;
use properties::{Properties, PropertiesError};

pub const DEFAULT_CONFIG_FILE: &str = "publish.config.json";
pub const AUTH_TOKEN_ENV: &str = "CRMM_AUTH_TOKEN";

const REDACTED: &str = "_REDACTED_";

/// Errors that can occur when loading the publish config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("invalid config file {}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Properties(#[from] PropertiesError),

    #[error("Version is required")]
    MissingVersion,

    #[error("Game versions are required")]
    MissingGameVersions,

    #[error("Missing field 'file' in 'gameVersions'")]
    MissingGameVersionsFile,

    #[error("Primary file path is required")]
    MissingPrimaryFile,

    #[error("'repoApi' is required when 'gitReleaseUrl' is a relative path")]
    MissingRepoApi,

    #[error("Auth token is required")]
    MissingAuthToken,

    #[error("Project ID is required")]
    MissingProjectId,
}

/// Runtime settings loaded from environment variables.
#[derive(Clone, Default)]
pub struct Settings {
    /// Registry auth token, takes precedence over the config file
    pub auth_token: Option<String>,
}

impl Settings {
    /// Load settings from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            auth_token: env::var(AUTH_TOKEN_ENV).ok().filter(|token| !token.is_empty()),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("auth_token", &self.auth_token.as_ref().map(|_| REDACTED))
            .finish()
    }
}

// Wire shape of the config document

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConfigData {
    title: Option<String>,
    version: Option<String>,
    /// Only a literal `true` features the version
    featured: Option<Value>,
    release_channel: Option<ReleaseChannel>,
    loaders: Option<Vec<String>>,
    game_versions: Option<GameVersionsData>,
    allowed_classifications: Option<AllowedReleaseTypes>,
    files: Option<FilesData>,
    dependencies: Option<Vec<Value>>,
    repo_api: Option<String>,
    git_release_url: Option<String>,
    changelog: Option<String>,
    crmm: Option<CrmmData>,
    api_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GameVersionsData {
    List(Vec<String>),
    Scalar(String),
    Reference {
        file: Option<PathBuf>,
        key: Option<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FilesData {
    primary: Option<String>,
    additional: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CrmmData {
    auth_token: Option<String>,
    project_id: Option<String>,
}

/// Paths of the files to upload, resolved against the config directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPaths {
    pub primary: PathBuf,
    /// Plain paths or glob patterns
    pub additional: Vec<String>,
}

/// Registry account the version is published to
#[derive(Clone, Default)]
pub struct CrmmAccount {
    auth_token: Option<String>,
    project_id: Option<String>,
}

/// Credentials needed for an upload
pub struct Credentials<'account> {
    pub project_id: &'account str,
    pub auth_token: &'account str,
}

impl CrmmAccount {
    #[must_use]
    pub fn new(project_id: Option<String>, auth_token: Option<String>) -> Self {
        Self {
            auth_token: auth_token.filter(|token| !token.is_empty()),
            project_id: project_id.filter(|id| !id.is_empty()),
        }
    }

    /// Credentials for an upload. Not needed for dry runs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAuthToken`] or [`ConfigError::MissingProjectId`]
    /// if either is absent.
    pub fn credentials(&self) -> Result<Credentials<'_>, ConfigError> {
        let auth_token = self
            .auth_token
            .as_deref()
            .ok_or(ConfigError::MissingAuthToken)?;
        let project_id = self
            .project_id
            .as_deref()
            .ok_or(ConfigError::MissingProjectId)?;
        Ok(Credentials {
            project_id,
            auth_token,
        })
    }
}

impl fmt::Debug for CrmmAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrmmAccount")
            .field("auth_token", &self.auth_token.as_ref().map(|_| REDACTED))
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("project_id", &self.project_id)
            .field("auth_token", &REDACTED)
            .finish()
    }
}

/// Validated publish configuration
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub title: String,
    pub version: String,
    pub featured: bool,
    pub release_channel: ReleaseChannel,
    pub loaders: Vec<String>,
    pub game_versions: ConstraintSource,
    /// Catalog classifications eligible for resolution
    pub allowed_release_types: AllowedReleaseTypes,
    pub files: UploadPaths,
    /// Passed through to the registry unchanged
    pub dependencies: Vec<Value>,
    pub changelog: Changelog,
    pub crmm: CrmmAccount,
    pub api_url: String,
}

impl PublishConfig {
    /// Read, interpolate and validate the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, and any error
    /// of [`PublishConfig::parse`].
    pub fn load(path: &Path, settings: &Settings) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path, settings)
    }

    /// Parse config `text` read from `path`. The extension of `path` selects
    /// the format and its directory anchors relative paths.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`] for a
    /// malformed document, [`ConfigError::Properties`] if interpolation fails,
    /// and a `Missing*` variant if a required field is absent.
    pub fn parse(text: &str, path: &Path, settings: &Settings) -> Result<Self, ConfigError> {
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        let mut document = DocumentFormat::from_path(path)
            .parse(text)
            .map_err(|reason| ConfigError::Parse {
                path: path.to_path_buf(),
                reason,
            })?;

        if let Some(properties_path) = document.get("properties").and_then(Value::as_str) {
            let properties = Properties::load(&base.join(properties_path))?;
            debug!("Loaded {} properties from {properties_path}", properties.len());
            properties.interpolate(&mut document)?;
        }

        let data: ConfigData =
            serde_json::from_value(document).map_err(|source| ConfigError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_data(data, base, settings)
    }

    fn from_data(data: ConfigData, base: &Path, settings: &Settings) -> Result<Self, ConfigError> {
        let version = non_empty(data.version).ok_or(ConfigError::MissingVersion)?;
        let title = non_empty(data.title).unwrap_or_else(|| version.clone());

        let game_versions = match data.game_versions {
            None => return Err(ConfigError::MissingGameVersions),
            Some(GameVersionsData::List(specifiers)) => ConstraintSource::InlineList(specifiers),
            Some(GameVersionsData::Scalar(specifier)) if specifier.is_empty() => {
                return Err(ConfigError::MissingGameVersions);
            }
            Some(GameVersionsData::Scalar(specifier)) => ConstraintSource::InlineScalar(specifier),
            Some(GameVersionsData::Reference { file, key }) => {
                let file = file.ok_or(ConfigError::MissingGameVersionsFile)?;
                ConstraintSource::reference(base.join(file), key.as_deref().unwrap_or_default())
            }
        };

        let changelog = match (non_empty(data.changelog), non_empty(data.git_release_url)) {
            (Some(text), _) => Changelog::Text(text),
            (None, Some(release_path)) => {
                Changelog::release(data.repo_api.as_deref(), &release_path)
                    .ok_or(ConfigError::MissingRepoApi)?
            }
            (None, None) => Changelog::Empty,
        };

        let upload_files = data.files.unwrap_or_default();
        let primary = non_empty(upload_files.primary).ok_or(ConfigError::MissingPrimaryFile)?;
        let files = UploadPaths {
            primary: base.join(primary),
            additional: upload_files
                .additional
                .unwrap_or_default()
                .iter()
                .map(|entry| base.join(entry).to_string_lossy().into_owned())
                .collect(),
        };

        let account = data.crmm.unwrap_or_default();
        let auth_token = settings.auth_token.clone().or(account.auth_token);

        Ok(Self {
            title,
            version,
            featured: data.featured == Some(Value::Bool(true)),
            release_channel: data.release_channel.unwrap_or_default(),
            loaders: data.loaders.unwrap_or_default(),
            game_versions,
            allowed_release_types: data.allowed_classifications.unwrap_or_default(),
            files,
            dependencies: data.dependencies.unwrap_or_default(),
            changelog,
            crmm: CrmmAccount::new(account.project_id, auth_token),
            api_url: non_empty(data.api_url).unwrap_or_else(|| CRMM_API_URL.to_owned()),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
