use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use super::version::GameVersion;

/// Errors that can occur while uploading a version
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to encode upload field '{field}'")]
    Encode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to upload version: {reason}")]
    Rejected { reason: String },
}

/// Release channel of the published version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseChannel {
    #[default]
    Release,
    Beta,
    Alpha,
}

impl ReleaseChannel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Beta => "beta",
            Self::Alpha => "alpha",
        }
    }
}

impl fmt::Display for ReleaseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file attached to the upload
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Name the registry stores the file under
    pub name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Everything the registry needs to create a new project version
#[derive(Debug, Clone)]
pub struct VersionUpload {
    pub title: String,
    pub changelog: String,
    pub featured: bool,
    pub release_channel: ReleaseChannel,
    pub version_number: String,
    pub loaders: Vec<String>,
    pub game_versions: Vec<GameVersion>,
    pub dependencies: Vec<Value>,
    pub primary_file: UploadFile,
    pub additional_files: Vec<UploadFile>,
}

impl VersionUpload {
    /// Text fields of the multipart form, in submission order.
    ///
    /// List fields are sent as JSON arrays.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Encode`] if a list field cannot be encoded as JSON.
    pub fn form_fields(&self) -> Result<Vec<(&'static str, String)>, UploadError> {
        Ok(vec![
            ("title", self.title.clone()),
            ("changelog", self.changelog.clone()),
            ("featured", self.featured.to_string()),
            ("releaseChannel", self.release_channel.as_str().to_owned()),
            ("versionNumber", self.version_number.clone()),
            ("loaders", encode("loaders", &self.loaders)?),
            ("gameVersions", encode("gameVersions", &self.game_versions)?),
            ("dependencies", encode("dependencies", &self.dependencies)?),
        ])
    }
}

/// Encode a list field as a JSON array.
fn encode<T: Serialize>(field: &'static str, value: &T) -> Result<String, UploadError> {
    serde_json::to_string(value).map_err(|source| UploadError::Encode { field, source })
}

/// Destination registry for new versions
pub trait VersionPublisher {
    /// Create a new version of `project_id` and return the registry's response.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] if the upload is rejected or cannot be sent.
    fn upload_version(
        &self,
        project_id: &str,
        auth_token: &str,
        upload: &VersionUpload,
    ) -> Result<Value, UploadError>;
}
