use log::debug;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::{COOKIE, ORIGIN, REFERER};
use serde_json::Value;
use std::time::Duration;

use super::http::{self, HttpError, error_chain};
use crate::domain::catalog::{CatalogError, GameVersionCatalog};
use crate::domain::upload::{UploadError, UploadFile, VersionPublisher, VersionUpload};

pub const CRMM_API_URL: &str = "https://api.crmm.tech/api";
const CRMM_SITE: &str = "https://crmm.tech";
const UPLOAD_TIMEOUT_SECS: u64 = 300;

/// Client for the CRMM registry API
pub struct CrmmClient {
    client: Client,
    /// API base URL without trailing slash
    api_url: String,
}

impl CrmmClient {
    /// Create a client for the API at `api_url` (e.g., [`CRMM_API_URL`]).
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::ClientInit`] if the HTTP client cannot be initialized.
    pub fn new(api_url: &str) -> Result<Self, HttpError> {
        Ok(Self {
            client: http::client()?,
            api_url: api_url.trim_end_matches('/').to_owned(),
        })
    }

    #[must_use]
    pub fn game_versions_url(&self) -> String {
        format!("{}/tags/game-versions", self.api_url)
    }

    #[must_use]
    pub fn version_upload_url(&self, project_id: &str) -> String {
        format!("{}/project/{project_id}/version", self.api_url)
    }

    /// Fetch the raw game version catalog, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not JSON.
    pub fn get_game_versions(&self) -> Result<Value, HttpError> {
        let url = self.game_versions_url();
        debug!("GET {url}");
        http::send_json(self.client.get(&url), "game versions", &url)
    }

    /// Create a new project version from a multipart form.
    ///
    /// The registry authenticates through the `auth-token` cookie and expects
    /// requests to originate from its own site.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the registry rejects the upload,
    /// or the response is not JSON.
    pub fn post_version(
        &self,
        project_id: &str,
        auth_token: &str,
        form: Form,
    ) -> Result<Value, HttpError> {
        let url = self.version_upload_url(project_id);
        debug!("POST {url}");
        let request = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .header(COOKIE, format!("auth-token={auth_token}"))
            .header(ORIGIN, CRMM_SITE)
            .header(REFERER, format!("{CRMM_SITE}/"))
            .multipart(form);
        http::send_json(request, "version upload", &url)
    }
}

/// Build the multipart form for a version upload.
///
/// # Errors
///
/// Returns [`UploadError::Encode`] if a list field cannot be encoded.
pub fn upload_form(upload: &VersionUpload) -> Result<Form, UploadError> {
    let fields = upload
        .form_fields()?
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));

    Ok(upload
        .additional_files
        .iter()
        .fold(
            fields.part("primaryFile", file_part(&upload.primary_file)),
            |form, file| form.part("additionalFiles", file_part(file)),
        ))
}

/// A file part carrying the upload's name.
fn file_part(file: &UploadFile) -> Part {
    Part::bytes(file.bytes.clone()).file_name(file.name.clone())
}

impl GameVersionCatalog for CrmmClient {
    fn fetch_game_versions(&self) -> Result<Value, CatalogError> {
        self.get_game_versions()
            .map_err(|e| CatalogError::Fetch {
                reason: error_chain(&e),
            })
    }
}

impl VersionPublisher for CrmmClient {
    fn upload_version(
        &self,
        project_id: &str,
        auth_token: &str,
        upload: &VersionUpload,
    ) -> Result<Value, UploadError> {
        let form = upload_form(upload)?;
        self.post_version(project_id, auth_token, form)
            .map_err(|e| UploadError::Rejected {
                reason: error_chain(&e),
            })
    }
}
