use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use std::env;

use super::http::{self, HttpError, error_chain};
use crate::domain::changelog::{ChangelogError, ChangelogSource};

/// Release object returned by the Github releases API
#[derive(Debug, Deserialize)]
struct Release {
    #[serde(default)]
    body: Option<String>,
}

/// Reads release notes from the Github releases API
pub struct GithubReleases {
    client: Client,
    token: Option<String>,
}

impl GithubReleases {
    /// Create a client, reading an optional token from `GITHUB_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::ClientInit`] if the HTTP client cannot be initialized.
    pub fn from_env() -> Result<Self, HttpError> {
        Self::new(env::var("GITHUB_TOKEN").ok())
    }

    /// Create a client with an optional token. Anonymous requests work for
    /// public repositories but are rate limited.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::ClientInit`] if the HTTP client cannot be initialized.
    pub fn new(token: Option<String>) -> Result<Self, HttpError> {
        Ok(Self {
            client: http::client()?,
            token,
        })
    }

    /// Fetch the body of the release at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a release.
    pub fn release_body(&self, url: &str) -> Result<String, HttpError> {
        debug!("GET {url}");
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let release: Release = http::send_json(request, "release", url)?;
        Ok(release.body.unwrap_or_default())
    }
}

impl ChangelogSource for GithubReleases {
    fn release_notes(&self, url: &str) -> Result<String, ChangelogError> {
        self.release_body(url)
            .map_err(|e| ChangelogError::Fetch {
                url: url.to_owned(),
                reason: error_chain(&e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_without_body_is_empty() {
        let release: Release = serde_json::from_str(r#"{"tag_name": "v0.1.5"}"#).unwrap();
        assert_eq!(release.body.unwrap_or_default(), "");

        let null_body: Release = serde_json::from_str(r#"{"body": null}"#).unwrap();
        assert!(null_body.body.is_none());
    }

    #[test]
    fn unreachable_host_is_a_changelog_error() {
        let releases = GithubReleases::new(None).unwrap();
        let err = releases
            .release_notes("http://127.0.0.1:9/repos/user/mod/releases/latest")
            .unwrap_err();
        assert!(err.to_string().starts_with(
            "failed to fetch changelog from http://127.0.0.1:9/repos/user/mod/releases/latest"
        ));
    }

    // Hits the real Github API
    #[test]
    #[ignore = "requires network access"]
    fn fetch_latest_release() {
        let releases = GithubReleases::from_env().unwrap();
        let body = releases
            .release_notes("https://api.github.com/repos/rust-lang/rust/releases/latest")
            .unwrap();
        assert!(!body.is_empty());
    }
}
