use thiserror::Error;

/// Errors that can occur while fetching a changelog
#[derive(Debug, Error)]
pub enum ChangelogError {
    #[error("failed to fetch changelog from {url}: {reason}")]
    Fetch { url: String, reason: String },
}

/// Where the version's changelog text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Changelog {
    /// No changelog, an empty string is sent
    Empty,
    /// Changelog text written in the config
    Text(String),
    /// Body of a release fetched from a repository API
    Release { url: String },
}

impl Changelog {
    /// Build the release variant from the repository API base and release path.
    ///
    /// A release path starting with `http` is used as is, otherwise it is
    /// appended to `repo_api`. Web-style `/tag/` segments are rewritten to the
    /// API's `/tags/`.
    ///
    /// Returns `None` for a relative release path without a repository API.
    #[must_use]
    pub fn release(repo_api: Option<&str>, release_path: &str) -> Option<Self> {
        let url = if release_path.starts_with("http") {
            release_path.to_owned()
        } else {
            format!("{}{release_path}", repo_api?)
        };
        Some(Self::Release {
            url: url.replace("/tag/", "/tags/"),
        })
    }

    /// Produce the changelog text, fetching it when it lives in a release.
    ///
    /// # Errors
    ///
    /// Returns [`ChangelogError`] if the release notes cannot be fetched.
    pub fn text<S: ChangelogSource>(&self, source: &S) -> Result<String, ChangelogError> {
        match self {
            Self::Empty => Ok(String::new()),
            Self::Text(text) => Ok(text.clone()),
            Self::Release { url } => source.release_notes(url),
        }
    }
}

/// Remote source of release notes
pub trait ChangelogSource {
    /// Fetch the body of the release at `url`, empty if the release has none.
    ///
    /// # Errors
    ///
    /// Returns [`ChangelogError::Fetch`] if the release cannot be retrieved.
    fn release_notes(&self, url: &str) -> Result<String, ChangelogError>;
}
