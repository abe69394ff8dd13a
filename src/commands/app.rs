use thiserror::Error;

use crate::config::PublishConfig;
use crate::domain::resolution::ResolutionError;
use crate::domain::version::GameVersion;
use crate::infrastructure::crmm::CrmmClient;
use crate::infrastructure::document::FileDocuments;
use crate::infrastructure::github::GithubReleases;
use crate::infrastructure::http::HttpError;

use super::publish::{PublishError, PublishOptions, PublishReport};

/// Errors that can occur during command orchestration
#[derive(Debug, Error)]
pub enum AppError {
    /// An API client could not be initialized.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The publish command failed.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// The versions command failed.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Run the publish command against the registry configured in `config`.
///
/// # Errors
///
/// Returns [`AppError::Http`] if a client cannot be created.
/// Returns [`AppError::Publish`] if the publish command fails.
pub fn publish(config: &PublishConfig, options: PublishOptions) -> Result<PublishReport, AppError> {
    let crmm = CrmmClient::new(&config.api_url)?;
    let releases = GithubReleases::from_env()?;
    Ok(super::publish::run(
        config,
        &crmm,
        &releases,
        &crmm,
        &FileDocuments,
        options,
    )?)
}

/// Run the versions command against the registry configured in `config`.
///
/// # Errors
///
/// Returns [`AppError::Http`] if the client cannot be created.
/// Returns [`AppError::Resolution`] if the game versions cannot be resolved.
pub fn versions(config: &PublishConfig) -> Result<Vec<GameVersion>, AppError> {
    let crmm = CrmmClient::new(&config.api_url)?;
    Ok(super::versions::run(config, &crmm, &FileDocuments)?)
}
