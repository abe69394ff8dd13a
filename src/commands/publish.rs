use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, info, log};
use serde_json::Value;
use std::panic;
use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::config::{ConfigError, PublishConfig};
use crate::domain::catalog::{CatalogError, GameVersionCatalog};
use crate::domain::changelog::{ChangelogError, ChangelogSource};
use crate::domain::resolution::ResolutionError;
use crate::domain::source::DocumentReader;
use crate::domain::upload::{UploadError, VersionPublisher, VersionUpload};
use crate::infrastructure::files::{self, FileError};

use super::versions;

/// Errors that can occur while publishing a version
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    #[error(transparent)]
    Files(#[from] FileError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Options of a publish run
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishOptions {
    /// Build the upload without sending it
    pub dry_run: bool,
}

/// Outcome of a publish run
#[derive(Debug)]
pub struct PublishReport {
    pub upload: VersionUpload,
    /// Registry response, `None` for dry runs
    pub response: Option<Value>,
}

/// Run the publish command.
///
/// The catalog and the changelog are fetched concurrently. Credentials are
/// only required when the upload is actually sent.
///
/// # Errors
///
/// Returns [`PublishError::Config`] if credentials are missing,
/// [`PublishError::Catalog`] or [`PublishError::Changelog`] if a fetch fails,
/// [`PublishError::Resolution`] if no game version resolves,
/// [`PublishError::Files`] if an upload file cannot be read, and
/// [`PublishError::Upload`] if the registry rejects the version.
pub fn run<C, L, P, R>(
    config: &PublishConfig,
    catalog: &C,
    releases: &L,
    publisher: &P,
    reader: &R,
    options: PublishOptions,
) -> Result<PublishReport, PublishError>
where
    C: GameVersionCatalog,
    L: ChangelogSource + Sync,
    P: VersionPublisher,
    R: DocumentReader,
{
    let credentials = if options.dry_run {
        None
    } else {
        Some(config.crmm.credentials()?)
    };

    info!("Fetching game versions and changelog...");
    let (raw_catalog, changelog_text) = thread::scope(|scope| {
        let changelog = scope.spawn(|| config.changelog.text(releases));
        let raw = catalog.fetch_game_versions();
        (raw, changelog.join())
    });
    let changelog = changelog_text.unwrap_or_else(|payload| panic::resume_unwind(payload))?;

    let game_versions = versions::resolve(config, &raw_catalog?, reader)?;
    info!(
        "Game versions: {}",
        game_versions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    info!("Reading files...");
    let primary_file = files::load_file(&config.files.primary)?;
    let additional_files = files::load_files(&config.files.additional)?;

    let upload = VersionUpload {
        title: config.title.clone(),
        changelog,
        featured: config.featured,
        release_channel: config.release_channel,
        version_number: config.version.clone(),
        loaders: config.loaders.clone(),
        game_versions,
        dependencies: config.dependencies.clone(),
        primary_file,
        additional_files,
    };
    log!(payload_level(options), "{upload:#?}");

    let Some(credentials) = credentials else {
        info!("Dry run, skipping upload of {} {}", upload.title, upload.version_number);
        return Ok(PublishReport {
            upload,
            response: None,
        });
    };

    info!("Uploading version...");
    let spinner = upload_spinner(&upload);
    let response =
        publisher.upload_version(credentials.project_id, credentials.auth_token, &upload);
    spinner.finish_and_clear();

    Ok(PublishReport {
        upload,
        response: Some(response?),
    })
}

/// Dry runs show the payload in place of the upload, real runs only with `--verbose`.
fn payload_level(options: PublishOptions) -> Level {
    if options.dry_run {
        Level::Info
    } else {
        Level::Debug
    }
}

/// Spinner shown while the upload is in flight. Hidden when stderr is not a terminal.
fn upload_spinner(upload: &VersionUpload) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")
    {
        spinner.set_style(style);
    }
    spinner.set_message(format!(
        "Uploading {} ({} file(s))",
        upload.primary_file.name,
        upload.additional_files.len().saturating_add(1)
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
