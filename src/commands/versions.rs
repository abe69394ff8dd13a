use log::{debug, info};
use serde_json::Value;

use crate::config::PublishConfig;
use crate::domain::catalog::{GameVersionCatalog, ReferenceCatalog};
use crate::domain::resolution::{ResolutionError, resolve_game_versions};
use crate::domain::source::DocumentReader;
use crate::domain::version::GameVersion;

/// Resolve the configured game versions against an already fetched raw catalog.
///
/// # Errors
///
/// Returns [`ResolutionError`] if the catalog is malformed, the source or a
/// specifier is invalid, or nothing resolves.
pub fn resolve<R: DocumentReader>(
    config: &PublishConfig,
    raw_catalog: &Value,
    reader: &R,
) -> Result<Vec<GameVersion>, ResolutionError> {
    let reference = ReferenceCatalog::filter(raw_catalog, &config.allowed_release_types)?;
    debug!(
        "{} catalog versions classified as {}",
        reference.len(),
        config.allowed_release_types
    );
    resolve_game_versions(&config.game_versions, reader, &reference)
}

/// Run the versions command: fetch the catalog and print the resolved game versions.
///
/// # Errors
///
/// Returns [`ResolutionError::Catalog`] if the catalog cannot be fetched, and
/// any error of [`resolve`].
pub fn run<C: GameVersionCatalog, R: DocumentReader>(
    config: &PublishConfig,
    catalog: &C,
    reader: &R,
) -> Result<Vec<GameVersion>, ResolutionError> {
    info!("Fetching game versions...");
    let raw_catalog = catalog.fetch_game_versions()?;
    let versions = resolve(config, &raw_catalog, reader)?;

    info!("Resolved {} game version(s):", versions.len());
    for version in &versions {
        info!("{version}");
    }
    Ok(versions)
}
