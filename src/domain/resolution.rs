use log::debug;
use std::collections::HashSet;
use thiserror::Error;

use super::catalog::{CatalogError, ReferenceCatalog};
use super::constraint::{ConstraintError, parse_specifier};
use super::source::{ConstraintSource, DocumentReader, SourceError};
use super::version::GameVersion;

/// Errors that can occur while resolving game version constraints
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("No valid game versions")]
    NoValidVersions,
}

/// Unique set of game versions matched by a list of specifiers.
///
/// Built once by [`ResolvedVersionSet::aggregate`] and consumed by
/// [`ResolvedVersionSet::into_ordered`].
#[derive(Debug)]
pub struct ResolvedVersionSet {
    /// Matched versions, deduplicated by exact string equality
    versions: HashSet<GameVersion>,
}

impl ResolvedVersionSet {
    /// Parse every specifier against `reference` and union the matches.
    ///
    /// Specifiers whose range boundary is not in the catalog are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::Constraint`] for a malformed specifier and
    /// [`ResolutionError::NoValidVersions`] if nothing matched at all.
    pub fn aggregate<S: AsRef<str>>(
        specifiers: &[S],
        reference: &ReferenceCatalog,
    ) -> Result<Self, ResolutionError> {
        let mut versions = HashSet::new();

        for specifier in specifiers {
            let raw = specifier.as_ref();
            match parse_specifier(raw, reference)? {
                Some(matched) => {
                    debug!("'{raw}' matched {} game version(s)", matched.len());
                    versions.extend(matched);
                }
                None => debug!("'{raw}' boundary is not a listed game version, skipping"),
            }
        }

        if versions.is_empty() {
            return Err(ResolutionError::NoValidVersions);
        }

        Ok(Self { versions })
    }

    #[must_use]
    pub fn contains(&self, version: &GameVersion) -> bool {
        self.versions.contains(version)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Project the set onto catalog order.
    ///
    /// Only catalog members are emitted. Exact versions that passed through
    /// unchecked but are not listed by the registry are dropped here.
    #[must_use]
    pub fn into_ordered(self, reference: &ReferenceCatalog) -> Vec<GameVersion> {
        for unlisted in self.versions.iter().filter(|v| !reference.contains(v)) {
            debug!("Dropping '{unlisted}': not a listed game version");
        }

        reference
            .iter()
            .filter(|version| self.versions.contains(*version))
            .cloned()
            .collect()
    }
}

/// Resolve a constraint source into the ordered list of game versions to publish for.
///
/// # Errors
///
/// Returns [`ResolutionError::Source`] if the specifiers cannot be collected,
/// [`ResolutionError::Constraint`] for a malformed specifier, and
/// [`ResolutionError::NoValidVersions`] if no listed version remains.
pub fn resolve_game_versions<R: DocumentReader>(
    source: &ConstraintSource,
    reader: &R,
    reference: &ReferenceCatalog,
) -> Result<Vec<GameVersion>, ResolutionError> {
    let specifiers = source.resolve(reader)?;
    debug!("Game version specifiers: {}", specifiers.join(", "));

    let ordered = ResolvedVersionSet::aggregate(&specifiers, reference)?.into_ordered(reference);
    if ordered.is_empty() {
        return Err(ResolutionError::NoValidVersions);
    }

    Ok(ordered)
}
