use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use super::document::value_kind;
use super::version::GameVersion;

/// Errors that can occur while obtaining the game version catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to fetch game versions: {reason}")]
    Fetch { reason: String },

    #[error("Failed to fetch game versions: the registry returned no catalog")]
    Missing,

    #[error("Failed to fetch game versions: expected a list, got {kind}")]
    NotAList { kind: &'static str },

    #[error("Failed to fetch game versions: entry {position} has {kind} as its value")]
    MalformedEntry { position: usize, kind: &'static str },
}

/// Maturity tag attached to each catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseType {
    Release,
    Beta,
    Alpha,
    PreRelease,
    Snapshot,
}

impl ReleaseType {
    /// Parse the registry's wire name. Unknown names yield `None`.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "release" => Some(Self::Release),
            "beta" => Some(Self::Beta),
            "alpha" => Some(Self::Alpha),
            "pre-release" => Some(Self::PreRelease),
            "snapshot" => Some(Self::Snapshot),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Beta => "beta",
            Self::Alpha => "alpha",
            Self::PreRelease => "pre-release",
            Self::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release types whose versions may be targeted. Defaults to release, beta and alpha.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AllowedReleaseTypes(BTreeSet<ReleaseType>);

impl AllowedReleaseTypes {
    #[must_use]
    pub fn new<I: IntoIterator<Item = ReleaseType>>(types: I) -> Self {
        Self(types.into_iter().collect())
    }

    #[must_use]
    pub fn contains(&self, release_type: ReleaseType) -> bool {
        self.0.contains(&release_type)
    }
}

impl Default for AllowedReleaseTypes {
    fn default() -> Self {
        Self::new([ReleaseType::Release, ReleaseType::Beta, ReleaseType::Alpha])
    }
}

impl fmt::Display for AllowedReleaseTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|t| t.as_str()).collect();
        write!(f, "{}", names.join(", "))
    }
}

/// Source of the registry's game version catalog
pub trait GameVersionCatalog {
    /// Fetch the raw catalog, a list of `{value, releaseType}` objects sorted
    /// from most recent to least recent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Fetch`] if the catalog cannot be retrieved.
    fn fetch_game_versions(&self) -> Result<Value, CatalogError>;
}

/// Ordered list of publishable game versions, most recent first.
///
/// Range constraints are resolved against this list by position. Entries are
/// assumed to be unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceCatalog {
    versions: Vec<GameVersion>,
}

impl ReferenceCatalog {
    #[must_use]
    pub fn new(versions: Vec<GameVersion>) -> Self {
        Self { versions }
    }

    /// Keep the raw entries whose release type is allowed, in input order.
    ///
    /// Entries without a recognised string `releaseType` are dropped like any
    /// other entry outside `allowed`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Missing`] for `null`, [`CatalogError::NotAList`]
    /// for any other non-list value, and [`CatalogError::MalformedEntry`] if an
    /// allowed entry's `value` is not a string.
    pub fn filter(raw: &Value, allowed: &AllowedReleaseTypes) -> Result<Self, CatalogError> {
        let entries = match raw {
            Value::Array(entries) => entries,
            Value::Null => return Err(CatalogError::Missing),
            Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Object(_) => {
                return Err(CatalogError::NotAList {
                    kind: value_kind(raw),
                });
            }
        };

        let versions = entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                entry
                    .get("releaseType")
                    .and_then(Value::as_str)
                    .and_then(ReleaseType::from_wire)
                    .is_some_and(|t| allowed.contains(t))
            })
            .map(|(position, entry)| {
                let value = entry.get("value").unwrap_or(&Value::Null);
                value
                    .as_str()
                    .map(GameVersion::from)
                    .ok_or(CatalogError::MalformedEntry {
                        position,
                        kind: value_kind(value),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { versions })
    }

    /// Position of the entry equal to `version`.
    #[must_use]
    pub fn position(&self, version: &GameVersion) -> Option<usize> {
        self.versions.iter().position(|v| v == version)
    }

    #[must_use]
    pub fn contains(&self, version: &GameVersion) -> bool {
        self.versions.contains(version)
    }

    /// Entries listed after `boundary` (older versions), and the boundary
    /// itself when `inclusive`. `None` if the boundary is not in the catalog.
    #[must_use]
    pub fn older_than(&self, boundary: &GameVersion, inclusive: bool) -> Option<Vec<GameVersion>> {
        self.relative_to(boundary, Ordering::Greater, inclusive)
    }

    /// Entries listed before `boundary` (newer versions), and the boundary
    /// itself when `inclusive`. `None` if the boundary is not in the catalog.
    #[must_use]
    pub fn newer_than(&self, boundary: &GameVersion, inclusive: bool) -> Option<Vec<GameVersion>> {
        self.relative_to(boundary, Ordering::Less, inclusive)
    }

    /// Select entries whose position compares to the boundary's as `side`.
    fn relative_to(
        &self,
        boundary: &GameVersion,
        side: Ordering,
        inclusive: bool,
    ) -> Option<Vec<GameVersion>> {
        let boundary_index = self.position(boundary)?;
        let selected = self
            .versions
            .iter()
            .enumerate()
            .filter(|&(index, _)| {
                let ordering = index.cmp(&boundary_index);
                ordering == side || (inclusive && ordering == Ordering::Equal)
            })
            .map(|(_, version)| version.clone())
            .collect();
        Some(selected)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GameVersion> {
        self.versions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl FromIterator<GameVersion> for ReferenceCatalog {
    fn from_iter<I: IntoIterator<Item = GameVersion>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'catalog> IntoIterator for &'catalog ReferenceCatalog {
    type Item = &'catalog GameVersion;
    type IntoIter = std::slice::Iter<'catalog, GameVersion>;

    fn into_iter(self) -> Self::IntoIter {
        self.versions.iter()
    }
}
