use std::fmt;
use thiserror::Error;

use super::catalog::ReferenceCatalog;
use super::version::GameVersion;

/// Characters that mark a specifier as a constraint rather than a plain version
const OPERATOR_CHARS: [char; 3] = ['=', '<', '>'];

/// Errors that can occur while parsing a version specifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("Cannot parse version string: '{specifier}'")]
    InvalidOperator { specifier: String },
}

/// A single parsed game version specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// `1.2` or `=1.2`, taken as is
    Exact(GameVersion),
    /// `>1.2`
    GreaterThan(GameVersion),
    /// `>=1.2`
    GreaterOrEqual(GameVersion),
    /// `<1.2`
    LessThan(GameVersion),
    /// `<=1.2`
    LessOrEqual(GameVersion),
}

impl VersionConstraint {
    /// Parse a raw specifier such as `v1.2`, `>=0.3.1` or `<1.0`.
    ///
    /// One leading `v` is stripped before anything else. A specifier without
    /// any of `=`, `<`, `>` is an exact version.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError::InvalidOperator`] if the specifier contains an
    /// operator character but does not start with `<=`, `>=`, `<`, `>` or `=`.
    pub fn parse(raw: &str) -> Result<Self, ConstraintError> {
        let specifier = raw.strip_prefix('v').unwrap_or(raw);

        if !specifier.contains(OPERATOR_CHARS) {
            return Ok(Self::Exact(GameVersion::from(specifier)));
        }

        let prefixes: [(&str, fn(GameVersion) -> Self); 5] = [
            ("<=", Self::LessOrEqual),
            (">=", Self::GreaterOrEqual),
            ("<", Self::LessThan),
            (">", Self::GreaterThan),
            ("=", Self::Exact),
        ];

        prefixes
            .iter()
            .find_map(|&(operator, constructor)| {
                specifier
                    .strip_prefix(operator)
                    .map(|boundary| constructor(GameVersion::from(boundary)))
            })
            .ok_or_else(|| ConstraintError::InvalidOperator {
                specifier: specifier.to_owned(),
            })
    }

    /// Expand the constraint into concrete versions.
    ///
    /// Exact versions are returned without checking the catalog. Ranges are
    /// resolved by catalog position and return `None` when their boundary is
    /// not listed.
    #[must_use]
    pub fn resolve(&self, reference: &ReferenceCatalog) -> Option<Vec<GameVersion>> {
        match self {
            Self::Exact(version) => Some(vec![version.clone()]),
            Self::LessThan(boundary) => reference.older_than(boundary, false),
            Self::LessOrEqual(boundary) => reference.older_than(boundary, true),
            Self::GreaterThan(boundary) => reference.newer_than(boundary, false),
            Self::GreaterOrEqual(boundary) => reference.newer_than(boundary, true),
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "={v}"),
            Self::GreaterThan(v) => write!(f, ">{v}"),
            Self::GreaterOrEqual(v) => write!(f, ">={v}"),
            Self::LessThan(v) => write!(f, "<{v}"),
            Self::LessOrEqual(v) => write!(f, "<={v}"),
        }
    }
}

/// Parse `raw` and expand it against `reference`.
///
/// `Ok(None)` is a soft miss: the range boundary is not in the catalog.
///
/// # Errors
///
/// Returns [`ConstraintError::InvalidOperator`] for an unrecognized operator.
pub fn parse_specifier(
    raw: &str,
    reference: &ReferenceCatalog,
) -> Result<Option<Vec<GameVersion>>, ConstraintError> {
    Ok(VersionConstraint::parse(raw)?.resolve(reference))
}
