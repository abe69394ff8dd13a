use serde::Serialize;
use std::fmt;

/// A game version identifier as listed by the registry (e.g., "0.3.1").
///
/// Versions are opaque: they are compared by exact string equality and by
/// their position in a reference catalog, never by numeric components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GameVersion(String);

impl GameVersion {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for GameVersion {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GameVersion {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl PartialEq<str> for GameVersion {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
