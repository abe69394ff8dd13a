use serde_json::Value;
use std::ffi::OsStr;
use std::path::Path;

/// Text format of a structured document, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
    Yaml,
}

impl DocumentFormat {
    /// `.toml` and `.yaml`/`.yml` select their formats, anything else is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(OsStr::to_str) {
            Some("toml") => Self::Toml,
            Some("yaml" | "yml") => Self::Yaml,
            Some(_) | None => Self::Json,
        }
    }

    /// Parse `text` into a JSON-shaped value.
    ///
    /// # Errors
    ///
    /// Returns the parser's message if `text` is not valid in this format.
    pub fn parse(self, text: &str) -> Result<Value, String> {
        match self {
            Self::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(text).map_err(|e| e.to_string()),
            Self::Yaml => serde_saphyr::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// Walk `key_path` as nested field accesses.
///
/// Numeric segments index into sequences. Returns `None` as soon as a segment
/// cannot be followed.
pub fn lookup<'doc, S: AsRef<str>>(document: &'doc Value, key_path: &[S]) -> Option<&'doc Value> {
    key_path
        .iter()
        .try_fold(document, |current, segment| match current {
            Value::Object(fields) => fields.get(segment.as_ref()),
            Value::Array(items) => segment
                .as_ref()
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
        })
}

/// Short name of a value's JSON type, for error messages.
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
