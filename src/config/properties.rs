use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Matches `${name}` placeholders, allowing whitespace around the name
const PLACEHOLDER_PATTERN: &str = r"\$\{\s*([^}\s]+)\s*\}";

/// Errors that can occur when loading or applying properties
#[derive(Debug, Error)]
pub enum PropertiesError {
    #[error("failed to read properties file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown property '{name}' in config")]
    Unknown { name: String },

    #[error("invalid placeholder pattern")]
    Pattern(#[from] regex::Error),
}

/// Key/value pairs read from a `.properties` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(BTreeMap<String, String>);

impl Properties {
    /// Read and parse the properties file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertiesError::Read`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, PropertiesError> {
        let text = fs::read_to_string(path).map_err(|source| PropertiesError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Parse `key=value` lines. Comments, lines without `=`, and pairs with an
    /// empty key or value are skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim(), unquote(value.trim())))
            .filter(|(key, value)| !key.is_empty() && !value.is_empty())
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace `${name}` placeholders in every string of `document`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertiesError::Unknown`] for a placeholder naming a property
    /// that does not exist.
    pub fn interpolate(&self, document: &mut Value) -> Result<(), PropertiesError> {
        let placeholder = Regex::new(PLACEHOLDER_PATTERN)?;
        self.interpolate_with(&placeholder, document)
    }

    fn interpolate_with(
        &self,
        placeholder: &Regex,
        value: &mut Value,
    ) -> Result<(), PropertiesError> {
        match value {
            Value::String(text) => {
                if let Some(name) = placeholder
                    .captures_iter(text)
                    .filter_map(|caps| caps.get(1))
                    .map(|name| name.as_str())
                    .find(|name| self.get(name).is_none())
                {
                    return Err(PropertiesError::Unknown {
                        name: name.to_owned(),
                    });
                }
                let replaced = placeholder.replace_all(text, |caps: &Captures<'_>| {
                    caps.get(1)
                        .and_then(|name| self.get(name.as_str()))
                        .unwrap_or_default()
                        .to_owned()
                });
                *text = replaced.into_owned();
                Ok(())
            }
            Value::Array(items) => items
                .iter_mut()
                .try_for_each(|item| self.interpolate_with(placeholder, item)),
            Value::Object(fields) => fields
                .values_mut()
                .try_for_each(|field| self.interpolate_with(placeholder, field)),
            Value::Null | Value::Bool(_) | Value::Number(_) => Ok(()),
        }
    }
}

impl FromIterator<(String, String)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Remove one pair of matching surrounding quotes.
fn unquote(value: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|quote| {
            value
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        })
        .unwrap_or(value)
}
