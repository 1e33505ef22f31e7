//! Configuration document loading.
//!
//! The configuration is a TOML document whose tables and values become the
//! data available to templates. Templates address it by key
//! (`{{ database.host }}`); [`ConfigTree::get`] offers the same dotted lookup
//! to Rust callers.
use std::path::Path;

use serde::Serialize;

use crate::error::ConfigError;

/// Parsed key/value configuration tree.
///
/// # Examples
///
/// ```
/// use stagehand::config::ConfigTree;
///
/// let tree = ConfigTree::parse("[database]\nhost = \"db1\"\nport = 5432\n")?;
/// assert_eq!(tree.get("database.host").and_then(|v| v.as_str()), Some("db1"));
/// assert_eq!(tree.get("database.port").and_then(|v| v.as_integer()), Some(5432));
/// assert!(tree.get("database.user").is_none());
/// # Ok::<(), toml::de::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigTree {
    root: toml::Table,
}

impl ConfigTree {
    /// Load and parse the configuration document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read (including when
    /// it does not exist) and [`ConfigError::Parse`] if it is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a configuration document from a string.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if `content` is not a valid document.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        Ok(Self {
            root: toml::from_str(content)?,
        })
    }

    /// Look up a value by dotted key path (`"section.key"`).
    #[must_use]
    pub fn get(&self, dotted: &str) -> Option<&toml::Value> {
        let mut parts = dotted.split('.');
        let first = self.root.get(parts.next()?)?;
        parts.try_fold(first, |value, key| value.as_table()?.get(key))
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Returns `true` if the document defines no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}
