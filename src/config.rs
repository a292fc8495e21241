// src/config.rs
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::debug;

use crate::error::{ParseError, Result};

/// First-cell prefixes dstat writes on its banner lines.
pub const DEFAULT_IGNORE_PREFIXES: &[&str] = &["Dstat ", "Author:", "Host:", "Cmdline:"];

/// Parser settings. Everything has a default, so an empty YAML document is a valid config.
///
/// ```yaml
/// ignore_prefixes:
///   - "Dstat "
///   - "Author:"
///   - "Host:"
///   - "Cmdline:"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Rows before the headers whose first cell starts with one of these are skipped.
    pub ignore_prefixes: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            ignore_prefixes: DEFAULT_IGNORE_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl ParserConfig {
    /// A config that skips nothing; the first row is taken as the category header.
    pub fn empty() -> Self {
        Self {
            ignore_prefixes: Vec::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ignore_prefixes.push(prefix.into());
        self
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(ParseError::from)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ParseError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        debug!(path = %path.display(), prefixes = config.ignore_prefixes.len(), "loaded parser config");
        Ok(config)
    }

    /// True when `first_cell` marks a banner/metadata row.
    pub fn is_ignored(&self, first_cell: &str) -> bool {
        self.ignore_prefixes
            .iter()
            .any(|prefix| first_cell.starts_with(prefix.as_str()))
    }
}
