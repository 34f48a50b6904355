//! Configuration file support for extsync.
//!
//! Loads editor settings from `~/.extsync/config.toml` (or `EXTSYNC_CONFIG`)
//! with the following precedence:
//! CLI arguments > Environment variables > Config file
//!
//! ## Configuration File Format
//!
//! ```toml
//! # ~/.extsync/config.toml
//!
//! # Override the extensions root of a built-in editor
//! [editors.cursor]
//! extensions_dir = "/opt/cursor/extensions"
//!
//! # An id that is not built in declares a custom editor
//! [editors.my-fork]
//! name = "My Fork"
//! extensions_dir = "/home/me/.my-fork/extensions"
//! index_file = "extensions.json"
//! cli_command = "myfork"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::env::config_file;

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Config {
    /// Per-editor settings keyed by editor id.
    #[serde(default)]
    pub editors: BTreeMap<String, EditorOverride>,
}

/// Settings for one editor. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct EditorOverride {
    /// Display name.
    pub name: Option<String>,
    /// Absolute path of the extensions root.
    pub extensions_dir: Option<PathBuf>,
    /// Index filename inside the extensions root.
    pub index_file: Option<String>,
    /// Companion CLI command; an empty string clears it.
    pub cli_command: Option<String>,
}

/// Loads the configuration file if it exists.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Ok(Some(config))` if the file exists and parses successfully.
/// Returns `Err` if the file exists but fails to parse.
pub fn load_config() -> Result<Option<Config>> {
    let Some(path) = config_file() else {
        return Ok(None);
    };
    load_config_from(&path)
}

/// Loads the configuration from an explicit path, with the same contract as
/// [`load_config`].
pub fn load_config_from(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("parsing config file {}", path.display()))?;

    tracing::debug!(
        target: "extsync::config",
        path = %path.display(),
        editors = config.editors.len(),
        "Loaded configuration file"
    );

    Ok(Some(config))
}
