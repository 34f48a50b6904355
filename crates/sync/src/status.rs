//! Read-only status inspection of editor profiles.

use crate::index::resolve_index_path;
use crate::profiles::EditorProfile;
use crate::utils::is_hidden_component;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

/// Resolves a command name against the executable search path.
#[cfg_attr(test, automock)]
pub trait ExecutableLocator: Send + Sync {
    /// Returns the full path of `command`, or `None` when it is not reachable.
    fn locate(&self, command: &str) -> Option<PathBuf>;
}

/// [`ExecutableLocator`] backed by the process `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathLocator;

impl ExecutableLocator for PathLocator {
    fn locate(&self, command: &str) -> Option<PathBuf> {
        // Editor CLIs ship as `.cmd` shims on Windows.
        if cfg!(windows) {
            if let Ok(path) = which::which(format!("{command}.cmd")) {
                return Some(path);
            }
        }
        which::which(command).ok()
    }
}

/// Point-in-time view of one editor profile.
#[derive(Debug, Clone, Serialize)]
pub struct EditorStatus {
    pub editor: EditorProfile,
    pub directory_exists: bool,
    pub index_file_exists: bool,
    /// Non-hidden subdirectories of the extensions root.
    pub extension_count: usize,
    pub cli_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cli_path: Option<PathBuf>,
    pub available: bool,
    /// Set only when `available` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<String>,
}

/// Inspects profiles on disk. Never fails: absence degrades to flags.
pub struct StatusInspector {
    locator: Box<dyn ExecutableLocator>,
}

impl Default for StatusInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusInspector {
    /// Creates an inspector that resolves CLIs through `PATH`.
    pub fn new() -> Self {
        Self::with_locator(PathLocator)
    }

    /// Creates an inspector with a custom executable locator.
    pub fn with_locator(locator: impl ExecutableLocator + 'static) -> Self {
        Self {
            locator: Box::new(locator),
        }
    }

    /// Computes the status of `profile`.
    ///
    /// A missing extensions root short-circuits: the remaining checks are
    /// skipped and `unavailable_reason` names the missing path.
    pub fn inspect(&self, profile: &EditorProfile) -> EditorStatus {
        let mut status = EditorStatus {
            editor: profile.clone(),
            directory_exists: false,
            index_file_exists: false,
            extension_count: 0,
            cli_available: false,
            cli_path: None,
            available: false,
            unavailable_reason: None,
        };

        if !profile.extensions_root.is_dir() {
            status.unavailable_reason = Some(format!(
                "Extensions directory not found: {}",
                profile.extensions_root.display()
            ));
            return status;
        }
        status.directory_exists = true;

        status.index_file_exists =
            resolve_index_path(&profile.extensions_root, &profile.index_file_name).is_some();

        if let Some(command) = profile.cli_command.as_deref() {
            if let Some(path) = self.locator.locate(command) {
                status.cli_available = true;
                status.cli_path = Some(path);
            }
        }

        status.extension_count = count_extension_dirs(&profile.extensions_root);
        status.available = status.directory_exists;

        tracing::debug!(
            target: "extsync::status",
            editor = %profile.id,
            extensions = status.extension_count,
            index = status.index_file_exists,
            cli = status.cli_available,
            "Inspected editor"
        );
        status
    }
}

/// Counts the non-hidden subdirectories directly under `root`.
///
/// Best-effort: an unreadable root counts as zero and entries whose type
/// cannot be determined are left out of the count instead of failing.
pub fn count_extension_dirs(root: &Path) -> usize {
    let Ok(entries) = fs::read_dir(root) else {
        return 0;
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| !is_hidden_component(&entry.file_name().to_string_lossy()))
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .count()
}
