//! Sync reporting types for tracking what was copied, skipped and failed.

use serde::{Deserialize, Serialize};

/// Outcome of syncing into one target editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub target_editor: String,
    /// True iff `errors` is empty. Skipped conflicts are not errors.
    pub success: bool,
    pub copied_count: usize,
    pub skipped_count: usize,
    /// Copies that replaced an existing entry (also counted in `copied_count`).
    pub overwritten_count: usize,
    pub index_updated: bool,
    /// Requested ids that already had an entry in the target index.
    pub conflicts: Vec<String>,
    pub errors: Vec<String>,
}

impl SyncResult {
    /// Creates an empty result for `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target_editor: target.into(),
            ..Default::default()
        }
    }

    /// Conflicts that were left in place (skipped rather than overwritten).
    pub fn has_unresolved_conflicts(&self) -> bool {
        self.skipped_count > 0
    }
}

/// Aggregate of one [`SyncResult`] per requested target, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub source_editor: String,
    /// Identifiers that were requested after selection and de-duplication.
    pub extension_ids: Vec<String>,
    pub results: Vec<SyncResult>,
    pub total_copied: usize,
    pub total_skipped: usize,
    pub total_overwritten: usize,
    pub total_errors: usize,
}

impl SyncReport {
    /// Creates an empty report for `source`.
    pub fn new(source: impl Into<String>, extension_ids: Vec<String>) -> Self {
        Self {
            source_editor: source.into(),
            extension_ids,
            ..Default::default()
        }
    }

    /// Appends a target result and folds it into the totals.
    pub fn push(&mut self, result: SyncResult) {
        self.total_copied += result.copied_count;
        self.total_skipped += result.skipped_count;
        self.total_overwritten += result.overwritten_count;
        self.total_errors += result.errors.len();
        self.results.push(result);
    }

    /// True when any target recorded an error.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// True when any target skipped a conflicting extension.
    pub fn has_unresolved_conflicts(&self) -> bool {
        self.results.iter().any(SyncResult::has_unresolved_conflicts)
    }

    /// Generates a formatted summary for display.
    pub fn format_summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Sync Report: {}\n", self.source_editor));
        out.push_str(&format!("Extensions requested: {}\n", self.extension_ids.len()));
        for result in &self.results {
            let status = if result.success { "ok" } else { "failed" };
            out.push_str(&format!("\nTarget: {} [{}]\n", result.target_editor, status));
            out.push_str(&format!(
                "  Copied: {}, Skipped: {}, Overwritten: {}, Index updated: {}\n",
                result.copied_count,
                result.skipped_count,
                result.overwritten_count,
                if result.index_updated { "yes" } else { "no" }
            ));
            if !result.conflicts.is_empty() {
                out.push_str(&format!("  Conflicts: {}\n", result.conflicts.join(", ")));
            }
            if !result.errors.is_empty() {
                out.push_str("  Errors:\n");
                for error in &result.errors {
                    out.push_str(&format!("    - {error}\n"));
                }
            }
        }
        out.push_str(&format!(
            "\nTotal: copied {}, skipped {}, overwritten {}, errors {}\n",
            self.total_copied, self.total_skipped, self.total_overwritten, self.total_errors
        ));
        out
    }
}

/// What a sync would do with one requested extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannedAction {
    /// Not in the target yet; would be copied.
    Copy,
    /// In the target; would be replaced (overwrite enabled).
    Overwrite,
    /// In the target; would be left alone (overwrite disabled).
    Skip,
    /// Not in the source index.
    Missing,
    /// In the source index, but its payload location cannot be synced.
    Invalid,
}

/// Planned handling of one extension for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedExtension {
    pub id: String,
    pub action: PlannedAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,
}

/// Dry-run outcome for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPreview {
    pub target_editor: String,
    pub new_count: usize,
    pub conflicts: Vec<String>,
    pub overwrite_count: usize,
    pub missing: Vec<String>,
    pub extensions: Vec<PlannedExtension>,
    pub errors: Vec<String>,
}

/// Dry-run outcome for a whole request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewReport {
    pub source_editor: String,
    pub extension_ids: Vec<String>,
    pub overwrite_conflicts: bool,
    pub targets: Vec<TargetPreview>,
}

impl PreviewReport {
    /// True when any target could not be previewed or an id is missing.
    pub fn has_errors(&self) -> bool {
        self.targets
            .iter()
            .any(|t| !t.errors.is_empty() || !t.missing.is_empty())
    }

    /// True when conflicts exist and would be skipped.
    pub fn has_unresolved_conflicts(&self) -> bool {
        !self.overwrite_conflicts && self.targets.iter().any(|t| !t.conflicts.is_empty())
    }

    /// Generates a formatted summary for display.
    pub fn format_summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Sync Preview: {}\n", self.source_editor));
        out.push_str(&format!("Extensions to sync: {}\n", self.extension_ids.len()));
        for target in &self.targets {
            out.push_str(&format!("\nTarget: {}\n", target.target_editor));
            for error in &target.errors {
                out.push_str(&format!("  Error: {error}\n"));
            }
            out.push_str(&format!("  New (to install): {}\n", target.new_count));
            out.push_str(&format!(
                "  Conflicts: {} ({} would be overwritten)\n",
                target.conflicts.len(),
                target.overwrite_count
            ));
            if !target.conflicts.is_empty() {
                out.push_str(&format!("  Conflicting IDs: {}\n", target.conflicts.join(", ")));
            }
            if !target.missing.is_empty() {
                out.push_str(&format!("  Not in source: {}\n", target.missing.join(", ")));
            }
        }
        out
    }
}
