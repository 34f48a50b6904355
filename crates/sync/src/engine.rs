//! Sync engine: copies extension payloads from one editor into others and
//! merges their index entries.
//!
//! Targets are processed sequentially in request order. Failures are scoped
//! as narrowly as possible: a bad identifier only costs that identifier, a
//! bad target only that target; only an unusable source aborts the request.
//! Nothing is rolled back: payloads copied before a failed index write stay
//! on disk.

use crate::copy::{copy_tree, remove_tree};
use crate::error::{Result, SyncError};
use crate::index::{
    find_entry, merge_entries, read_index_named, read_index_or_empty, validate_relative_location,
    write_index_named, ExtensionIndexEntry,
};
use crate::profiles::{EditorProfile, ProfileRegistry};
use crate::report::{
    PlannedAction, PlannedExtension, PreviewReport, SyncReport, SyncResult, TargetPreview,
};
use crate::status::StatusInspector;
use crate::utils::fold_id;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Which extensions a request covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionSelection {
    /// Every extension in the source index, in index order.
    All,
    /// An explicit list; matched case-insensitively, spelling preserved.
    Ids(Vec<String>),
}

impl Default for ExtensionSelection {
    fn default() -> Self {
        Self::Ids(Vec::new())
    }
}

impl ExtensionSelection {
    /// Builds an explicit selection.
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Ids(ids.into_iter().map(Into::into).collect())
    }

    /// Expands the selection against a source snapshot.
    ///
    /// Explicit lists are trimmed and de-duplicated case-insensitively,
    /// keeping the first spelling; blank ids are dropped.
    pub fn resolve(&self, snapshot: &[ExtensionIndexEntry]) -> Vec<String> {
        let candidates: Vec<&str> = match self {
            Self::All => snapshot.iter().map(|e| e.identifier.id.as_str()).collect(),
            Self::Ids(ids) => ids.iter().map(|id| id.trim()).collect(),
        };
        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|id| !id.is_empty())
            .filter(|id| seen.insert(fold_id(id)))
            .map(str::to_string)
            .collect()
    }
}

/// A request to sync extensions from one editor into others.
///
/// ```
/// use extsync_sync::{ExtensionSelection, SyncRequest};
///
/// let request = SyncRequest {
///     source_editor: "vscode".into(),
///     target_editors: vec!["cursor".into()],
///     extensions: ExtensionSelection::ids(["ms-python.python"]),
///     ..Default::default()
/// };
/// assert!(!request.overwrite_conflicts);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub source_editor: String,
    /// Processed in order; duplicates are processed independently.
    pub target_editors: Vec<String>,
    pub extensions: ExtensionSelection,
    /// Replace extensions that already exist in a target.
    #[serde(default)]
    pub overwrite_conflicts: bool,
}

/// Orchestrates copy and index merge across one source and many targets.
pub struct SyncEngine<'a> {
    registry: &'a ProfileRegistry,
    inspector: StatusInspector,
}

impl<'a> SyncEngine<'a> {
    /// Creates an engine over `registry` that resolves CLIs through `PATH`.
    pub fn new(registry: &'a ProfileRegistry) -> Self {
        Self::with_inspector(registry, StatusInspector::new())
    }

    /// Creates an engine with a custom status inspector.
    pub fn with_inspector(registry: &'a ProfileRegistry, inspector: StatusInspector) -> Self {
        Self { registry, inspector }
    }

    /// Performs the sync.
    ///
    /// Fails only when the source editor is unknown, unavailable, or its
    /// index cannot be read. Everything else lands in the per-target results.
    pub fn sync(&self, request: &SyncRequest) -> Result<SyncReport> {
        let (source, snapshot) = self.load_source(&request.source_editor)?;
        let ids = request.extensions.resolve(&snapshot);

        tracing::info!(
            target: "extsync::sync",
            source = %source.id,
            targets = request.target_editors.len(),
            extensions = ids.len(),
            overwrite = request.overwrite_conflicts,
            "Starting sync"
        );

        let mut report = SyncReport::new(source.id.clone(), ids.clone());
        for target in &request.target_editors {
            let result =
                self.sync_target(source, &snapshot, target, &ids, request.overwrite_conflicts);
            tracing::info!(
                target: "extsync::sync",
                editor = %result.target_editor,
                copied = result.copied_count,
                skipped = result.skipped_count,
                overwritten = result.overwritten_count,
                errors = result.errors.len(),
                "Target synced"
            );
            report.push(result);
        }
        Ok(report)
    }

    /// Computes what [`SyncEngine::sync`] would do without touching disk.
    pub fn preview(&self, request: &SyncRequest) -> Result<PreviewReport> {
        let (source, snapshot) = self.load_source(&request.source_editor)?;
        let ids = request.extensions.resolve(&snapshot);

        let targets = request
            .target_editors
            .iter()
            .map(|target| {
                self.preview_target(source, &snapshot, target, &ids, request.overwrite_conflicts)
            })
            .collect();

        Ok(PreviewReport {
            source_editor: source.id.clone(),
            extension_ids: ids,
            overwrite_conflicts: request.overwrite_conflicts,
            targets,
        })
    }

    /// Returns the requested ids that already have an entry in the target
    /// index. A missing target index means no conflicts.
    pub fn detect_conflicts(
        &self,
        source_editor: &str,
        target_editor: &str,
        extension_ids: &[String],
    ) -> Result<Vec<String>> {
        self.registry.get(source_editor)?;
        let target = self.registry.get(target_editor)?;
        let index = read_index_or_empty(&target.extensions_root, &target.index_file_name)?;
        Ok(extension_ids
            .iter()
            .filter(|id| find_entry(&index, id).is_some())
            .cloned()
            .collect())
    }

    /// Resolves the source profile, checks it is available and reads its
    /// index once for the whole request.
    fn load_source(&self, editor: &str) -> Result<(&'a EditorProfile, Vec<ExtensionIndexEntry>)> {
        let source = self.registry.get(editor)?;
        let status = self.inspector.inspect(source);
        if !status.available {
            return Err(SyncError::Unavailable {
                editor: source.id.clone(),
                reason: status.unavailable_reason.unwrap_or_default(),
            });
        }
        let snapshot = read_index_named(&source.extensions_root, &source.index_file_name)?;
        Ok((source, snapshot))
    }

    fn sync_target(
        &self,
        source: &EditorProfile,
        snapshot: &[ExtensionIndexEntry],
        target_id: &str,
        ids: &[String],
        overwrite: bool,
    ) -> SyncResult {
        let mut result = SyncResult::new(target_id);

        let target = match self.registry.get(target_id) {
            Ok(profile) => profile,
            Err(e) => return fail(result, format!("Invalid target editor: {e}")),
        };
        let root = &target.extensions_root;
        if let Err(e) = fs::create_dir_all(root) {
            return fail(
                result,
                format!("Failed to create target directory {}: {e}", root.display()),
            );
        }
        if same_directory(&source.extensions_root, root) {
            return fail(
                result,
                format!(
                    "Target {} shares the source extensions root {}",
                    target.id,
                    root.display()
                ),
            );
        }
        let target_index = match read_index_or_empty(root, &target.index_file_name) {
            Ok(entries) => entries,
            Err(e) => return fail(result, format!("Failed to read target index: {e}")),
        };
        let existing: HashMap<String, &ExtensionIndexEntry> =
            target_index.iter().map(|e| (e.key(), e)).collect();

        let mut queued: Vec<ExtensionIndexEntry> = Vec::new();
        for id in ids {
            let Some(entry) = find_entry(snapshot, id) else {
                record_error(
                    &mut result,
                    format!("Extension {id} not found in source index"),
                );
                continue;
            };
            if let Err(e) = validate_relative_location(&entry.identifier.id, &entry.relative_location)
            {
                record_error(&mut result, format!("Cannot sync {id}: {e}"));
                continue;
            }

            let mut overwriting = false;
            if let Some(current) = existing.get(&fold_id(id)) {
                result.conflicts.push(id.clone());
                if !overwrite {
                    result.skipped_count += 1;
                    tracing::debug!(
                        target: "extsync::sync",
                        editor = %target.id,
                        extension = %id,
                        "Conflict skipped"
                    );
                    continue;
                }
                if let Err(e) = remove_payload(root, current) {
                    record_error(
                        &mut result,
                        format!("Failed to remove existing extension {id}: {e}"),
                    );
                    continue;
                }
                overwriting = true;
            }

            let from = source.extensions_root.join(&entry.relative_location);
            let to = root.join(&entry.relative_location);
            if let Err(e) = copy_tree(&from, &to) {
                record_error(&mut result, format!("Failed to copy extension {id}: {e}"));
                continue;
            }

            queued.push(entry.relocated(root));
            result.copied_count += 1;
            if overwriting {
                result.overwritten_count += 1;
            }
        }

        if !queued.is_empty() {
            let merged = merge_entries(&target_index, &queued);
            match write_index_named(root, &target.index_file_name, &merged) {
                Ok(()) => result.index_updated = true,
                Err(e) => record_error(&mut result, format!("Failed to update index: {e}")),
            }
        }

        result.success = result.errors.is_empty();
        result
    }

    /// Mirrors the checks of `sync_target` without creating directories,
    /// copying payloads or writing the index.
    fn preview_target(
        &self,
        source: &EditorProfile,
        snapshot: &[ExtensionIndexEntry],
        target_id: &str,
        ids: &[String],
        overwrite: bool,
    ) -> TargetPreview {
        let mut preview = TargetPreview {
            target_editor: target_id.to_string(),
            ..Default::default()
        };
        let target = match self.registry.get(target_id) {
            Ok(profile) => profile,
            Err(e) => {
                preview.errors.push(format!("Invalid target editor: {e}"));
                return preview;
            }
        };
        if same_directory(&source.extensions_root, &target.extensions_root) {
            preview.errors.push(format!(
                "Target {} shares the source extensions root {}",
                target.id,
                target.extensions_root.display()
            ));
            return preview;
        }
        let index = match read_index_or_empty(&target.extensions_root, &target.index_file_name) {
            Ok(entries) => entries,
            Err(e) => {
                preview.errors.push(format!("Failed to read target index: {e}"));
                return preview;
            }
        };

        for id in ids {
            let source_entry = find_entry(snapshot, id);
            let source_version = source_entry.map(|e| e.version.clone());
            let target_version = find_entry(&index, id).map(|e| e.version.clone());
            let invalid = source_entry.and_then(|e| {
                validate_relative_location(&e.identifier.id, &e.relative_location).err()
            });
            let action = match (&source_version, &target_version, invalid) {
                (None, _, _) => {
                    preview.missing.push(id.clone());
                    PlannedAction::Missing
                }
                (Some(_), _, Some(e)) => {
                    preview.errors.push(format!("Cannot sync {id}: {e}"));
                    PlannedAction::Invalid
                }
                (Some(_), Some(_), None) => {
                    preview.conflicts.push(id.clone());
                    if overwrite {
                        preview.overwrite_count += 1;
                        PlannedAction::Overwrite
                    } else {
                        PlannedAction::Skip
                    }
                }
                (Some(_), None, None) => {
                    preview.new_count += 1;
                    PlannedAction::Copy
                }
            };
            preview.extensions.push(PlannedExtension {
                id: id.clone(),
                action,
                source_version,
                target_version,
            });
        }
        preview
    }
}

fn fail(mut result: SyncResult, message: String) -> SyncResult {
    record_error(&mut result, message);
    result.success = false;
    result
}

fn record_error(result: &mut SyncResult, message: String) {
    tracing::warn!(
        target: "extsync::sync",
        editor = %result.target_editor,
        "{message}"
    );
    result.errors.push(message);
}

/// Removes the payload an existing target entry points at. The location is
/// validated first so a hostile index cannot direct removal outside `root`.
fn remove_payload(root: &Path, entry: &ExtensionIndexEntry) -> Result<()> {
    validate_relative_location(&entry.identifier.id, &entry.relative_location)?;
    remove_tree(&root.join(&entry.relative_location))
}

fn same_directory(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
