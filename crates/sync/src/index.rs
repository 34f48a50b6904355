//! Extension index codec.
//!
//! The index is a single JSON array stored in the extensions root. Record
//! order is preserved on read; writes are compact (one line) to match what
//! the editors themselves produce. Writes are not atomic.

use crate::error::{Result, SyncError};
use crate::profiles::{FALLBACK_INDEX_FILE, PRIMARY_INDEX_FILE};
use crate::utils::{fold_id, location_path};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// The `identifier` block of an index entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionIdentifier {
    /// `<publisher>.<name>`; unique per index when case-folded.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

/// The redundant `location` URI record kept for format compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionLocation {
    #[serde(rename = "$mid", default = "default_mid")]
    pub mid: i64,
    /// Absolute payload path with forward slashes.
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_mid() -> i64 {
    1
}

fn default_scheme() -> String {
    "file".to_string()
}

impl ExtensionLocation {
    /// Builds a `file` location for an absolute payload directory.
    pub fn for_path(path: &Path) -> Self {
        Self {
            mid: default_mid(),
            path: location_path(path),
            scheme: default_scheme(),
            extra: Map::new(),
        }
    }
}

/// One record of the index file.
///
/// `metadata` and any unrecognised top-level keys are carried through
/// verbatim and never interpreted. A `metadata` key that is present but
/// `null` stays `null`; key order inside it is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionIndexEntry {
    pub identifier: ExtensionIdentifier,
    /// Free-form version string.
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ExtensionLocation>,
    /// Payload directory relative to the extensions root.
    #[serde(rename = "relativeLocation", default)]
    pub relative_location: String,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Distinguishes a present-but-null field (`Some(Value::Null)`) from an
/// absent one (`None`, via `#[serde(default)]`).
fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl ExtensionIndexEntry {
    /// Case-folded identifier.
    pub fn key(&self) -> String {
        fold_id(&self.identifier.id)
    }

    /// Returns true if this entry's id matches `id` case-insensitively.
    pub fn matches(&self, id: &str) -> bool {
        self.key() == fold_id(id)
    }

    /// Same record relocated under another extensions root: identifier,
    /// version, relative location and metadata are kept, `location` is
    /// rewritten to the new absolute payload path.
    pub fn relocated(&self, target_root: &Path) -> Self {
        let mut entry = self.clone();
        entry.location = Some(ExtensionLocation::for_path(
            &target_root.join(&self.relative_location),
        ));
        entry
    }
}

/// Returns the index file to read inside `root`: `index_file_name` when it
/// exists, otherwise the singular fallback spelling.
pub fn resolve_index_path(root: &Path, index_file_name: &str) -> Option<PathBuf> {
    [index_file_name, FALLBACK_INDEX_FILE]
        .into_iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Reads `extensions.json` (or its fallback) from `root`.
pub fn read_index(root: &Path) -> Result<Vec<ExtensionIndexEntry>> {
    read_index_named(root, PRIMARY_INDEX_FILE)
}

/// Reads the index named `index_file_name` (or the fallback) from `root`.
pub fn read_index_named(root: &Path, index_file_name: &str) -> Result<Vec<ExtensionIndexEntry>> {
    let path = resolve_index_path(root, index_file_name).ok_or_else(|| SyncError::IndexNotFound {
        root: root.to_path_buf(),
    })?;
    let data = fs::read(&path).map_err(|e| SyncError::io(&path, e))?;
    let entries: Vec<ExtensionIndexEntry> =
        serde_json::from_slice(&data).map_err(|source| SyncError::IndexCorrupt {
            path: path.clone(),
            source,
        })?;

    tracing::debug!(
        target: "extsync::index",
        path = %path.display(),
        entries = entries.len(),
        "Read extensions index"
    );
    Ok(entries)
}

/// Like [`read_index_named`], but a missing index is an empty list.
pub fn read_index_or_empty(root: &Path, index_file_name: &str) -> Result<Vec<ExtensionIndexEntry>> {
    match read_index_named(root, index_file_name) {
        Err(SyncError::IndexNotFound { .. }) => Ok(Vec::new()),
        other => other,
    }
}

/// Writes `entries` to `root/extensions.json` as compact JSON.
pub fn write_index(root: &Path, entries: &[ExtensionIndexEntry]) -> Result<()> {
    write_index_named(root, PRIMARY_INDEX_FILE, entries)
}

/// Writes `entries` to `root/<index_file_name>` as compact JSON.
pub fn write_index_named(
    root: &Path,
    index_file_name: &str,
    entries: &[ExtensionIndexEntry],
) -> Result<()> {
    let path = root.join(index_file_name);
    let data = serde_json::to_vec(entries).map_err(|e| SyncError::io(&path, e.into()))?;
    fs::write(&path, data).map_err(|e| SyncError::io(&path, e))?;

    tracing::debug!(
        target: "extsync::index",
        path = %path.display(),
        entries = entries.len(),
        "Wrote extensions index"
    );
    Ok(())
}

/// Finds an entry by identifier, case-insensitively.
pub fn find_entry<'a>(
    entries: &'a [ExtensionIndexEntry],
    id: &str,
) -> Option<&'a ExtensionIndexEntry> {
    let key = fold_id(id);
    entries.iter().find(|e| e.key() == key)
}

/// Checks that a relative location names a directory strictly inside its
/// extensions root: non-empty, not absolute, no `..` segments.
pub fn validate_relative_location(id: &str, location: &str) -> Result<()> {
    let invalid = || SyncError::InvalidLocation {
        id: id.to_string(),
        location: location.to_string(),
    };

    if location.trim().is_empty() || location.starts_with(['/', '\\']) {
        return Err(invalid());
    }
    // Check both separators so a Windows-authored index is judged the same
    // on every host.
    if location.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(invalid());
    }
    let path = Path::new(location);
    if path.is_absolute()
        || !path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(invalid());
    }
    Ok(())
}

/// Merges a batch of new entries into an existing index.
///
/// Existing entries sharing an identifier with the batch are dropped; the
/// rest keep their relative order and the batch is appended after them.
pub fn merge_entries(
    existing: &[ExtensionIndexEntry],
    added: &[ExtensionIndexEntry],
) -> Vec<ExtensionIndexEntry> {
    let replaced: HashSet<String> = added.iter().map(ExtensionIndexEntry::key).collect();
    existing
        .iter()
        .filter(|entry| !replaced.contains(&entry.key()))
        .chain(added.iter())
        .cloned()
        .collect()
}

/// An index entry as seen by a listing, with a dangling-payload flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledExtension {
    pub id: String,
    pub version: String,
    pub relative_location: String,
    /// Whether the payload directory exists under the extensions root.
    pub payload_present: bool,
}

/// Lists the extensions recorded in the index of `root`, in index order.
pub fn list_installed(root: &Path, index_file_name: &str) -> Result<Vec<InstalledExtension>> {
    let entries = read_index_named(root, index_file_name)?;
    Ok(entries
        .into_iter()
        .map(|entry| {
            let payload_present = validate_relative_location(
                &entry.identifier.id,
                &entry.relative_location,
            )
            .is_ok()
                && root.join(&entry.relative_location).is_dir();
            InstalledExtension {
                id: entry.identifier.id,
                version: entry.version,
                relative_location: entry.relative_location,
                payload_present,
            }
        })
        .collect())
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_entry() -> impl Strategy<Value = ExtensionIndexEntry> {
        (
            "[a-z]{1,8}\\.[a-z0-9-]{1,12}",
            "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,3}",
            proptest::option::of("[a-f0-9]{8}"),
        )
            .prop_map(|(id, version, uuid)| ExtensionIndexEntry {
                relative_location: format!("{id}-{version}"),
                identifier: ExtensionIdentifier { id, uuid },
                version,
                location: None,
                metadata: None,
                extra: Map::new(),
            })
    }

    fn dedup(entries: Vec<ExtensionIndexEntry>) -> Vec<ExtensionIndexEntry> {
        let mut seen = HashSet::new();
        entries.into_iter().filter(|e| seen.insert(e.key())).collect()
    }

    proptest! {
        /// Property: write followed by read yields the same entries in the same order.
        #[test]
        fn write_read_round_trip(entries in prop::collection::vec(arb_entry(), 0..12)) {
            let entries = dedup(entries);
            let tmp = tempfile::tempdir().unwrap();
            write_index(tmp.path(), &entries).unwrap();
            let reread = read_index(tmp.path()).unwrap();
            prop_assert_eq!(reread, entries);
        }

        /// Property: merging keeps ids unique and untouched entries in order.
        #[test]
        fn merge_keeps_ids_unique(
            existing in prop::collection::vec(arb_entry(), 0..10),
            added in prop::collection::vec(arb_entry(), 0..6),
        ) {
            let existing = dedup(existing);
            let added = dedup(added);
            let merged = merge_entries(&existing, &added);

            let keys: Vec<String> = merged.iter().map(ExtensionIndexEntry::key).collect();
            let unique: HashSet<&String> = keys.iter().collect();
            prop_assert_eq!(unique.len(), keys.len());

            let added_keys: HashSet<String> = added.iter().map(ExtensionIndexEntry::key).collect();
            let untouched: Vec<&ExtensionIndexEntry> = existing
                .iter()
                .filter(|e| !added_keys.contains(&e.key()))
                .collect();
            prop_assert_eq!(merged.len(), untouched.len() + added.len());
            for (kept, original) in merged.iter().zip(untouched.iter()) {
                prop_assert_eq!(kept, *original);
            }
            prop_assert_eq!(&merged[untouched.len()..], &added[..]);
        }
    }
}
