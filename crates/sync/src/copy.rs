//! Recursive payload copy.
//!
//! Copies stop at the first failing file operation and nothing is rolled
//! back. Only directories and regular files are supported; symlinks and
//! special files fail the copy with [`SyncError::UnsupportedEntry`].

use crate::error::{Result, SyncError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Counters for one completed tree copy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CopyStats {
    pub directories: usize,
    pub files: usize,
    pub bytes: u64,
}

/// Copies the directory tree at `source` to `dest`, depth-first.
///
/// `dest` and any missing parents are created. Regular files are copied
/// byte-for-byte with their permission bits; directories get their source
/// permission bits once their contents are in place, so read-only source
/// folders still copy.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<CopyStats> {
    match fs::metadata(source) {
        Ok(meta) if meta.is_dir() => {}
        _ => {
            return Err(SyncError::SourceNotFound {
                path: source.to_path_buf(),
            })
        }
    }
    if dest.starts_with(source) {
        return Err(SyncError::io(
            dest,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "destination lies inside the source tree",
            ),
        ));
    }

    let mut stats = CopyStats::default();
    let mut created: Vec<(PathBuf, fs::Permissions)> = Vec::new();

    for entry in WalkDir::new(source).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| source.to_path_buf());
            SyncError::io(path, e.into())
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| SyncError::io(&target, e))?;
            let permissions = entry
                .metadata()
                .map_err(|e| SyncError::io(entry.path(), e.into()))?
                .permissions();
            created.push((target, permissions));
            stats.directories += 1;
        } else if file_type.is_file() {
            let bytes = fs::copy(entry.path(), &target).map_err(|e| SyncError::io(&target, e))?;
            stats.files += 1;
            stats.bytes += bytes;
        } else {
            return Err(SyncError::UnsupportedEntry {
                path: entry.path().to_path_buf(),
            });
        }
    }

    // Deepest first, so a read-only parent never blocks its children.
    for (dir, permissions) in created.into_iter().rev() {
        fs::set_permissions(&dir, permissions).map_err(|e| SyncError::io(&dir, e))?;
    }

    tracing::debug!(
        target: "extsync::copy",
        source = %source.display(),
        dest = %dest.display(),
        files = stats.files,
        bytes = stats.bytes,
        "Copied payload tree"
    );
    Ok(stats)
}

/// Removes a payload directory tree. A tree that is already gone is fine.
pub fn remove_tree(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SyncError::io(path, e)),
    }
}
