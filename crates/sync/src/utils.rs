//! Shared helpers for identifiers and paths.

use std::path::Path;

/// Returns true if the name starts with a dot (hidden file/directory).
pub fn is_hidden_component(name: &str) -> bool {
    name.starts_with('.')
}

/// Case-folds an extension identifier for comparison.
pub fn fold_id(id: &str) -> String {
    id.to_lowercase()
}

/// Renders an absolute path the way the editors store `location.path`:
/// forward slashes, always rooted with `/` (`C:\x` becomes `/C:/x`).
pub fn location_path(path: &Path) -> String {
    let forward = path.to_string_lossy().replace('\\', "/");
    if forward.starts_with('/') {
        forward
    } else {
        format!("/{forward}")
    }
}
