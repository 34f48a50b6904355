//! Shared test utilities for extsync crates.
//!
//! This crate provides common fixtures used across the extsync workspace:
//! a throwaway home directory with editor extension roots, payload folders
//! and `extensions.json` index files.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = extsync_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value"
/// // When _guard drops, MY_VAR is restored to its original value
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Fake home directory holding editor extension roots.
///
/// Editors are addressed by their home folder (`.vscode`, `.cursor`, ...);
/// the extensions root is `<home>/<folder>/extensions`. The tempdir is removed
/// when the fixture drops.
pub struct EditorFixture {
    pub tempdir: tempfile::TempDir,
}

impl EditorFixture {
    /// Creates an empty fake home. No editor directories exist yet.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            tempdir: tempfile::tempdir()?,
        })
    }

    /// Get the path that should be used as HOME.
    pub fn home_path(&self) -> &Path {
        self.tempdir.path()
    }

    /// Create an RAII guard that sets HOME to this fixture's temp directory.
    pub fn home_guard(&self) -> EnvVarGuard {
        let home = self.home_path().to_string_lossy().into_owned();
        set_env_var("HOME", Some(home.as_str()))
    }

    /// Extensions root for an editor folder (e.g. `.vscode`).
    pub fn extensions_root(&self, folder: &str) -> PathBuf {
        self.home_path().join(folder).join("extensions")
    }

    /// Creates the extensions root for an editor folder.
    pub fn create_root(&self, folder: &str) -> std::io::Result<PathBuf> {
        let root = self.extensions_root(folder);
        fs::create_dir_all(&root)?;
        Ok(root)
    }

    /// Installs a fake extension: writes its payload directory and appends an
    /// entry to `extensions.json`, replacing any entry with the same id.
    ///
    /// Returns the payload directory.
    pub fn install_extension(
        &self,
        folder: &str,
        id: &str,
        version: &str,
    ) -> std::io::Result<PathBuf> {
        let root = self.create_root(folder)?;
        let relative = format!("{}-{}", id.to_lowercase(), version);
        let payload = root.join(&relative);
        fs::create_dir_all(payload.join("lib"))?;
        fs::write(
            payload.join("package.json"),
            json!({ "name": id, "version": version }).to_string(),
        )?;
        fs::write(
            payload.join("lib/index.js"),
            format!("module.exports = {{ id: '{id}', version: '{version}' }};\n"),
        )?;

        let mut entries = self.read_index(folder).unwrap_or_else(|| json!([]));
        let location = payload.to_string_lossy().replace('\\', "/");
        if let Some(list) = entries.as_array_mut() {
            list.retain(|e| {
                e["identifier"]["id"]
                    .as_str()
                    .is_none_or(|existing| !existing.eq_ignore_ascii_case(id))
            });
            list.push(json!({
                "identifier": { "id": id, "uuid": format!("uuid-{}", id.to_lowercase()) },
                "version": version,
                "location": { "$mid": 1, "path": location, "scheme": "file" },
                "relativeLocation": relative,
                "metadata": { "installedTimestamp": 1_700_000_000_000u64, "source": "gallery" }
            }));
        }
        fs::write(root.join("extensions.json"), entries.to_string())?;
        Ok(payload)
    }

    /// Writes raw index contents under the given filename.
    pub fn write_raw_index(
        &self,
        folder: &str,
        file_name: &str,
        contents: &str,
    ) -> std::io::Result<PathBuf> {
        let root = self.create_root(folder)?;
        let path = root.join(file_name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Reads `extensions.json` for an editor folder as raw JSON.
    pub fn read_index(&self, folder: &str) -> Option<Value> {
        let path = self.extensions_root(folder).join("extensions.json");
        let text = fs::read_to_string(path).ok()?;
        serde_json::from_str(&text).ok()
    }

    /// Identifiers listed in `extensions.json`, in file order.
    pub fn index_ids(&self, folder: &str) -> Vec<String> {
        self.read_index(folder)
            .and_then(|v| v.as_array().cloned())
            .unwrap_or_default()
            .iter()
            .filter_map(|e| e["identifier"]["id"].as_str().map(str::to_string))
            .collect()
    }
}
