use anyhow::Result;
use std::path::PathBuf;

const CONFIG_DIR: &str = ".extsync";
const CONFIG_FILE: &str = "config.toml";

/// Returns the user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    #[cfg(unix)]
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("home directory not found"))
}

/// Returns the path to the config file, honoring `EXTSYNC_CONFIG`.
pub fn config_file() -> Option<PathBuf> {
    if let Ok(custom) = std::env::var("EXTSYNC_CONFIG") {
        return Some(PathBuf::from(custom));
    }
    home_dir().ok().map(|h| h.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Returns the default output format from `EXTSYNC_FORMAT`, if set and non-empty.
pub fn env_format() -> Option<String> {
    std::env::var("EXTSYNC_FORMAT")
        .ok()
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
}

/// Builds the environment key that overrides an editor's extensions root.
///
/// ```
/// use extsync_state::editor_dir_env_key;
///
/// assert_eq!(editor_dir_env_key("vscode-insiders"), "EXTSYNC_VSCODE_INSIDERS_DIR");
/// ```
pub fn editor_dir_env_key(editor_id: &str) -> String {
    let normalized: String = editor_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("EXTSYNC_{normalized}_DIR")
}

/// Returns the extensions root override for an editor (`EXTSYNC_<ID>_DIR`).
pub fn editor_dir_override(editor_id: &str) -> Option<PathBuf> {
    std::env::var(editor_dir_env_key(editor_id))
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use extsync_test_utils::{env_guard, set_env_var};

    #[test]
    fn env_key_replaces_separators() {
        assert_eq!(editor_dir_env_key("cursor"), "EXTSYNC_CURSOR_DIR");
        assert_eq!(editor_dir_env_key("my.fork"), "EXTSYNC_MY_FORK_DIR");
    }

    #[test]
    fn editor_dir_override_reads_env() {
        let _g = env_guard();
        let _v = set_env_var("EXTSYNC_KIRO_DIR", Some("/tmp/kiro-ext"));
        assert_eq!(
            editor_dir_override("kiro"),
            Some(PathBuf::from("/tmp/kiro-ext"))
        );
    }

    #[test]
    fn empty_override_is_ignored() {
        let _g = env_guard();
        let _v = set_env_var("EXTSYNC_CURSOR_DIR", Some(""));
        assert_eq!(editor_dir_override("cursor"), None);
    }

    #[test]
    fn config_file_honors_env() {
        let _g = env_guard();
        let _v = set_env_var("EXTSYNC_CONFIG", Some("/etc/extsync.toml"));
        assert_eq!(config_file(), Some(PathBuf::from("/etc/extsync.toml")));
    }

    #[test]
    fn config_file_defaults_under_home() {
        let _g = env_guard();
        let _c = set_env_var("EXTSYNC_CONFIG", None);
        let _h = set_env_var("HOME", Some("/home/tester"));
        if cfg!(unix) {
            assert_eq!(
                config_file(),
                Some(PathBuf::from("/home/tester/.extsync/config.toml"))
            );
        }
    }

    #[test]
    fn env_format_normalizes() {
        let _g = env_guard();
        let _v = set_env_var("EXTSYNC_FORMAT", Some(" JSON "));
        assert_eq!(env_format().as_deref(), Some("json"));
    }
}
