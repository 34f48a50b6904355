//! Profile registry: the table of supported editors and where they keep
//! their extensions.
//!
//! The registry is an immutable value built once and passed by reference to
//! every component that needs it. Tests build it from an injected home
//! directory with [`ProfileRegistry::for_home`].

use crate::error::{Result, SyncError};
use extsync_state::{editor_dir_override, Config};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Index filename written by VS Code family editors.
pub const PRIMARY_INDEX_FILE: &str = "extensions.json";
/// Singular spelling accepted when the primary index is absent.
pub const FALLBACK_INDEX_FILE: &str = "extension.json";

/// One supported editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorProfile {
    /// Stable key, unique across the registry (e.g. `vscode`).
    pub id: String,
    pub display_name: String,
    /// Absolute directory holding the extension payload folders.
    pub extensions_root: PathBuf,
    /// Index filename inside `extensions_root`.
    pub index_file_name: String,
    /// Companion CLI command, if the editor ships one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cli_command: Option<String>,
    /// True for editors whose CLI understands `--install-extension`.
    pub is_known_family: bool,
    /// True for editors declared in the config file rather than built in.
    pub is_custom: bool,
}

impl EditorProfile {
    /// Full path of the primary index file.
    pub fn index_path(&self) -> PathBuf {
        self.extensions_root.join(&self.index_file_name)
    }
}

struct BuiltinEditor {
    id: &'static str,
    name: &'static str,
    folder: &'static str,
    cli: Option<&'static str>,
    known_family: bool,
}

const BUILTIN_EDITORS: &[BuiltinEditor] = &[
    BuiltinEditor {
        id: "vscode",
        name: "VS Code",
        folder: ".vscode",
        cli: Some("code"),
        known_family: true,
    },
    BuiltinEditor {
        id: "vscode-insiders",
        name: "VS Code Insiders",
        folder: ".vscode-insiders",
        cli: Some("code-insiders"),
        known_family: true,
    },
    BuiltinEditor {
        id: "vscodium",
        name: "VSCodium",
        folder: ".vscode-oss",
        cli: Some("codium"),
        known_family: true,
    },
    BuiltinEditor {
        id: "windsurf",
        name: "Windsurf",
        folder: ".windsurf",
        cli: None,
        known_family: false,
    },
    BuiltinEditor {
        id: "cursor",
        name: "Cursor",
        folder: ".cursor",
        cli: None,
        known_family: false,
    },
    BuiltinEditor {
        id: "kiro",
        name: "Kiro",
        folder: ".kiro",
        cli: None,
        known_family: false,
    },
];

/// Ordered, read-only table of editor profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRegistry {
    profiles: Vec<EditorProfile>,
}

impl ProfileRegistry {
    /// Builds the built-in table rooted at `home` (`<home>/<folder>/extensions`).
    pub fn for_home(home: &Path) -> Self {
        let profiles = BUILTIN_EDITORS
            .iter()
            .map(|b| EditorProfile {
                id: b.id.to_string(),
                display_name: b.name.to_string(),
                extensions_root: home.join(b.folder).join("extensions"),
                index_file_name: PRIMARY_INDEX_FILE.to_string(),
                cli_command: b.cli.map(str::to_string),
                is_known_family: b.known_family,
                is_custom: false,
            })
            .collect();
        Self { profiles }
    }

    /// Builds a registry from an explicit list of profiles.
    pub fn from_profiles(profiles: Vec<EditorProfile>) -> Self {
        Self { profiles }
    }

    /// Applies `[editors.<id>]` sections from the config file.
    ///
    /// Known ids get field-level overrides. Unknown ids become custom
    /// profiles appended after the built-in ones; a custom editor without
    /// `extensions_dir` is ignored with a warning.
    pub fn with_config(mut self, config: &Config) -> Self {
        for (id, ov) in &config.editors {
            if let Some(profile) = self.profiles.iter_mut().find(|p| &p.id == id) {
                if let Some(name) = &ov.name {
                    profile.display_name = name.clone();
                }
                if let Some(dir) = &ov.extensions_dir {
                    profile.extensions_root = dir.clone();
                }
                if let Some(index) = &ov.index_file {
                    profile.index_file_name = index.clone();
                }
                if let Some(cli) = &ov.cli_command {
                    profile.cli_command = non_empty(cli);
                }
                continue;
            }

            let Some(dir) = &ov.extensions_dir else {
                tracing::warn!(
                    target: "extsync::profiles",
                    editor = %id,
                    "Custom editor has no extensions_dir; ignoring"
                );
                continue;
            };
            self.profiles.push(EditorProfile {
                id: id.clone(),
                display_name: ov.name.clone().unwrap_or_else(|| id.clone()),
                extensions_root: dir.clone(),
                index_file_name: ov
                    .index_file
                    .clone()
                    .unwrap_or_else(|| PRIMARY_INDEX_FILE.to_string()),
                cli_command: ov.cli_command.as_deref().and_then(non_empty),
                is_known_family: false,
                is_custom: true,
            });
        }
        self
    }

    /// Applies `EXTSYNC_<ID>_DIR` environment overrides to every profile.
    pub fn with_env_overrides(mut self) -> Self {
        for profile in &mut self.profiles {
            if let Some(dir) = editor_dir_override(&profile.id) {
                tracing::debug!(
                    target: "extsync::profiles",
                    editor = %profile.id,
                    dir = %dir.display(),
                    "Extensions root overridden from environment"
                );
                profile.extensions_root = dir;
            }
        }
        self
    }

    /// All profiles in registry order.
    pub fn profiles(&self) -> &[EditorProfile] {
        &self.profiles
    }

    /// Looks up a profile by id.
    pub fn get(&self, id: &str) -> Result<&EditorProfile> {
        self.profiles
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| SyncError::NotFound {
                editor: id.to_string(),
            })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use extsync_state::EditorOverride;
    use extsync_test_utils::{env_guard, set_env_var};

    fn registry() -> ProfileRegistry {
        ProfileRegistry::for_home(Path::new("/home/dev"))
    }

    #[test]
    fn builtin_table_is_ordered_and_complete() {
        let ids: Vec<_> = registry().profiles().iter().map(|p| p.id.clone()).collect();
        assert_eq!(
            ids,
            vec!["vscode", "vscode-insiders", "vscodium", "windsurf", "cursor", "kiro"]
        );
    }

    #[test]
    fn builtin_paths_hang_off_home() {
        let reg = registry();
        let vscodium = reg.get("vscodium").unwrap();
        assert_eq!(
            vscodium.extensions_root,
            PathBuf::from("/home/dev/.vscode-oss/extensions")
        );
        assert_eq!(vscodium.index_file_name, PRIMARY_INDEX_FILE);
        assert_eq!(vscodium.cli_command.as_deref(), Some("codium"));
        assert!(vscodium.is_known_family);

        let cursor = reg.get("cursor").unwrap();
        assert_eq!(cursor.cli_command, None);
        assert!(!cursor.is_known_family);
    }

    #[test]
    fn unknown_editor_is_not_found() {
        let err = registry().get("notepad").unwrap_err();
        assert!(matches!(err, SyncError::NotFound { editor } if editor == "notepad"));
    }

    #[test]
    fn config_overrides_builtin_fields() {
        let mut config = Config::default();
        config.editors.insert(
            "cursor".into(),
            EditorOverride {
                extensions_dir: Some(PathBuf::from("/opt/cursor/ext")),
                cli_command: Some("cursor".into()),
                ..Default::default()
            },
        );
        config.editors.insert(
            "vscode".into(),
            EditorOverride {
                cli_command: Some(String::new()),
                ..Default::default()
            },
        );

        let reg = registry().with_config(&config);
        let cursor = reg.get("cursor").unwrap();
        assert_eq!(cursor.extensions_root, PathBuf::from("/opt/cursor/ext"));
        assert_eq!(cursor.cli_command.as_deref(), Some("cursor"));
        assert!(!cursor.is_custom);
        assert_eq!(reg.get("vscode").unwrap().cli_command, None);
        assert_eq!(reg.profiles().len(), 6);
    }

    #[test]
    fn config_adds_custom_editors_after_builtins() {
        let mut config = Config::default();
        config.editors.insert(
            "my-fork".into(),
            EditorOverride {
                name: Some("My Fork".into()),
                extensions_dir: Some(PathBuf::from("/srv/fork/extensions")),
                ..Default::default()
            },
        );
        config
            .editors
            .insert("broken".into(), EditorOverride::default());

        let reg = registry().with_config(&config);
        assert_eq!(reg.profiles().len(), 7);
        let fork = reg.profiles().last().unwrap();
        assert_eq!(fork.id, "my-fork");
        assert_eq!(fork.display_name, "My Fork");
        assert_eq!(fork.index_file_name, PRIMARY_INDEX_FILE);
        assert!(fork.is_custom);
        assert!(reg.get("broken").is_err());
    }

    #[test]
    fn env_override_replaces_root() {
        let _g = env_guard();
        let _v = set_env_var("EXTSYNC_WINDSURF_DIR", Some("/data/windsurf"));
        let reg = registry().with_env_overrides();
        assert_eq!(
            reg.get("windsurf").unwrap().extensions_root,
            PathBuf::from("/data/windsurf")
        );
    }

    #[test]
    fn index_path_joins_root_and_name() {
        let reg = registry();
        assert_eq!(
            reg.get("kiro").unwrap().index_path(),
            PathBuf::from("/home/dev/.kiro/extensions/extensions.json")
        );
    }
}
