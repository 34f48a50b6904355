//! Extension sync between VS Code family editors.
//!
//! Reads the `extensions.json` index of a source editor, copies selected
//! extension payload directories into one or more target editors and merges
//! the relocated index entries into each target index.
//!
//! # Examples
//!
//! ```
//! use extsync_sync::{ExtensionSelection, ProfileRegistry, SyncEngine, SyncRequest};
//! use std::fs;
//!
//! let home = tempfile::tempdir().unwrap();
//! let source = home.path().join(".vscode/extensions");
//! fs::create_dir_all(source.join("a.b-1.0.0")).unwrap();
//! fs::write(source.join("a.b-1.0.0/package.json"), "{}").unwrap();
//! fs::write(
//!     source.join("extensions.json"),
//!     r#"[{"identifier":{"id":"a.b"},"version":"1.0.0","relativeLocation":"a.b-1.0.0"}]"#,
//! )
//! .unwrap();
//!
//! let registry = ProfileRegistry::for_home(home.path());
//! let report = SyncEngine::new(&registry)
//!     .sync(&SyncRequest {
//!         source_editor: "vscode".into(),
//!         target_editors: vec!["cursor".into()],
//!         extensions: ExtensionSelection::All,
//!         overwrite_conflicts: false,
//!     })
//!     .unwrap();
//!
//! assert_eq!(report.total_copied, 1);
//! assert!(home.path().join(".cursor/extensions/a.b-1.0.0/package.json").exists());
//! ```

#![deny(unsafe_code)]

pub mod copy;
pub mod engine;
pub mod error;
pub mod index;
pub mod profiles;
pub mod report;
pub mod status;
pub mod utils;

pub use copy::{copy_tree, remove_tree, CopyStats};
pub use engine::{ExtensionSelection, SyncEngine, SyncRequest};
pub use error::{Result, SyncError};
pub use index::{
    find_entry, list_installed, merge_entries, read_index, read_index_named, read_index_or_empty,
    resolve_index_path, validate_relative_location, write_index, write_index_named,
    ExtensionIdentifier, ExtensionIndexEntry, ExtensionLocation, InstalledExtension,
};
pub use profiles::{EditorProfile, ProfileRegistry, FALLBACK_INDEX_FILE, PRIMARY_INDEX_FILE};
pub use report::{
    PlannedAction, PlannedExtension, PreviewReport, SyncReport, SyncResult, TargetPreview,
};
pub use status::{EditorStatus, ExecutableLocator, PathLocator, StatusInspector};
