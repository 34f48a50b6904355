use clap::{Args, Parser, Subcommand, ValueEnum};
use extsync_sync::ExtensionSelection;
use std::path::PathBuf;

/// Output format for command results.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Picks the flag value, then `EXTSYNC_FORMAT`, then text.
    pub fn resolve(flag: Option<Self>, env_value: Option<String>) -> Self {
        if let Some(format) = flag {
            return format;
        }
        match env_value {
            Some(value) => Self::from_str(&value, true).unwrap_or_else(|_| {
                tracing::warn!(
                    target: "extsync::cli",
                    value = %value,
                    "Ignoring unknown EXTSYNC_FORMAT"
                );
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

/// Command-line interface for the `extsync` application.
#[derive(Debug, Parser)]
#[command(
    name = "extsync",
    version,
    about = "Sync extensions between VS Code family editors"
)]
pub struct Cli {
    /// Output format (falls back to `EXTSYNC_FORMAT`, then text).
    #[arg(long, short = 'o', value_enum, global = true)]
    pub format: Option<OutputFormat>,
    /// Config file to read instead of `EXTSYNC_CONFIG` / `~/.extsync/config.toml`.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

/// Available `extsync` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Lists the known editor profiles.
    Editors,
    /// Shows whether editors are present and how many extensions they hold.
    Status {
        /// Editor id; every editor when omitted.
        editor: Option<String>,
    },
    /// Lists the extensions recorded in an editor's index.
    Extensions {
        /// Editor id.
        editor: String,
    },
    /// Copies extensions from one editor into others.
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum SyncAction {
    /// Copies extensions and updates the target indexes.
    Run(SyncArgs),
    /// Shows what `sync run` would do without writing anything.
    Preview(SyncArgs),
    /// Lists requested extensions that already exist in a target.
    Conflicts(ConflictArgs),
}

/// Which extensions to act on.
#[derive(Debug, Args)]
pub struct SelectionArgs {
    /// Extension ids (comma separated or repeated).
    #[arg(
        long = "ext",
        value_name = "ID",
        value_delimiter = ',',
        required_unless_present = "all",
        conflicts_with = "all"
    )]
    pub extensions: Vec<String>,
    /// Every extension in the source index.
    #[arg(long, default_value_t = false)]
    pub all: bool,
}

impl SelectionArgs {
    pub fn selection(&self) -> ExtensionSelection {
        if self.all {
            ExtensionSelection::All
        } else {
            ExtensionSelection::Ids(self.extensions.clone())
        }
    }
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Source editor id.
    #[arg(long, value_name = "EDITOR")]
    pub from: String,
    /// Target editor ids (comma separated or repeated).
    #[arg(long, value_name = "EDITOR", value_delimiter = ',', required = true)]
    pub to: Vec<String>,
    #[command(flatten)]
    pub selection: SelectionArgs,
    /// Replace extensions that already exist in a target.
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

#[derive(Debug, Args)]
pub struct ConflictArgs {
    /// Source editor id.
    #[arg(long, value_name = "EDITOR")]
    pub from: String,
    /// Target editor id.
    #[arg(long, value_name = "EDITOR")]
    pub to: String,
    #[command(flatten)]
    pub selection: SelectionArgs,
}
