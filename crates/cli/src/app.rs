//! Wires configuration, the profile registry and command handlers together.

use crate::cli::{Cli, Commands, OutputFormat, SyncAction};
use crate::commands::{
    handle_conflicts_command, handle_editors_command, handle_extensions_command,
    handle_preview_command, handle_status_command, handle_sync_command,
};
use anyhow::{bail, Result};
use clap::Parser;
use extsync_state::{env_format, home_dir, load_config, load_config_from};
use extsync_sync::ProfileRegistry;
use std::path::Path;
use std::process::ExitCode;

/// How a command finished, mapped onto the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Clean,
    Errors,
    UnresolvedConflicts,
}

impl Outcome {
    /// Errors take precedence over conflicts.
    pub(crate) fn from_flags(has_errors: bool, has_unresolved_conflicts: bool) -> Self {
        if has_errors {
            Self::Errors
        } else if has_unresolved_conflicts {
            Self::UnresolvedConflicts
        } else {
            Self::Clean
        }
    }

    pub(crate) fn exit_code(self) -> ExitCode {
        match self {
            Self::Clean => ExitCode::SUCCESS,
            Self::Errors => ExitCode::from(1),
            Self::UnresolvedConflicts => ExitCode::from(3),
        }
    }
}

pub(crate) fn run() -> Result<Outcome> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::resolve(cli.format, env_format());
    let registry = build_registry(cli.config.as_deref())?;

    match cli.command {
        Commands::Editors => handle_editors_command(&registry, format),
        Commands::Status { editor } => handle_status_command(&registry, editor.as_deref(), format),
        Commands::Extensions { editor } => handle_extensions_command(&registry, &editor, format),
        Commands::Sync { action } => match action {
            SyncAction::Run(args) => handle_sync_command(&registry, &args, format),
            SyncAction::Preview(args) => handle_preview_command(&registry, &args, format),
            SyncAction::Conflicts(args) => handle_conflicts_command(&registry, &args, format),
        },
    }
}

/// Builds the registry once: built-in table, then config file, then
/// `EXTSYNC_<ID>_DIR` overrides.
fn build_registry(config_path: Option<&Path>) -> Result<ProfileRegistry> {
    let home = home_dir()?;
    let config = match config_path {
        Some(path) => {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            load_config_from(path)?
        }
        None => load_config()?,
    };

    let mut registry = ProfileRegistry::for_home(&home);
    if let Some(config) = &config {
        registry = registry.with_config(config);
    }
    let registry = registry.with_env_overrides();

    tracing::debug!(
        target: "extsync::cli",
        home = %home.display(),
        editors = registry.profiles().len(),
        "Profile registry ready"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_outrank_conflicts() {
        assert_eq!(Outcome::from_flags(true, true), Outcome::Errors);
        assert_eq!(
            Outcome::from_flags(false, true),
            Outcome::UnresolvedConflicts
        );
        assert_eq!(Outcome::from_flags(false, false), Outcome::Clean);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = build_registry(Some(&tmp.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
