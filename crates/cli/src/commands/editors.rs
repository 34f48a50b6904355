use super::print_json;
use crate::app::Outcome;
use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use extsync_sync::{list_installed, EditorProfile, ProfileRegistry, StatusInspector};

/// Handle `extsync editors`.
pub(crate) fn handle_editors_command(
    registry: &ProfileRegistry,
    format: OutputFormat,
) -> Result<Outcome> {
    if format.is_json() {
        print_json(registry.profiles())?;
        return Ok(Outcome::Clean);
    }

    println!("{:<18} {:<18} EXTENSIONS DIR", "ID", "NAME");
    for profile in registry.profiles() {
        let marker = if profile.is_custom { " (custom)" } else { "" };
        println!(
            "{:<18} {:<18} {}{}",
            profile.id,
            profile.display_name,
            profile.extensions_root.display(),
            marker
        );
    }
    Ok(Outcome::Clean)
}

/// Handle `extsync status [EDITOR]`.
pub(crate) fn handle_status_command(
    registry: &ProfileRegistry,
    editor: Option<&str>,
    format: OutputFormat,
) -> Result<Outcome> {
    let profiles: Vec<&EditorProfile> = match editor {
        Some(id) => vec![registry.get(id)?],
        None => registry.profiles().iter().collect(),
    };
    let inspector = StatusInspector::new();
    let statuses: Vec<_> = profiles.into_iter().map(|p| inspector.inspect(p)).collect();

    if format.is_json() {
        print_json(&statuses)?;
        return Ok(Outcome::Clean);
    }

    for status in &statuses {
        let editor = &status.editor;
        println!("{} ({})", editor.display_name, editor.id);
        println!("  Extensions dir: {}", editor.extensions_root.display());
        if let Some(reason) = &status.unavailable_reason {
            println!("  Status: unavailable ({reason})");
            continue;
        }
        println!("  Status: available");
        println!("  Extensions: {}", status.extension_count);
        println!(
            "  Index: {}",
            if status.index_file_exists { "present" } else { "missing" }
        );
        match (&editor.cli_command, &status.cli_path) {
            (Some(_), Some(path)) => println!("  CLI: {}", path.display()),
            (Some(command), None) => println!("  CLI: {command} (not on PATH)"),
            (None, _) => {}
        }
    }
    Ok(Outcome::Clean)
}

/// Handle `extsync extensions EDITOR`.
pub(crate) fn handle_extensions_command(
    registry: &ProfileRegistry,
    editor: &str,
    format: OutputFormat,
) -> Result<Outcome> {
    let profile = registry.get(editor)?;
    let installed = list_installed(&profile.extensions_root, &profile.index_file_name)
        .with_context(|| format!("listing extensions for {}", profile.id))?;

    if format.is_json() {
        print_json(&installed)?;
        return Ok(Outcome::Clean);
    }

    if installed.is_empty() {
        println!("No extensions installed in {}", profile.display_name);
        return Ok(Outcome::Clean);
    }
    println!("{} extensions in {}:", installed.len(), profile.display_name);
    for extension in &installed {
        let dangling = if extension.payload_present {
            ""
        } else {
            " (payload missing)"
        };
        println!("  {} {}{}", extension.id, extension.version, dangling);
    }
    Ok(Outcome::Clean)
}
