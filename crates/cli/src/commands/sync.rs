use super::print_json;
use crate::app::Outcome;
use crate::cli::{ConflictArgs, OutputFormat, SyncArgs};
use anyhow::Result;
use extsync_sync::{
    read_index_named, ExtensionSelection, ProfileRegistry, SyncEngine, SyncRequest,
};
use serde::Serialize;

fn request_from(args: &SyncArgs) -> SyncRequest {
    SyncRequest {
        source_editor: args.from.clone(),
        target_editors: args.to.clone(),
        extensions: args.selection.selection(),
        overwrite_conflicts: args.overwrite,
    }
}

/// Handle `extsync sync run`.
pub(crate) fn handle_sync_command(
    registry: &ProfileRegistry,
    args: &SyncArgs,
    format: OutputFormat,
) -> Result<Outcome> {
    let report = SyncEngine::new(registry).sync(&request_from(args))?;

    if format.is_json() {
        print_json(&report)?;
    } else {
        print!("{}", report.format_summary());
        if report.has_unresolved_conflicts() {
            println!("\nRe-run with --overwrite to replace conflicting extensions.");
        }
    }
    Ok(Outcome::from_flags(
        report.has_errors(),
        report.has_unresolved_conflicts(),
    ))
}

/// Handle `extsync sync preview`.
pub(crate) fn handle_preview_command(
    registry: &ProfileRegistry,
    args: &SyncArgs,
    format: OutputFormat,
) -> Result<Outcome> {
    let preview = SyncEngine::new(registry).preview(&request_from(args))?;

    if format.is_json() {
        print_json(&preview)?;
    } else {
        print!("{}", preview.format_summary());
    }
    Ok(Outcome::from_flags(
        preview.has_errors(),
        preview.has_unresolved_conflicts(),
    ))
}

#[derive(Debug, Serialize)]
struct ConflictListing<'a> {
    source_editor: &'a str,
    target_editor: &'a str,
    conflicts: Vec<String>,
}

/// Handle `extsync sync conflicts`.
pub(crate) fn handle_conflicts_command(
    registry: &ProfileRegistry,
    args: &ConflictArgs,
    format: OutputFormat,
) -> Result<Outcome> {
    let selection = args.selection.selection();
    let ids = match &selection {
        ExtensionSelection::All => {
            let source = registry.get(&args.from)?;
            let snapshot = read_index_named(&source.extensions_root, &source.index_file_name)?;
            selection.resolve(&snapshot)
        }
        ExtensionSelection::Ids(_) => selection.resolve(&[]),
    };

    let conflicts = SyncEngine::new(registry).detect_conflicts(&args.from, &args.to, &ids)?;
    let has_conflicts = !conflicts.is_empty();

    if format.is_json() {
        print_json(&ConflictListing {
            source_editor: &args.from,
            target_editor: &args.to,
            conflicts,
        })?;
    } else if has_conflicts {
        println!("{} conflicts in {}:", conflicts.len(), args.to);
        for id in &conflicts {
            println!("  {id}");
        }
    } else {
        println!("No conflicts in {}", args.to);
    }
    Ok(Outcome::from_flags(false, has_conflicts))
}
