//! CLI command handlers for the extsync application.

mod editors;
mod sync;

pub(crate) use editors::{
    handle_editors_command, handle_extensions_command, handle_status_command,
};
pub(crate) use sync::{handle_conflicts_command, handle_preview_command, handle_sync_command};

use anyhow::Result;
use serde::Serialize;

/// Prints `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
