//! Colour helpers for entry listings.

use crate::models::SyncState;
use ansi_term::Colour;

/// Label shown next to an entry: `synced` once acknowledged, `local` before.
pub fn sync_label(state: &SyncState) -> &'static str {
    if state.is_synced() { "synced" } else { "local" }
}

pub fn colorize_sync(state: &SyncState) -> String {
    let label = sync_label(state);
    let colour = if state.is_synced() {
        Colour::Green
    } else {
        Colour::Yellow
    };
    colour.paint(label).to_string()
}

/// Optional numeric field with a `--` placeholder.
pub fn optional_value(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{v}{suffix}"),
        None => "--".to_string(),
    }
}
