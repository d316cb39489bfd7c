//! Deferred sync requests for an out-of-process agent.
//!
//! Registering writes a marker file; a scheduler running
//! `rangelog sync --background` picks it up when connectivity is back.
//! Registration is best-effort: failures are logged and otherwise dropped.

use crate::errors::AppResult;
use crate::utils::time::now_millis;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

fn register(marker: &Path) -> io::Result<()> {
    if let Some(parent) = marker.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(marker, now_millis().to_string())
}

/// Ask for an opportunistic sync later. Never fails.
pub fn try_background_sync(marker: &Path) {
    match register(marker) {
        Ok(()) => debug!(marker = %marker.display(), "background sync requested"),
        Err(e) => debug!(error = %e, "background sync registration failed"),
    }
}

pub fn is_requested(marker: &Path) -> bool {
    marker.is_file()
}

/// Drop a pending request once a sync has gone through.
pub fn clear(marker: &Path) -> AppResult<()> {
    match fs::remove_file(marker) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
