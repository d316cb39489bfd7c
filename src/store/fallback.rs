//! Degraded backend: the whole collection serialized as one JSON blob.
//!
//! Every mutation is a read-modify-write of the full file. The blob is
//! replaced atomically (temp file + rename) so a crash mid-write leaves the
//! previous collection intact.

use crate::errors::{AppError, AppResult};
use crate::models::{Entry, NewEntry, SyncState};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// On-disk shape of one record inside the blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    id: i64,
    dt: String,
    odometer: f64,
    predicted_range: f64,
    soc: Option<f64>,
    charged: bool,
    #[serde(default)]
    notes: String,
    lat: Option<f64>,
    lng: Option<f64>,
    device_id: String,
    created_at: i64,
    #[serde(default)]
    synced: bool,
    #[serde(default)]
    synced_at: Option<i64>,
}

impl From<&Entry> for StoredEntry {
    fn from(e: &Entry) -> Self {
        Self {
            id: e.id,
            dt: e.dt.clone(),
            odometer: e.odometer,
            predicted_range: e.predicted_range,
            soc: e.soc,
            charged: e.charged,
            notes: e.notes.clone(),
            lat: e.lat,
            lng: e.lng,
            device_id: e.device_id.clone(),
            created_at: e.created_at,
            synced: e.sync.is_synced(),
            synced_at: e.sync.synced_at(),
        }
    }
}

impl From<StoredEntry> for Entry {
    fn from(s: StoredEntry) -> Self {
        Self {
            id: s.id,
            dt: s.dt,
            odometer: s.odometer,
            predicted_range: s.predicted_range,
            soc: s.soc,
            charged: s.charged,
            notes: s.notes,
            lat: s.lat,
            lng: s.lng,
            device_id: s.device_id,
            created_at: s.created_at,
            sync: SyncState::from_parts(s.synced, s.synced_at),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FallbackStore {
    path: PathBuf,
}

impl FallbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the whole collection. A missing or empty file is an empty collection.
    pub fn read_all(&self) -> AppResult<Vec<Entry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let stored: Vec<StoredEntry> = serde_json::from_str(&raw).map_err(|e| {
            AppError::Fallback(format!("corrupt blob {}: {}", self.path.display(), e))
        })?;
        Ok(stored.into_iter().map(Entry::from).collect())
    }

    fn write_all(&self, entries: &[Entry]) -> AppResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let stored: Vec<StoredEntry> = entries.iter().map(StoredEntry::from).collect();
        let json = serde_json::to_string(&stored)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn add(&self, entry: NewEntry, created_at: i64) -> AppResult<i64> {
        let mut all = self.read_all()?;
        let id = next_id(&all);
        all.push(Entry::stamp(id, entry, created_at));
        self.write_all(&all)?;
        debug!(id, total = all.len(), "entry written to fallback blob");
        Ok(id)
    }

    pub fn list_entries(&self, limit: usize) -> AppResult<Vec<Entry>> {
        let mut all = self.read_all()?;
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        all.truncate(limit);
        Ok(all)
    }

    pub fn list_pending(&self) -> AppResult<Vec<Entry>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(Entry::is_pending)
            .collect())
    }

    pub fn mark_synced(&self, ids: &[i64], synced_at: i64) -> AppResult<usize> {
        let mut all = self.read_all()?;
        let mut changed = 0;
        for e in all.iter_mut() {
            if ids.contains(&e.id) && e.sync.acknowledge(synced_at) {
                changed += 1;
            }
        }
        if changed > 0 {
            self.write_all(&all)?;
        }
        Ok(changed)
    }
}

/// `max(existing ids) + 1`, or 1 for an empty collection.
fn next_id(all: &[Entry]) -> i64 {
    all.iter().map(|e| e.id).max().unwrap_or(0) + 1
}
