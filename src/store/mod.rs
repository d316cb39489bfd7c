//! Durable entry store with a sticky primary → fallback downgrade.
//!
//! The store prefers the SQLite backend. The first time the primary cannot
//! be opened, or any primary operation fails, the store latches onto the
//! JSON fallback for the rest of its lifetime and retries the failed
//! operation there once. There is no transition back to the primary.

pub mod fallback;

use crate::db::{DbPool, queries};
use crate::errors::AppResult;
use crate::models::{Entry, NewEntry};
use crate::utils::time::now_millis;
use fallback::FallbackStore;
use rusqlite::Connection;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Which backend is currently serving operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Primary,
    Fallback,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Primary => write!(f, "sqlite"),
            BackendKind::Fallback => write!(f, "fallback (json)"),
        }
    }
}

enum Backend {
    /// Not opened yet; resolved on first use.
    Closed,
    Primary(DbPool),
    Fallback,
}

pub struct EntryStore {
    primary_path: Option<PathBuf>,
    fallback: FallbackStore,
    backend: Backend,
}

impl EntryStore {
    /// Store preferring the SQLite file at `primary`, degrading to the blob at `fallback`.
    pub fn new(primary: impl Into<PathBuf>, fallback: impl Into<PathBuf>) -> Self {
        Self {
            primary_path: Some(primary.into()),
            fallback: FallbackStore::new(fallback),
            backend: Backend::Closed,
        }
    }

    /// Store with no primary backend available at all.
    #[cfg(test)]
    pub fn fallback_only(fallback: impl Into<PathBuf>) -> Self {
        Self {
            primary_path: None,
            fallback: FallbackStore::new(fallback),
            backend: Backend::Closed,
        }
    }

    /// Store over an already-open primary.
    #[cfg(test)]
    pub fn with_primary(pool: DbPool, fallback: impl Into<PathBuf>) -> Self {
        Self {
            primary_path: None,
            fallback: FallbackStore::new(fallback),
            backend: Backend::Primary(pool),
        }
    }

    fn ensure_open(&mut self) {
        if !matches!(self.backend, Backend::Closed) {
            return;
        }

        self.backend = match &self.primary_path {
            Some(path) => match DbPool::open(path) {
                Ok(pool) => {
                    debug!(path = %path.display(), "primary backend opened");
                    Backend::Primary(pool)
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "primary backend unavailable, using fallback"
                    );
                    Backend::Fallback
                }
            },
            None => {
                debug!("no primary backend configured, using fallback");
                Backend::Fallback
            }
        };
    }

    /// Run `primary` against SQLite if it is the active backend; on failure
    /// latch onto the fallback and run `fallback` instead.
    fn run<T>(
        &mut self,
        op: &'static str,
        primary: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
        fallback: impl FnOnce(&FallbackStore) -> AppResult<T>,
    ) -> AppResult<T> {
        self.ensure_open();

        if let Backend::Primary(pool) = &mut self.backend {
            match pool.with_conn(primary) {
                Ok(v) => return Ok(v),
                Err(e) => {
                    warn!(op, error = %e, "primary backend failed, switching to fallback for good");
                }
            }
            self.backend = Backend::Fallback;
        }

        fallback(&self.fallback)
    }

    pub fn backend_kind(&mut self) -> BackendKind {
        self.ensure_open();
        match self.backend {
            Backend::Primary(_) => BackendKind::Primary,
            _ => BackendKind::Fallback,
        }
    }

    pub fn is_degraded(&mut self) -> bool {
        self.backend_kind() == BackendKind::Fallback
    }

    /// Validate and persist a new pending entry, returning its id.
    ///
    /// An invalid entry is rejected before any backend is touched, so it
    /// never counts as a primary failure.
    pub fn add(&mut self, entry: NewEntry) -> AppResult<i64> {
        let entry = entry.validate()?;
        let created_at = now_millis();
        let id = self.run(
            "add",
            |conn| queries::insert_entry(conn, &entry, created_at),
            |fb| fb.add(entry.clone(), created_at),
        )?;
        debug!(id, created_at, "entry added");
        Ok(id)
    }

    /// Up to `limit` entries, newest first.
    pub fn list_entries(&mut self, limit: usize) -> AppResult<Vec<Entry>> {
        self.run(
            "list_entries",
            |conn| queries::load_entries(conn, limit),
            |fb| fb.list_entries(limit),
        )
    }

    /// Every entry not yet acknowledged by the collector.
    pub fn list_pending(&mut self) -> AppResult<Vec<Entry>> {
        self.run(
            "list_pending",
            |conn| queries::load_pending(conn),
            |fb| fb.list_pending(),
        )
    }

    pub fn pending_count(&mut self) -> AppResult<usize> {
        self.run(
            "pending_count",
            |conn| queries::count_pending(conn),
            |fb| fb.list_pending().map(|p| p.len()),
        )
    }

    /// Pending entries left behind in the fallback blob while SQLite is
    /// serving. They are not uploaded until the store degrades again.
    pub fn stranded_in_fallback(&mut self) -> AppResult<usize> {
        self.ensure_open();
        if matches!(self.backend, Backend::Primary(_)) {
            Ok(self.fallback.list_pending()?.len())
        } else {
            Ok(0)
        }
    }

    /// Acknowledge `ids`. Unknown ids are ignored; an empty slice touches nothing.
    pub fn mark_synced(&mut self, ids: &[i64]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let at = now_millis();
        let changed = self.run(
            "mark_synced",
            |conn| queries::mark_synced(conn, ids, at),
            |fb| fb.mark_synced(ids, at),
        )?;
        debug!(requested = ids.len(), changed, "entries marked synced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::models::SyncState;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn new_entry(odo: f64) -> NewEntry {
        NewEntry {
            dt: "2025-06-01T08:00:00.000Z".into(),
            odometer: odo,
            predicted_range: 320.0,
            soc: Some(90.0),
            charged: true,
            notes: "after charge".into(),
            lat: Some(45.464211),
            lng: Some(9.191383),
            device_id: "dev-test".into(),
        }
    }

    fn sqlite_store() -> (TempDir, EntryStore) {
        let dir = tempdir().unwrap();
        let store = EntryStore::new(dir.path().join("p.sqlite"), dir.path().join("fb.json"));
        (dir, store)
    }

    #[test]
    fn add_then_pending_contains_entry() {
        let (_dir, mut store) = sqlite_store();
        let id = store.add(new_entry(1000.0)).unwrap();

        let pending = store.list_pending().unwrap();
        assert_eq!(pending.len(), 1);
        let e = &pending[0];
        assert_eq!(e.id, id);
        assert_eq!(e.odometer, 1000.0);
        assert_eq!(e.notes, "after charge");
        assert_eq!(e.sync, SyncState::Pending);

        let recent = store.list_entries(1).unwrap();
        assert_eq!(recent[0].id, id);
        assert_eq!(store.backend_kind(), BackendKind::Primary);
    }

    #[test]
    fn mark_synced_empty_is_noop() {
        let (_dir, mut store) = sqlite_store();
        store.add(new_entry(1.0)).unwrap();
        store.mark_synced(&[]).unwrap();
        assert_eq!(store.pending_count().unwrap(), 1);
    }

    #[test]
    fn mark_synced_removes_from_pending_for_good() {
        let (_dir, mut store) = sqlite_store();
        let a = store.add(new_entry(1.0)).unwrap();
        let b = store.add(new_entry(2.0)).unwrap();

        store.mark_synced(&[a]).unwrap();
        store.mark_synced(&[a]).unwrap();

        let pending: Vec<i64> = store.list_pending().unwrap().iter().map(|e| e.id).collect();
        assert_eq!(pending, vec![b]);
    }

    #[test]
    fn mark_synced_unknown_id_changes_nothing() {
        let (_dir, mut store) = sqlite_store();
        store.add(new_entry(1.0)).unwrap();
        store.mark_synced(&[12345]).unwrap();
        assert_eq!(store.pending_count().unwrap(), 1);
    }

    #[test]
    fn entries_persist_across_reopen() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("p.sqlite");
        let fb = dir.path().join("fb.json");

        let id = EntryStore::new(&p, &fb).add(new_entry(7.0)).unwrap();
        let mut reopened = EntryStore::new(&p, &fb);
        assert_eq!(reopened.list_entries(10).unwrap()[0].id, id);
    }

    #[test]
    fn open_failure_falls_back() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened as a SQLite database.
        let mut store = EntryStore::new(dir.path(), dir.path().join("fb.json"));

        let id = store.add(new_entry(5.0)).unwrap();
        assert_eq!(id, 1);
        assert!(store.is_degraded());

        let listed = store.list_entries(10).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].odometer, 5.0);
        assert!(dir.path().join("fb.json").exists());
    }

    #[test]
    fn failing_primary_latches_fallback() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("p.sqlite");
        let mut store = EntryStore::new(&p, dir.path().join("fb.json"));
        store.add(new_entry(1.0)).unwrap();
        assert_eq!(store.backend_kind(), BackendKind::Primary);

        // Break the primary behind the store's back.
        let other = Connection::open(&p).unwrap();
        other.execute_batch("DROP TABLE entries;").unwrap();

        let id = store.add(new_entry(2.0)).unwrap();
        assert_eq!(id, 1, "fallback ids start fresh");
        assert!(store.is_degraded());

        // Repair the primary: the store must not switch back.
        other
            .execute_batch("CREATE TABLE entries (id INTEGER PRIMARY KEY);")
            .unwrap();
        let listed = store.list_entries(10).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].odometer, 2.0);
    }

    #[test]
    fn invalid_entry_is_rejected_without_downgrade() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("p.sqlite");
        let fb = dir.path().join("fb.json");
        let mut store = EntryStore::new(&p, &fb);
        store.add(new_entry(1.0)).unwrap();

        for bad in [-5.0, f64::NAN] {
            let err = store.add(new_entry(bad)).unwrap_err();
            assert!(matches!(err, AppError::InvalidEntry(_)));
            assert!(!store.is_degraded());
        }

        let id = store.add(new_entry(2.0)).unwrap();
        assert_eq!(id, 2);
        assert!(!fb.exists());
        assert_eq!(EntryStore::new(&p, &fb).list_entries(10).unwrap().len(), 2);
    }

    #[test]
    fn invalid_entry_never_reaches_fallback_blob() {
        let dir = tempdir().unwrap();
        let fb = dir.path().join("fb.json");
        let mut store = EntryStore::fallback_only(&fb);

        assert!(store.add(new_entry(f64::NAN)).is_err());
        assert_eq!(store.add(new_entry(3.0)).unwrap(), 1);
        assert_eq!(store.list_entries(10).unwrap()[0].odometer, 3.0);
    }

    #[test]
    fn add_fails_when_both_backends_fail() {
        let dir = tempdir().unwrap();
        let fb = dir.path().join("fb.json");
        fs::write(&fb, "not json").unwrap();
        // Directory as database: primary unusable, fallback corrupt.
        let mut store = EntryStore::new(dir.path(), &fb);

        let err = store.add(new_entry(1.0)).unwrap_err();
        assert!(matches!(err, AppError::Fallback(_)));
        assert!(store.is_degraded());
        assert_eq!(fs::read_to_string(&fb).unwrap(), "not json");
    }

    #[test]
    fn add_fails_when_fallback_is_unwritable() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let mut store = EntryStore::new(dir.path(), blocker.join("fb.json"));

        let err = store.add(new_entry(1.0)).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
        assert!(store.is_degraded());
    }

    #[test]
    fn stranded_fallback_entries_are_counted_while_primary_serves() {
        let dir = tempdir().unwrap();
        let fb = dir.path().join("fb.json");
        EntryStore::fallback_only(&fb).add(new_entry(1.0)).unwrap();

        let mut store = EntryStore::new(dir.path().join("p.sqlite"), &fb);
        store.add(new_entry(2.0)).unwrap();
        assert_eq!(store.stranded_in_fallback().unwrap(), 1);
        assert_eq!(store.pending_count().unwrap(), 1);

        let mut degraded = EntryStore::fallback_only(&fb);
        assert_eq!(degraded.stranded_in_fallback().unwrap(), 0);
    }

    #[test]
    fn fallback_only_store_never_touches_sqlite() {
        let dir = tempdir().unwrap();
        let mut store = EntryStore::fallback_only(dir.path().join("fb.json"));
        store.add(new_entry(1.0)).unwrap();
        assert_eq!(store.backend_kind(), BackendKind::Fallback);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn in_memory_primary_works() {
        let dir = tempdir().unwrap();
        let pool = DbPool::open_in_memory().unwrap();
        let mut store = EntryStore::with_primary(pool, dir.path().join("fb.json"));
        store.add(new_entry(1.0)).unwrap();
        assert_eq!(store.pending_count().unwrap(), 1);
        assert!(!store.is_degraded());
    }
}
