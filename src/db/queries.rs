use crate::models::{Entry, NewEntry, SyncState};
use rusqlite::{Connection, Result, Row, params};

const ENTRY_COLUMNS: &str = "id, dt, odometer, predicted_range, soc, charged, notes, lat, lng, \
                             device_id, created_at, synced, synced_at";

pub fn map_row(row: &Row) -> Result<Entry> {
    let synced: bool = row.get("synced")?;
    let synced_at: Option<i64> = row.get("synced_at")?;

    Ok(Entry {
        id: row.get("id")?,
        dt: row.get("dt")?,
        odometer: row.get("odometer")?,
        predicted_range: row.get("predicted_range")?,
        soc: row.get("soc")?,
        charged: row.get("charged")?,
        notes: row.get("notes")?,
        lat: row.get("lat")?,
        lng: row.get("lng")?,
        device_id: row.get("device_id")?,
        created_at: row.get("created_at")?,
        sync: SyncState::from_parts(synced, synced_at),
    })
}

/// Insert a new pending entry and return the id SQLite assigned.
pub fn insert_entry(conn: &Connection, e: &NewEntry, created_at: i64) -> Result<i64> {
    conn.execute(
        "INSERT INTO entries (dt, odometer, predicted_range, soc, charged, notes, lat, lng, device_id, created_at, synced)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0)",
        params![
            e.dt,
            e.odometer,
            e.predicted_range,
            e.soc,
            e.charged,
            e.notes,
            e.lat,
            e.lng,
            e.device_id,
            created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Newest entries first.
pub fn load_entries(conn: &Connection, limit: usize) -> Result<Vec<Entry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM entries
         ORDER BY created_at DESC, id DESC
         LIMIT ?1"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt.query_map([limit], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_pending(conn: &Connection) -> Result<Vec<Entry>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE synced = 0 ORDER BY id ASC");
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_pending(conn: &Connection) -> Result<usize> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM entries WHERE synced = 0", [], |row| {
        row.get(0)
    })?;
    Ok(usize::try_from(n).unwrap_or_default())
}

/// Mark the given ids as synced in a single transaction.
///
/// Unknown ids and already-synced rows are left untouched; returns the
/// number of rows that moved from pending to synced.
pub fn mark_synced(conn: &mut Connection, ids: &[i64], synced_at: i64) -> Result<usize> {
    let tx = conn.transaction()?;
    let mut changed = 0;
    {
        let mut stmt = tx.prepare_cached(
            "UPDATE entries SET synced = 1, synced_at = ?1
             WHERE id = ?2 AND synced = 0",
        )?;
        for id in ids {
            changed += stmt.execute(params![synced_at, id])?;
        }
    }
    tx.commit()?;
    Ok(changed)
}
