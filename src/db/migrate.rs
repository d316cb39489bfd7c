use rusqlite::{Connection, OptionalExtension, Result, params};
use tracing::{debug, info};

/// A schema step, applied once and recorded in `schema_migrations`.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250601_0001_create_entries",
        description: "Create entries table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS entries (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            dt               TEXT    NOT NULL,
            odometer         REAL    NOT NULL CHECK(odometer >= 0),
            predicted_range  REAL    NOT NULL CHECK(predicted_range >= 0),
            soc              REAL,
            charged          INTEGER NOT NULL DEFAULT 0 CHECK(charged IN (0, 1)),
            notes            TEXT    NOT NULL DEFAULT '',
            lat              REAL,
            lng              REAL,
            device_id        TEXT    NOT NULL,
            created_at       INTEGER NOT NULL,
            synced           INTEGER NOT NULL DEFAULT 0 CHECK(synced IN (0, 1)),
            synced_at        INTEGER
        );
        "#,
    },
    Migration {
        version: "20250601_0002_entries_indexes",
        description: "Index entries by insertion time and sync flag",
        sql: r#"
        CREATE INDEX IF NOT EXISTS idx_entries_created_at ON entries(created_at);
        CREATE INDEX IF NOT EXISTS idx_entries_synced ON entries(synced);
        "#,
    },
    Migration {
        version: "20250610_0003_synced_is_terminal",
        description: "Reject updates that would clear the synced flag",
        sql: r#"
        CREATE TRIGGER IF NOT EXISTS trg_entries_synced_terminal
        BEFORE UPDATE OF synced ON entries
        WHEN OLD.synced = 1 AND NEW.synced = 0
        BEGIN
            SELECT RAISE(ABORT, 'synced entries cannot revert to pending');
        END;
        "#,
    },
];

fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version     TEXT PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at  TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let found: Option<i32> = conn
        .query_row(
            "SELECT 1 FROM schema_migrations WHERE version = ?1",
            [version],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Public entry point: run all pending migrations.
///
/// Each migration and its bookkeeping row commit in one transaction.
pub fn run_pending_migrations(conn: &mut Connection) -> Result<usize> {
    ensure_migrations_table(conn)?;

    let mut applied = 0;
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }

        let tx = conn.transaction()?;
        tx.execute_batch(m.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, description, applied_at)
             VALUES (?1, ?2, datetime('now'))",
            params![m.version, m.description],
        )?;
        tx.commit()?;

        info!(version = m.version, "migration applied");
        applied += 1;
    }

    debug!(applied, "schema up to date");
    Ok(applied)
}

/// Versions recorded as applied, oldest first.
pub fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version ASC")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
