use crate::db::log::ttlog;
use rusqlite::{Connection, OptionalExtension, Result, params};

/// Schema steps, applied in order and recorded in `schema_migrations`.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_create_kv",
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            key         TEXT PRIMARY KEY,
            value       TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );
        "#,
    ),
    (
        "002_create_sessions",
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            date          TEXT NOT NULL,
            outcome       TEXT NOT NULL CHECK(outcome IN ('completed','failed','quit')),
            elapsed_secs  INTEGER NOT NULL DEFAULT 0,
            taps          INTEGER NOT NULL DEFAULT 0,
            missed_count  INTEGER NOT NULL DEFAULT 0,
            boost_used    INTEGER NOT NULL DEFAULT 0,
            reward        INTEGER NOT NULL DEFAULT 0,
            streak        INTEGER NOT NULL DEFAULT 0,
            created_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date);
        "#,
    ),
    (
        "003_create_ledger",
        r#"
        CREATE TABLE IF NOT EXISTS ledger (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at     TEXT NOT NULL,
            reason         TEXT NOT NULL CHECK(reason IN ('grant','reward','boost','purchase')),
            delta          INTEGER NOT NULL,
            balance_after  INTEGER NOT NULL,
            reference      TEXT NOT NULL DEFAULT ''
        );
        "#,
    ),
    (
        "004_create_nonces",
        r#"
        CREATE TABLE IF NOT EXISTS nonces (
            nonce      TEXT PRIMARY KEY,
            issued_at  INTEGER NOT NULL,
            used       INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "005_create_payments",
        r#"
        CREATE TABLE IF NOT EXISTS payments (
            reference       TEXT PRIMARY KEY,
            created_at      TEXT NOT NULL,
            transaction_id  TEXT,
            confirmed_at    TEXT
        );
        "#,
    ),
];

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            name        TEXT PRIMARY KEY,
            applied_at  TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, name: &str) -> Result<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM schema_migrations WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Apply every migration not yet recorded. Returns how many ran.
pub fn run_pending_migrations(conn: &Connection) -> crate::errors::AppResult<usize> {
    ensure_log_table(conn)?;
    ensure_migrations_table(conn)?;

    let mut applied = 0;
    for (name, sql) in MIGRATIONS {
        if is_applied(conn, name)? {
            continue;
        }

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)
            .map_err(|e| crate::errors::AppError::Migration(format!("{name}: {e}")))?;
        tx.execute(
            "INSERT INTO schema_migrations (name, applied_at) VALUES (?1, ?2)",
            params![name, chrono::Local::now().to_rfc3339()],
        )?;
        tx.commit()?;

        ttlog(conn, "migration_applied", name, "Schema migration applied")?;
        applied += 1;
    }

    Ok(applied)
}

/// Names of the migrations already applied, in order.
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM schema_migrations ORDER BY name ASC")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_run_once() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(run_pending_migrations(&conn).unwrap(), MIGRATIONS.len());
        assert_eq!(run_pending_migrations(&conn).unwrap(), 0);
        assert_eq!(applied_migrations(&conn).unwrap().len(), MIGRATIONS.len());

        let logged: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(logged, MIGRATIONS.len() as i64);
    }
}
