use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::Connection;
use std::time::Duration;

/// Prepare a freshly opened connection: connection settings first, then
/// every pending schema migration. Returns how many migrations ran.
pub fn init_db(conn: &Connection) -> AppResult<usize> {
    // an interactive session may hold the file while `status` reads it
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    run_pending_migrations(conn)
}
