use crate::errors::{AppError, AppResult};
use crate::models::history::SessionRecord;
use crate::models::ledger::{LedgerEntry, LedgerReason, LedgerRow};
use crate::models::session::{SessionOutcome, SessionReport};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, Result, Row, params};

fn conversion_error(err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

pub fn insert_session(
    conn: &Connection,
    date: &NaiveDate,
    report: &SessionReport,
    reward: i64,
    streak: u32,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO sessions
            (date, outcome, elapsed_secs, taps, missed_count,
             boost_used, reward, streak, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            date.format("%Y-%m-%d").to_string(),
            report.outcome.to_db_str(),
            report.elapsed_secs,
            report.taps,
            report.missed_count,
            report.boost_used as i32,
            reward,
            streak,
            Local::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn map_session(row: &Row) -> Result<SessionRecord> {
    let date_str: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| conversion_error(AppError::InvalidDate(date_str.clone())))?;

    let outcome_str: String = row.get("outcome")?;
    let outcome = SessionOutcome::from_db_str(&outcome_str).ok_or_else(|| {
        conversion_error(AppError::Other(format!("Invalid outcome: {}", outcome_str)))
    })?;

    Ok(SessionRecord {
        id: row.get("id")?,
        date,
        outcome,
        elapsed_secs: row.get("elapsed_secs")?,
        taps: row.get("taps")?,
        missed_count: row.get("missed_count")?,
        boost_used: row.get::<_, i32>("boost_used")? == 1,
        reward: row.get("reward")?,
        streak: row.get("streak")?,
    })
}

/// Most recent sessions first.
pub fn load_sessions(conn: &Connection, limit: usize) -> AppResult<Vec<SessionRecord>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM sessions
         ORDER BY id DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map([limit as i64], map_session)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_ledger(conn: &Connection, entry: &LedgerEntry) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO ledger (created_at, reason, delta, balance_after, reference)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            Local::now().to_rfc3339(),
            entry.reason.to_db_str(),
            entry.delta,
            entry.balance_after,
            entry.reference,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn map_ledger(row: &Row) -> Result<LedgerRow> {
    let reason_str: String = row.get("reason")?;
    let reason = LedgerReason::from_db_str(&reason_str).ok_or_else(|| {
        conversion_error(AppError::Other(format!("Invalid reason: {}", reason_str)))
    })?;

    Ok(LedgerRow {
        id: row.get("id")?,
        created_at: row.get("created_at")?,
        entry: LedgerEntry {
            reason,
            delta: row.get("delta")?,
            balance_after: row.get("balance_after")?,
            reference: row.get("reference")?,
        },
    })
}

pub fn load_ledger(conn: &Connection, limit: usize) -> AppResult<Vec<LedgerRow>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM ledger
         ORDER BY id DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map([limit as i64], map_ledger)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
