use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_kb = (file_size as f64) / 1024.0;

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.1} KB", CYAN, RESET, file_kb);

    //
    // 2) SESSIONS BY OUTCOME
    //
    let mut stmt = pool
        .conn
        .prepare("SELECT outcome, COUNT(*) FROM sessions GROUP BY outcome ORDER BY outcome")?;
    let counts = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    let total: i64 = counts.iter().map(|(_, n)| n).sum();

    println!("{}• Sessions:{} {}{}{}", CYAN, RESET, GREEN, total, RESET);
    for (outcome, n) in &counts {
        println!("    {:<10} {}", outcome, n);
    }

    //
    // 3) DATE RANGE
    //
    let first_date: Option<String> = pool
        .conn
        .query_row("SELECT MIN(date) FROM sessions", [], |row| row.get(0))
        .optional()?
        .flatten();
    let last_date: Option<String> = pool
        .conn
        .query_row("SELECT MAX(date) FROM sessions", [], |row| row.get(0))
        .optional()?
        .flatten();

    let fmt_first = first_date.unwrap_or_else(|| format!("{GREY}--{RESET}"));
    let fmt_last = last_date.unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Date range:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    //
    // 4) LEDGER
    //
    let (entries, earned): (i64, i64) = pool.conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(CASE WHEN reason = 'reward' THEN delta ELSE 0 END), 0)
         FROM ledger",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    println!(
        "{}• Ledger entries:{} {} ({} earned from sessions)",
        CYAN, RESET, entries, earned
    );

    println!();
    Ok(())
}
