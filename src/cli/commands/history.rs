use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::db::queries::{load_ledger, load_sessions};
use crate::errors::AppResult;
use crate::utils::colors::{RESET, color_for_delta, color_for_outcome};
use crate::utils::formatting::{bold, secs2clock, signed};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::History { limit, ledger } = cmd {
        let pool = DbPool::new(&cfg.database)?;

        if *ledger {
            print_ledger(&pool, *limit)?;
        } else {
            print_sessions(&pool, *limit)?;
        }
    }

    Ok(())
}

/// Print a rendered table, colouring each data row with its own colour.
fn print_colored(table: &Table, colors: &[&str]) {
    let rendered = table.render();
    let mut lines = rendered.lines();

    if let Some(head) = lines.next() {
        println!("{}", bold(head.trim_end()));
    }
    for (line, color) in lines.zip(colors) {
        println!("{}{}{}", color, line.trim_end(), RESET);
    }
}

fn print_sessions(pool: &DbPool, limit: usize) -> AppResult<()> {
    let sessions = load_sessions(&pool.conn, limit)?;
    if sessions.is_empty() {
        println!("No sessions recorded yet.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        Column::new("#", 4),
        Column::new("Date", 10),
        Column::new("Outcome", 9),
        Column::new("Time", 5),
        Column::new("Taps", 4),
        Column::new("Missed", 6),
        Column::new("Boost", 5),
        Column::new("Reward", 6),
        Column::new("Streak", 6),
    ]);

    let mut colors = Vec::new();
    for s in &sessions {
        table.add_row(vec![
            s.id.to_string(),
            s.date_str(),
            s.outcome.to_db_str().to_string(),
            secs2clock(s.elapsed_secs),
            s.taps.to_string(),
            s.missed_count.to_string(),
            if s.boost_used { "yes" } else { "-" }.to_string(),
            signed(s.reward),
            s.streak.to_string(),
        ]);
        colors.push(color_for_outcome(s.outcome.to_db_str()));
    }

    println!("📅 Last {} session(s):\n", sessions.len());
    print_colored(&table, &colors);
    Ok(())
}

fn print_ledger(pool: &DbPool, limit: usize) -> AppResult<()> {
    let rows = load_ledger(&pool.conn, limit)?;
    if rows.is_empty() {
        println!("No balance movements yet.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        Column::new("#", 4),
        Column::new("When", 19),
        Column::new("Reason", 8),
        Column::new("Delta", 6),
        Column::new("Balance", 7),
        Column::new("Reference", 20),
    ]);

    let mut colors = Vec::new();
    for r in &rows {
        let when = chrono::DateTime::parse_from_rfc3339(&r.created_at)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|_| r.created_at.clone());
        table.add_row(vec![
            r.id.to_string(),
            when,
            r.entry.reason.to_db_str().to_string(),
            signed(r.entry.delta),
            r.entry.balance_after.to_string(),
            r.entry.reference.clone(),
        ]);
        colors.push(color_for_delta(r.entry.delta));
    }

    println!("💛 Last {} balance movement(s):\n", rows.len());
    print_colored(&table, &colors);
    Ok(())
}
