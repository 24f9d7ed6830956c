use super::session::SessionOutcome;
use chrono::NaiveDate;
use serde::Serialize;

/// A finished session as stored in the `sessions` table.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub outcome: SessionOutcome,
    pub elapsed_secs: u32,
    pub taps: u32,
    pub missed_count: u32,
    pub boost_used: bool,
    pub reward: i64,
    pub streak: u32,
}

impl SessionRecord {
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
