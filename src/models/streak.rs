use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Consecutive calendar days with at least one completed session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub count: u32,
    pub last_session_date: Option<NaiveDate>,
}

impl Streak {
    /// Register a successful completion on `today`.
    /// Returns true when the count changed.
    pub fn record_completion(&mut self, today: NaiveDate) -> bool {
        let before = self.count;

        self.count = match self.last_session_date {
            Some(last) if last == today => self.count,
            Some(last) if last.succ_opt() == Some(today) => self.count + 1,
            _ => 1,
        };
        self.last_session_date = Some(today);

        self.count != before
    }

    /// Percentage added on top of the base reward.
    pub fn bonus_percent(&self) -> i64 {
        match self.count {
            c if c >= 7 => 50,
            c if c >= 3 => 20,
            _ => 0,
        }
    }
}
