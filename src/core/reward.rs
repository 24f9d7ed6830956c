//! Reward computation for finished sessions.

use crate::core::wallet;
use crate::models::account::Account;
use crate::models::ledger::LedgerEntry;
use crate::models::session::{SessionOutcome, SessionReport, SessionRules};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub outcome: SessionOutcome,
    pub reward: i64,
    pub bonus_percent: i64,
    pub streak: u32,
    pub streak_changed: bool,
    pub entry: Option<LedgerEntry>,
}

/// `floor(base × (1 + bonus))`, in integer arithmetic.
pub fn reward_for(base: i64, bonus_percent: i64) -> i64 {
    base * (100 + bonus_percent) / 100
}

/// Apply a finished session to the account. Only `Completed` pays and
/// touches the streak.
pub fn settle(
    report: &SessionReport,
    account: &mut Account,
    today: NaiveDate,
    rules: &SessionRules,
) -> Settlement {
    if !report.outcome.is_success() {
        return Settlement {
            outcome: report.outcome,
            reward: 0,
            bonus_percent: 0,
            streak: account.streak.count,
            streak_changed: false,
            entry: None,
        };
    }

    let streak_changed = account.streak.record_completion(today);
    let bonus_percent = account.streak.bonus_percent();
    let reward = reward_for(rules.base_reward, bonus_percent);
    let entry = wallet::credit_reward(account, reward);

    Settlement {
        outcome: report.outcome,
        reward,
        bonus_percent,
        streak: account.streak.count,
        streak_changed,
        entry,
    }
}
