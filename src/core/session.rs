use crate::core::presence::PresenceController;
use crate::core::reward::{self, Settlement};
use crate::core::store::{clear_running, load_account, load_running, save_account, save_running};
use crate::db::kv::SqliteStore;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{insert_ledger, insert_session};
use crate::errors::{AppError, AppResult};
use crate::models::account::Account;
use crate::models::ledger::LedgerEntry;
use crate::models::session::{RunningSession, SessionReport, SessionRules, SessionState};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, TransactionBehavior};

/// High-level business logic around one presence session.
pub struct SessionLogic;

impl SessionLogic {
    pub fn load_account(conn: &Connection) -> AppResult<Account> {
        load_account(&SqliteStore::new(conn))
    }

    pub fn save_account(conn: &Connection, account: &Account) -> AppResult<()> {
        save_account(&mut SqliteStore::new(conn), account)
    }

    /// Fail with `InvalidState` while another client holds a live session.
    fn ensure_idle(conn: &Connection, rules: &SessionRules, op: &'static str) -> AppResult<()> {
        match load_running(&SqliteStore::new(conn))? {
            Some(marker) if !marker.is_stale(Utc::now(), rules) => Err(AppError::InvalidState {
                op,
                state: SessionState::Running.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Persist the account together with the ledger entry that changed it.
    pub fn commit(
        pool: &mut DbPool,
        account: &Account,
        entry: Option<&LedgerEntry>,
    ) -> AppResult<()> {
        let tx = pool.conn.transaction()?;
        save_account(&mut SqliteStore::new(&tx), account)?;
        if let Some(e) = entry {
            insert_ledger(&tx, e)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Buy a boost for the next session.
    pub fn activate_boost(
        pool: &mut DbPool,
        rules: SessionRules,
    ) -> AppResult<(Account, LedgerEntry)> {
        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Self::ensure_idle(&tx, &rules, "activate a boost")?;

        let mut account = load_account(&SqliteStore::new(&tx))?;
        let entry = PresenceController::new(rules).activate_boost(&mut account)?;

        save_account(&mut SqliteStore::new(&tx), &account)?;
        insert_ledger(&tx, &entry)?;
        tx.commit()?;

        ttlog(
            &pool.conn,
            "boost",
            "",
            &format!("Boost activated for {} tokens", rules.boost_cost),
        )?;

        Ok((account, entry))
    }

    /// Claim the database for a new session and hand back the account it
    /// starts from. Refused while another session is running.
    pub fn begin(pool: &mut DbPool, rules: &SessionRules) -> AppResult<Account> {
        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Self::ensure_idle(&tx, rules, "start a session")?;

        save_running(&mut SqliteStore::new(&tx), &RunningSession::now())?;
        let account = load_account(&SqliteStore::new(&tx))?;
        tx.commit()?;
        Ok(account)
    }

    /// Release a session that ended without an outcome.
    pub fn abandon(pool: &mut DbPool) -> AppResult<()> {
        clear_running(&mut SqliteStore::new(&pool.conn))
    }

    /// Settle a finished session and write everything it changed.
    ///
    /// Other commands may have moved the balance while the session ran, so
    /// the settlement is applied to the stored account, not to `account`.
    /// On return `account` holds the settled state.
    pub fn record(
        pool: &mut DbPool,
        account: &mut Account,
        report: &SessionReport,
        today: NaiveDate,
        rules: &SessionRules,
    ) -> AppResult<Settlement> {
        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut stored = load_account(&SqliteStore::new(&tx))?;
        // a boost covers exactly the session that just ended
        stored.profile.boost_active = false;
        let settlement = reward::settle(report, &mut stored, today, rules);

        let mut store = SqliteStore::new(&tx);
        save_account(&mut store, &stored)?;
        clear_running(&mut store)?;
        insert_session(&tx, &today, report, settlement.reward, settlement.streak)?;
        if let Some(e) = &settlement.entry {
            insert_ledger(&tx, e)?;
        }
        tx.commit()?;
        *account = stored;

        ttlog(
            &pool.conn,
            "session",
            report.outcome.to_db_str(),
            &format!(
                "Session {} after {}s, {} taps, reward {}, streak {}",
                report.outcome.to_db_str(),
                report.elapsed_secs,
                report.taps,
                settlement.reward,
                settlement.streak
            ),
        )?;

        Ok(settlement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::wallet;
    use crate::db::queries::{load_ledger, load_sessions};
    use crate::models::session::SessionOutcome;
    use crate::utils::amount::Amount;

    fn report(outcome: SessionOutcome) -> SessionReport {
        SessionReport {
            generation: 1,
            outcome,
            elapsed_secs: 600,
            taps: 8,
            missed_count: 0,
            boost_used: false,
        }
    }

    #[test]
    fn boost_is_persisted_with_its_ledger_entry() {
        let mut pool = DbPool::in_memory().unwrap();
        let mut account = Account::default();
        account.balance.value = 10;
        SessionLogic::save_account(&pool.conn, &account).unwrap();

        let (after, entry) =
            SessionLogic::activate_boost(&mut pool, SessionRules::default()).unwrap();
        assert_eq!(after.balance.value, 5);
        assert_eq!(entry.delta, -5);

        let reloaded = SessionLogic::load_account(&pool.conn).unwrap();
        assert!(reloaded.boost_active());
        assert_eq!(load_ledger(&pool.conn, 10).unwrap().len(), 1);
    }

    #[test]
    fn failed_boost_writes_nothing() {
        let mut pool = DbPool::in_memory().unwrap();
        let mut account = Account::default();
        account.balance.value = 3;
        SessionLogic::save_account(&pool.conn, &account).unwrap();

        let err = SessionLogic::activate_boost(&mut pool, SessionRules::default()).unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds { .. }));
        assert_eq!(SessionLogic::load_account(&pool.conn).unwrap().balance.value, 3);
        assert!(load_ledger(&pool.conn, 10).unwrap().is_empty());
    }

    #[test]
    fn completed_session_is_recorded() {
        let mut pool = DbPool::in_memory().unwrap();
        let mut account = Account::default();
        let today = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();

        let s = SessionLogic::record(
            &mut pool,
            &mut account,
            &report(SessionOutcome::Completed),
            today,
            &SessionRules::default(),
        )
        .unwrap();
        assert_eq!(s.reward, 10);

        let stored = SessionLogic::load_account(&pool.conn).unwrap();
        assert_eq!(stored.balance.value, 10);
        assert_eq!(stored.streak.count, 1);
        assert_eq!(stored.streak.last_session_date, Some(today));

        let sessions = load_sessions(&pool.conn, 5).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].reward, 10);
    }

    #[test]
    fn failed_session_is_recorded_without_reward() {
        let mut pool = DbPool::in_memory().unwrap();
        let mut account = Account::default();
        let today = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();

        SessionLogic::record(
            &mut pool,
            &mut account,
            &report(SessionOutcome::Failed),
            today,
            &SessionRules::default(),
        )
        .unwrap();

        assert_eq!(load_sessions(&pool.conn, 5).unwrap().len(), 1);
        assert!(load_ledger(&pool.conn, 5).unwrap().is_empty());
        assert_eq!(SessionLogic::load_account(&pool.conn).unwrap().streak.count, 0);
    }

    fn temp_db(name: &str) -> String {
        let path = std::env::temp_dir().join(format!("{}_session_logic.sqlite", name));
        let path = path.to_string_lossy().to_string();
        std::fs::remove_file(&path).ok();
        path
    }

    #[test]
    fn settlement_keeps_a_purchase_committed_while_running() {
        let path = temp_db("keeps_purchase");
        let rules = SessionRules::default();
        let today = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();

        let mut session_pool = DbPool::new(&path).unwrap();
        let mut account = SessionLogic::begin(&mut session_pool, &rules).unwrap();

        // another client tops up while the session runs
        let mut other = DbPool::new(&path).unwrap();
        let mut current = SessionLogic::load_account(&other.conn).unwrap();
        let entry = wallet::credit_purchase(&mut current, Amount::parse("1").unwrap(), 10);
        SessionLogic::commit(&mut other, &current, Some(&entry)).unwrap();

        SessionLogic::record(
            &mut session_pool,
            &mut account,
            &report(SessionOutcome::Completed),
            today,
            &rules,
        )
        .unwrap();

        let stored = SessionLogic::load_account(&session_pool.conn).unwrap();
        let ledger_sum: i64 = load_ledger(&session_pool.conn, 10)
            .unwrap()
            .iter()
            .map(|r| r.entry.delta)
            .sum();
        assert_eq!(stored.balance.value, 20);
        assert_eq!(ledger_sum, 20);
        assert_eq!(account, stored);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn second_session_is_refused_until_the_first_is_settled() {
        let mut pool = DbPool::in_memory().unwrap();
        let rules = SessionRules::default();
        let today = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();

        let mut account = SessionLogic::begin(&mut pool, &rules).unwrap();
        let err = SessionLogic::begin(&mut pool, &rules).unwrap_err();
        assert!(matches!(err, AppError::InvalidState { .. }));

        SessionLogic::record(
            &mut pool,
            &mut account,
            &report(SessionOutcome::Quit),
            today,
            &rules,
        )
        .unwrap();
        assert!(SessionLogic::begin(&mut pool, &rules).is_ok());

        SessionLogic::abandon(&mut pool).unwrap();
        assert!(SessionLogic::begin(&mut pool, &rules).is_ok());
    }

    #[test]
    fn boost_is_refused_while_a_session_runs() {
        let mut pool = DbPool::in_memory().unwrap();
        let mut account = Account::default();
        account.balance.value = 10;
        SessionLogic::save_account(&pool.conn, &account).unwrap();

        SessionLogic::begin(&mut pool, &SessionRules::default()).unwrap();
        let err = SessionLogic::activate_boost(&mut pool, SessionRules::default()).unwrap_err();
        assert!(matches!(err, AppError::InvalidState { .. }));
        assert_eq!(SessionLogic::load_account(&pool.conn).unwrap().balance.value, 10);
    }

    #[test]
    fn stale_marker_does_not_block() {
        let mut pool = DbPool::in_memory().unwrap();
        let rules = SessionRules::default();
        let marker = RunningSession {
            started_at: Utc::now() - chrono::Duration::hours(1),
        };
        save_running(&mut SqliteStore::new(&pool.conn), &marker).unwrap();

        assert!(SessionLogic::begin(&mut pool, &rules).is_ok());
    }
}
