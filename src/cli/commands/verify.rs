use crate::backend::LocalBackend;
use crate::cli::commands::{host_bridge, report_unfinished};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::flows::{self, FlowOutcome};
use crate::core::session::SessionLogic;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Verify {
        action,
        signal,
        level,
    } = cmd
    {
        let pool = DbPool::new(&cfg.database)?;
        let mut account = SessionLogic::load_account(&pool.conn)?;
        let bridge = host_bridge(cfg);

        let signal = signal
            .clone()
            .or_else(|| account.profile.wallet_address.clone())
            .unwrap_or_default();

        let outcome = {
            let backend = LocalBackend::new(&pool.conn);
            flows::verify_human(&bridge, &backend, &mut account, action, &signal, *level).await?
        };

        if !matches!(outcome, FlowOutcome::Done(_)) {
            report_unfinished("Verification", &outcome);
            return Ok(());
        }

        SessionLogic::save_account(&pool.conn, &account)?;
        ttlog(
            &pool.conn,
            "verify",
            action,
            &format!("Personhood verified at {} level", level),
        )?;
        success(format!("Verified ({}) for action '{}'", level, action));
    }

    Ok(())
}
