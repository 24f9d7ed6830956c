use crate::backend::LocalBackend;
use crate::cli::commands::{host_bridge, report_unfinished};
use crate::config::Config;
use crate::core::flows::{self, FlowOutcome};
use crate::core::session::SessionLogic;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::formatting::short_address;

/// Sign in through the host wallet; the first success grants starter tokens.
pub async fn handle(cfg: &Config) -> AppResult<()> {
    let mut pool = DbPool::new(&cfg.database)?;
    let mut account = SessionLogic::load_account(&pool.conn)?;
    let bridge = host_bridge(cfg);

    let outcome = {
        let backend = LocalBackend::new(&pool.conn);
        flows::sign_in(&bridge, &backend, &mut account, cfg.initial_grant).await?
    };

    let signed = match outcome {
        FlowOutcome::Done(s) => s,
        other => {
            report_unfinished("Sign-in", &other);
            return Ok(());
        }
    };

    SessionLogic::commit(&mut pool, &account, signed.grant.as_ref())?;
    ttlog(&pool.conn, "login", &signed.address, "Signed in through host wallet")?;

    success(format!("Signed in as {}", short_address(&signed.address)));
    if let Some(grant) = &signed.grant {
        info(format!("🎁 Welcome grant: {} tokens", grant.delta));
    }
    info(format!("💛 Balance: {}", account.balance.value));

    Ok(())
}
