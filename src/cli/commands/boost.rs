use crate::config::Config;
use crate::core::session::SessionLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};

/// Buy a boost for the next session. Running short of tokens is reported,
/// not treated as a failure of the command.
pub fn handle(cfg: &Config) -> AppResult<()> {
    let mut pool = DbPool::new(&cfg.database)?;

    match SessionLogic::activate_boost(&mut pool, cfg.rules()) {
        Ok((account, entry)) => {
            success(format!(
                "Boost active: one missed check will be forgiven ({} tokens)",
                -entry.delta
            ));
            info(format!("💛 Balance: {}", account.balance.value));
            Ok(())
        }
        Err(AppError::InsufficientFunds { needed, available }) => {
            warning(format!(
                "Not enough tokens for a boost: {} needed, {} available",
                needed, available
            ));
            Ok(())
        }
        Err(AppError::InvalidState { .. }) => {
            warning("A session is running. Buy the boost once it has ended.");
            Ok(())
        }
        Err(AppError::BoostAlreadyActive) => {
            info("A boost is already waiting for your next session.");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
