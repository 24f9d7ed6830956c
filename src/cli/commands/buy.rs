use crate::backend::LocalBackend;
use crate::cli::commands::{host_bridge, report_unfinished};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::flows::{self, FlowOutcome};
use crate::core::session::SessionLogic;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use crate::utils::amount::Amount;

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Buy { amount } = cmd {
        let paid = Amount::parse(amount)?;

        let mut pool = DbPool::new(&cfg.database)?;
        let mut account = SessionLogic::load_account(&pool.conn)?;

        if !account.is_signed_in() {
            warning("Sign in first with `rpresence login`.");
            return Ok(());
        }

        let bridge = host_bridge(cfg);
        let outcome = {
            let backend = LocalBackend::new(&pool.conn);
            flows::purchase(
                &bridge,
                &backend,
                &mut account,
                paid,
                &cfg.payment_recipient,
                cfg.conversion_rate,
            )
            .await?
        };

        let purchase = match outcome {
            FlowOutcome::Done(p) => p,
            other => {
                report_unfinished("Payment", &other);
                return Ok(());
            }
        };

        SessionLogic::commit(&mut pool, &account, Some(&purchase.entry))?;
        ttlog(
            &pool.conn,
            "buy",
            &purchase.receipt.transaction_id,
            &format!("Paid {} for {} tokens", purchase.paid, purchase.entry.delta),
        )?;

        success(format!(
            "Payment confirmed: {} tokens credited",
            purchase.entry.delta
        ));
        info(format!("🧾 Transaction: {}", purchase.receipt.transaction_id));
        info(format!("💛 Balance: {}", account.balance.value));
    }

    Ok(())
}
