use crate::bridge::ContractCall;
use crate::cli::commands::{host_bridge, report_unfinished};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::flows::{self, FlowOutcome};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Tx {
        contract,
        function,
        args,
    } = cmd
    {
        let call = ContractCall {
            address: contract.clone(),
            function_name: function.clone(),
            args: args.clone(),
        };

        match flows::submit_transaction(&host_bridge(cfg), &call).await {
            FlowOutcome::Done(tx_id) => {
                let pool = DbPool::new(&cfg.database)?;
                ttlog(
                    &pool.conn,
                    "tx",
                    &tx_id,
                    &format!("{}.{} submitted", contract, function),
                )?;
                success(format!("Transaction submitted: {}", tx_id));
            }
            other => report_unfinished("Transaction", &other),
        }
    }

    Ok(())
}
