pub mod boost;
pub mod buy;
pub mod config;
pub mod db;
pub mod history;
pub mod init;
pub mod log;
pub mod login;
pub mod session;
pub mod simulate;
pub mod status;
pub mod tx;
pub mod verify;

use crate::bridge::SimulatedBridge;
use crate::config::Config;
use crate::core::flows::FlowOutcome;
use crate::ui::messages::{error, warning};

/// The host bridge used by the CLI. Its wallet address is derived from the
/// database path so every database keeps one identity.
pub(crate) fn host_bridge(cfg: &Config) -> SimulatedBridge {
    SimulatedBridge::for_seed(&cfg.database).cancelling(cfg.dev_cancel)
}

/// Tell the user why a flow stopped before changing anything.
pub(crate) fn report_unfinished<T>(what: &str, outcome: &FlowOutcome<T>) {
    match outcome {
        FlowOutcome::Done(_) => {}
        FlowOutcome::Unavailable => {
            warning("The wallet host app is not available. Please install it first.")
        }
        FlowOutcome::Cancelled(code) => warning(format!("{} cancelled or failed ({})", what, code)),
        FlowOutcome::Rejected(why) => error(format!("{} rejected: {}", what, why)),
    }
}
