use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::interactive::run_interactive;
use crate::core::presence::PresenceController;
use crate::core::session::SessionLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{header, info};
use crate::ui::presence::{describe_event, print_settlement};
use crate::utils::{date, formatting::secs2clock};
use tokio::io::BufReader;

/// Run a session against the wall clock, reading taps from stdin.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Session { tick_every } = cmd {
        let rules = cfg.rules();
        let mut pool = DbPool::new(&cfg.database)?;
        let mut account = SessionLogic::begin(&mut pool, &rules)?;
        let mut ctrl = PresenceController::new(rules);

        header("Presence session");
        info(format!(
            "Stay for {}. Press Enter at least every {} to confirm presence, q + Enter to quit.",
            secs2clock(rules.duration_secs),
            secs2clock(rules.presence_interval_secs)
        ));

        let input = BufReader::new(tokio::io::stdin());
        let run = run_interactive(&mut ctrl, &mut account, input, |ev| {
            if let Some(line) = describe_event(ev, *tick_every) {
                println!("{}", line);
            }
        })
        .await;
        let report = match run {
            Ok(report) => report,
            Err(e) => {
                SessionLogic::abandon(&mut pool)?;
                return Err(e);
            }
        };

        let settlement =
            SessionLogic::record(&mut pool, &mut account, &report, date::today(), &rules)?;
        println!();
        print_settlement(&settlement, &account);
    }

    Ok(())
}
