use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::presence::PresenceController;
use crate::core::session::SessionLogic;
use crate::core::simulate::{TapScript, run_scripted};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ui::presence::{describe_event, print_settlement};
use crate::utils::colors::{GREY, RESET};
use crate::utils::date;
use crate::utils::formatting::secs2clock;

/// Run a whole session on the virtual clock and settle it like a real one.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Simulate {
        taps,
        every,
        quit_at,
        date: date_arg,
        verbose,
    } = cmd
    {
        let rules = cfg.rules();
        let today = date::resolve_date(date_arg.as_deref())
            .ok_or_else(|| AppError::InvalidDate(date_arg.clone().unwrap_or_default()))?;
        let script = TapScript::parse(taps.as_deref(), *every, *quit_at, rules.duration_secs)?;

        let mut pool = DbPool::new(&cfg.database)?;
        let mut account = SessionLogic::begin(&mut pool, &rules)?;
        let mut ctrl = PresenceController::new(rules);

        let tick_every = if *verbose { 60 } else { 0 };
        let run = run_scripted(&mut ctrl, &mut account, &script, |at, ev| {
            if let Some(line) = describe_event(ev, tick_every) {
                let at = u32::try_from(at).unwrap_or(u32::MAX);
                println!("{}[+{}]{} {}", GREY, secs2clock(at), RESET, line);
            }
        });
        let report = match run {
            Ok(report) => report,
            Err(e) => {
                SessionLogic::abandon(&mut pool)?;
                return Err(e);
            }
        };

        let settlement = SessionLogic::record(&mut pool, &mut account, &report, today, &rules)?;
        println!();
        print_settlement(&settlement, &account);
    }

    Ok(())
}
