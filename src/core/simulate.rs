//! Scripted sessions on the virtual clock.
//!
//! A script lists the second offsets at which the user taps and, optionally,
//! when they quit. Within one second the countdown tick comes first, then
//! the user's action, then the liveness deadline.

use crate::core::presence::{PresenceController, PresenceEvent};
use crate::core::timer::{TimerKind, VirtualClock};
use crate::errors::{AppError, AppResult};
use crate::models::account::Account;
use crate::models::session::{SessionReport, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScriptAction {
    Tap,
    Quit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TapScript {
    pub taps: Vec<u32>,
    pub quit_at: Option<u32>,
}

impl TapScript {
    /// Build a script from `--taps 60,120`, `--every 60` and `--quit-at`.
    pub fn parse(
        taps: Option<&str>,
        every: Option<u32>,
        quit_at: Option<u32>,
        duration_secs: u32,
    ) -> AppResult<Self> {
        let mut out = Vec::new();

        if let Some(list) = taps {
            for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let at: u32 = part.parse().map_err(|_| {
                    AppError::InvalidSchedule(format!("'{}' is not a second offset", part))
                })?;
                out.push(at);
            }
        }

        if let Some(step) = every {
            if step == 0 {
                return Err(AppError::InvalidSchedule("--every must be positive".into()));
            }
            out.extend((1..).map(|i| i * step).take_while(|t| *t < duration_secs));
        }

        out.sort_unstable();
        out.dedup();

        Ok(Self { taps: out, quit_at })
    }

    fn actions(&self) -> Vec<(u64, ScriptAction)> {
        let mut v: Vec<(u64, ScriptAction)> = self
            .taps
            .iter()
            .map(|t| (u64::from(*t), ScriptAction::Tap))
            .collect();
        if let Some(q) = self.quit_at {
            v.push((u64::from(q), ScriptAction::Quit));
        }
        v.sort();
        v
    }
}

/// Run one whole session under `script`. `on_event` sees every controller
/// event with the virtual second it happened at.
pub fn run_scripted<F>(
    ctrl: &mut PresenceController,
    account: &mut Account,
    script: &TapScript,
    mut on_event: F,
) -> AppResult<SessionReport>
where
    F: FnMut(u64, &PresenceEvent),
{
    let mut clock = VirtualClock::new();
    let actions = script.actions();
    let mut next_action = 0;

    let fx = ctrl.start(account)?;
    clock.apply(&fx.timers);
    fx.events.iter().for_each(|e| on_event(clock.now(), e));

    while ctrl.state() == SessionState::Running {
        let action = actions.get(next_action).copied();
        let next_timer = clock.peek_next();

        let take_action = match (action, next_timer) {
            (Some((at, _)), Some((due, kind))) => {
                at < due || (at == due && kind == TimerKind::Liveness)
            }
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };

        let fx = if take_action {
            let Some((at, kind)) = action else { break };
            next_action += 1;
            clock.advance_to(at);
            match kind {
                ScriptAction::Tap => ctrl.tap()?,
                ScriptAction::Quit => ctrl.quit(account)?,
            }
        } else {
            let Some(token) = clock.pop_due() else { break };
            ctrl.on_timer(token, account)
        };

        clock.apply(&fx.timers);
        fx.events.iter().for_each(|e| on_event(clock.now(), e));
    }

    ctrl.take_report()
        .ok_or_else(|| AppError::Other("session stopped without an outcome".into()))
}
