//! Real-time session driver on tokio.
//!
//! Each input line is a tap; `q` quits. Closing the input stops the taps but
//! not the session, which then runs into its liveness deadlines. Ctrl-C
//! abandons the session without a report.

use crate::core::presence::{PresenceController, PresenceEvent};
use crate::core::timer::{TimerCommand, TimerKind, TimerToken};
use crate::errors::{AppError, AppResult};
use crate::models::account::Account;
use crate::models::session::{SessionReport, SessionState};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{Duration, Instant, sleep_until};

type Slot = Option<(Instant, TimerToken)>;

/// Armed deadlines, each anchored to the instant of the event that armed it
/// rather than to when that event finished processing. The tick chain
/// therefore stays on `start + n s` however long each tick takes.
#[derive(Default)]
struct Deadlines {
    tick: Slot,
    liveness: Slot,
}

impl Deadlines {
    fn slot(&mut self, kind: TimerKind) -> &mut Slot {
        match kind {
            TimerKind::Tick => &mut self.tick,
            TimerKind::Liveness => &mut self.liveness,
        }
    }

    fn apply(&mut self, commands: &[TimerCommand], from: Instant) {
        for cmd in commands {
            match *cmd {
                TimerCommand::Cancel(kind) => *self.slot(kind) = None,
                TimerCommand::Arm { token, after_secs } => {
                    let at = from + Duration::from_secs(u64::from(after_secs));
                    *self.slot(token.kind) = Some((at, token));
                }
            }
        }
    }

    /// Earliest armed deadline. The tick wins a tie, so completion at the
    /// last second beats a liveness deadline due at the same instant.
    fn next(&self) -> Slot {
        match (self.tick, self.liveness) {
            (Some(t), Some(l)) if l.0 < t.0 => Some(l),
            (Some(t), _) => Some(t),
            (None, l) => l,
        }
    }
}

async fn wait_for(slot: Slot) -> (Instant, TimerToken) {
    match slot {
        Some((at, token)) => {
            sleep_until(at).await;
            (at, token)
        }
        None => std::future::pending().await,
    }
}

pub async fn run_interactive<R, F>(
    ctrl: &mut PresenceController,
    account: &mut Account,
    input: R,
    mut on_event: F,
) -> AppResult<SessionReport>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(&PresenceEvent),
{
    let mut lines = input.lines();
    let mut deadlines = Deadlines::default();
    let mut input_open = true;

    let fx = ctrl.start(account)?;
    deadlines.apply(&fx.timers, Instant::now());
    fx.events.iter().for_each(&mut on_event);

    while ctrl.state() == SessionState::Running {
        let (fx, at) = tokio::select! {
            biased;

            (at, token) = wait_for(deadlines.next()) => (ctrl.on_timer(token, account), at),
            line = lines.next_line(), if input_open => {
                let fx = match line? {
                    Some(l) if matches!(l.trim(), "q" | "quit") => ctrl.quit(account)?,
                    Some(_) => ctrl.tap()?,
                    None => {
                        input_open = false;
                        continue;
                    }
                };
                (fx, Instant::now())
            },
            _ = tokio::signal::ctrl_c() => {
                // abandoned: no outcome, nothing to settle
                ctrl.teardown();
                return Err(AppError::Other("session interrupted".into()));
            }
        };

        deadlines.apply(&fx.timers, at);
        fx.events.iter().for_each(&mut on_event);
    }

    ctrl.take_report()
        .ok_or_else(|| AppError::Other("session stopped without an outcome".into()))
}
