//! Presence session controller.
//!
//! A sans-IO state machine: `Idle → Running → {Completed, Failed, Quit}`.
//! Operations return [`Effects`] telling the driver which timers to arm or
//! cancel and what happened, so the same controller runs under the virtual
//! clock (`simulate`, tests) and under tokio (`session`).

use crate::core::timer::{TimerCommand, TimerKind, TimerToken};
use crate::core::wallet;
use crate::errors::{AppError, AppResult};
use crate::models::account::Account;
use crate::models::ledger::LedgerEntry;
use crate::models::session::{Session, SessionOutcome, SessionReport, SessionRules, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEvent {
    Started { generation: u64, boost: bool },
    Tapped,
    Tick { remaining: u32 },
    Missed { missed: u32, max: u32 },
    Forgiven,
    Ended(SessionOutcome),
    StaleTimer(TimerToken),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Effects {
    pub timers: Vec<TimerCommand>,
    pub events: Vec<PresenceEvent>,
}

impl Effects {
    fn event(&mut self, ev: PresenceEvent) {
        self.events.push(ev);
    }
}

pub struct PresenceController {
    rules: SessionRules,
    state: SessionState,
    session: Session,
    generation: u64,
    next_seq: u64,
    armed_tick: Option<TimerToken>,
    armed_liveness: Option<TimerToken>,
    report: Option<SessionReport>,
}

impl PresenceController {
    pub fn new(rules: SessionRules) -> Self {
        Self {
            rules,
            state: SessionState::Idle,
            session: Session::new(&rules),
            generation: 0,
            next_seq: 0,
            armed_tick: None,
            armed_liveness: None,
            report: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn require(&self, expected: SessionState, op: &'static str) -> AppResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(AppError::InvalidState {
                op,
                state: self.state.to_string(),
            })
        }
    }

    fn arm(&mut self, kind: TimerKind, after_secs: u32, fx: &mut Effects) {
        self.next_seq += 1;
        let token = TimerToken {
            kind,
            generation: self.generation,
            seq: self.next_seq,
        };
        match kind {
            TimerKind::Tick => self.armed_tick = Some(token),
            TimerKind::Liveness => self.armed_liveness = Some(token),
        }
        fx.timers.push(TimerCommand::Cancel(kind));
        fx.timers.push(TimerCommand::Arm { token, after_secs });
    }

    fn disarm_all(&mut self, fx: &mut Effects) {
        self.armed_tick = None;
        self.armed_liveness = None;
        fx.timers.push(TimerCommand::Cancel(TimerKind::Tick));
        fx.timers.push(TimerCommand::Cancel(TimerKind::Liveness));
    }

    fn is_armed(&self, token: &TimerToken) -> bool {
        let armed = match token.kind {
            TimerKind::Tick => self.armed_tick,
            TimerKind::Liveness => self.armed_liveness,
        };
        self.state == SessionState::Running && armed.as_ref() == Some(token)
    }

    /// Pay for a one-time miss forgiveness in the next session.
    pub fn activate_boost(&self, account: &mut Account) -> AppResult<LedgerEntry> {
        self.require(SessionState::Idle, "activate a boost")?;
        wallet::activate_boost(account, self.rules.boost_cost)
    }

    pub fn start(&mut self, account: &Account) -> AppResult<Effects> {
        self.require(SessionState::Idle, "start a session")?;

        self.generation += 1;
        self.session = Session::new(&self.rules);
        self.report = None;
        self.state = SessionState::Running;

        let mut fx = Effects::default();
        self.arm(TimerKind::Tick, 1, &mut fx);
        self.arm(TimerKind::Liveness, self.rules.presence_interval_secs, &mut fx);
        fx.event(PresenceEvent::Started {
            generation: self.generation,
            boost: account.boost_active(),
        });
        Ok(fx)
    }

    pub fn tap(&mut self) -> AppResult<Effects> {
        self.require(SessionState::Running, "tap")?;

        let mut fx = Effects::default();
        self.session.missed_count = 0;
        self.session.taps += 1;
        self.arm(TimerKind::Liveness, self.rules.presence_interval_secs, &mut fx);
        fx.event(PresenceEvent::Tapped);
        Ok(fx)
    }

    pub fn quit(&mut self, account: &mut Account) -> AppResult<Effects> {
        self.require(SessionState::Running, "quit")?;

        let mut fx = Effects::default();
        self.finish(SessionOutcome::Quit, account, &mut fx);
        Ok(fx)
    }

    /// Deliver a timer the driver armed earlier. Stale tokens are no-ops.
    pub fn on_timer(&mut self, token: TimerToken, account: &mut Account) -> Effects {
        let mut fx = Effects::default();

        if !self.is_armed(&token) {
            fx.event(PresenceEvent::StaleTimer(token));
            return fx;
        }

        match token.kind {
            TimerKind::Tick => {
                self.armed_tick = None;
                self.on_tick(account, &mut fx);
            }
            TimerKind::Liveness => {
                self.armed_liveness = None;
                self.on_liveness_timeout(account, &mut fx);
            }
        }
        fx
    }

    fn on_tick(&mut self, account: &mut Account, fx: &mut Effects) {
        self.session.time_remaining = self.session.time_remaining.saturating_sub(1);
        fx.event(PresenceEvent::Tick {
            remaining: self.session.time_remaining,
        });

        if self.session.time_remaining == 0 {
            self.finish(SessionOutcome::Completed, account, fx);
        } else {
            self.arm(TimerKind::Tick, 1, fx);
        }
    }

    fn on_liveness_timeout(&mut self, account: &mut Account, fx: &mut Effects) {
        if account.boost_active() && !self.session.boost_consumed {
            self.session.boost_consumed = true;
            fx.event(PresenceEvent::Forgiven);
            self.arm(TimerKind::Liveness, self.rules.presence_interval_secs, fx);
            return;
        }

        self.session.missed_count += 1;
        fx.event(PresenceEvent::Missed {
            missed: self.session.missed_count,
            max: self.session.max_misses,
        });

        if self.session.missed_count >= self.session.max_misses {
            self.finish(SessionOutcome::Failed, account, fx);
        } else {
            self.arm(TimerKind::Liveness, self.rules.presence_interval_secs, fx);
        }
    }

    fn finish(&mut self, outcome: SessionOutcome, account: &mut Account, fx: &mut Effects) {
        self.disarm_all(fx);
        self.state = outcome.into();

        // a boost covers exactly one session, used or not
        account.profile.boost_active = false;

        self.report = Some(SessionReport {
            generation: self.generation,
            outcome,
            elapsed_secs: self.session.elapsed(),
            taps: self.session.taps,
            missed_count: self.session.missed_count,
            boost_used: self.session.boost_consumed,
        });
        fx.event(PresenceEvent::Ended(outcome));
    }

    /// Hand the finished session over and return to `Idle`.
    pub fn take_report(&mut self) -> Option<SessionReport> {
        if !self.state.is_terminal() {
            return None;
        }
        self.state = SessionState::Idle;
        self.report.take()
    }

    /// Abandon whatever is running: all timers cancelled, no report.
    pub fn teardown(&mut self) -> Effects {
        let mut fx = Effects::default();
        self.disarm_all(&mut fx);
        self.generation += 1;
        self.state = SessionState::Idle;
        self.report = None;
        fx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timer::VirtualClock;

    fn rules() -> SessionRules {
        SessionRules::default()
    }

    fn funded(value: i64) -> Account {
        let mut a = Account::default();
        a.balance.value = value;
        a
    }

    /// Run timers until `until` (inclusive) or until the session ends.
    fn run_until(
        ctrl: &mut PresenceController,
        clock: &mut VirtualClock,
        account: &mut Account,
        until: u64,
    ) {
        while let Some(due) = clock.next_due() {
            if due > until || ctrl.state() != SessionState::Running {
                break;
            }
            let token = clock.pop_due().unwrap();
            let fx = ctrl.on_timer(token, account);
            clock.apply(&fx.timers);
        }
        clock.advance_to(until);
    }

    fn started(account: &Account) -> (PresenceController, VirtualClock) {
        let mut ctrl = PresenceController::new(rules());
        let mut clock = VirtualClock::new();
        let fx = ctrl.start(account).unwrap();
        clock.apply(&fx.timers);
        (ctrl, clock)
    }

    #[test]
    fn start_arms_both_timers() {
        let account = Account::default();
        let mut ctrl = PresenceController::new(rules());
        let fx = ctrl.start(&account).unwrap();

        assert_eq!(ctrl.state(), SessionState::Running);
        assert_eq!(ctrl.session().time_remaining, 600);
        let arms: Vec<_> = fx
            .timers
            .iter()
            .filter_map(|c| match c {
                TimerCommand::Arm { token, after_secs } => Some((token.kind, *after_secs)),
                _ => None,
            })
            .collect();
        assert_eq!(arms, vec![(TimerKind::Tick, 1), (TimerKind::Liveness, 70)]);
    }

    #[test]
    fn start_while_running_is_rejected() {
        let account = Account::default();
        let mut ctrl = PresenceController::new(rules());
        ctrl.start(&account).unwrap();
        let err = ctrl.start(&account).unwrap_err();
        assert!(matches!(err, AppError::InvalidState { .. }));
    }

    #[test]
    fn tap_and_quit_need_a_running_session() {
        let mut account = Account::default();
        let mut ctrl = PresenceController::new(rules());
        assert!(ctrl.tap().is_err());
        assert!(ctrl.quit(&mut account).is_err());
    }

    #[test]
    fn regular_taps_reach_completion() {
        let mut account = Account::default();
        let (mut ctrl, mut clock) = started(&account);

        let mut t = 0;
        while ctrl.state() == SessionState::Running {
            t += 60;
            run_until(&mut ctrl, &mut clock, &mut account, t);
            if ctrl.state() == SessionState::Running {
                let fx = ctrl.tap().unwrap();
                clock.apply(&fx.timers);
                assert_eq!(ctrl.session().missed_count, 0);
            }
        }

        assert_eq!(ctrl.state(), SessionState::Completed);
        let report = ctrl.take_report().unwrap();
        assert_eq!(report.outcome, SessionOutcome::Completed);
        assert_eq!(report.elapsed_secs, 600);
        assert_eq!(report.missed_count, 0);
        assert_eq!(ctrl.state(), SessionState::Idle);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn silence_fails_after_max_misses() {
        let mut account = Account::default();
        let (mut ctrl, mut clock) = started(&account);

        run_until(&mut ctrl, &mut clock, &mut account, 139);
        assert_eq!(ctrl.state(), SessionState::Running);
        assert_eq!(ctrl.session().missed_count, 1);

        run_until(&mut ctrl, &mut clock, &mut account, 140);
        assert_eq!(ctrl.state(), SessionState::Failed);
        let report = ctrl.take_report().unwrap();
        assert_eq!(report.outcome, SessionOutcome::Failed);
        assert_eq!(report.elapsed_secs, 140);
    }

    #[test]
    fn tap_resets_missed_count() {
        let mut account = Account::default();
        let (mut ctrl, mut clock) = started(&account);

        run_until(&mut ctrl, &mut clock, &mut account, 75);
        assert_eq!(ctrl.session().missed_count, 1);
        let fx = ctrl.tap().unwrap();
        clock.apply(&fx.timers);
        assert_eq!(ctrl.session().missed_count, 0);

        // next deadline is 70s after the tap, not after the miss
        run_until(&mut ctrl, &mut clock, &mut account, 144);
        assert_eq!(ctrl.session().missed_count, 0);
        run_until(&mut ctrl, &mut clock, &mut account, 145);
        assert_eq!(ctrl.session().missed_count, 1);
    }

    #[test]
    fn boost_forgives_exactly_one_miss() {
        let mut account = funded(10);
        let ctrl = PresenceController::new(rules());
        ctrl.activate_boost(&mut account).unwrap();
        let (mut ctrl, mut clock) = started(&account);

        run_until(&mut ctrl, &mut clock, &mut account, 70);
        assert!(ctrl.session().boost_consumed);
        assert_eq!(ctrl.session().missed_count, 0);

        run_until(&mut ctrl, &mut clock, &mut account, 140);
        assert_eq!(ctrl.session().missed_count, 1);
        run_until(&mut ctrl, &mut clock, &mut account, 210);
        assert_eq!(ctrl.state(), SessionState::Failed);
        assert!(!account.boost_active());
    }

    #[test]
    fn boost_is_reset_after_any_ending() {
        let mut account = funded(10);
        let ctrl = PresenceController::new(rules());
        ctrl.activate_boost(&mut account).unwrap();
        let (mut ctrl, _clock) = started(&account);

        ctrl.quit(&mut account).unwrap();
        let report = ctrl.take_report().unwrap();
        assert_eq!(report.outcome, SessionOutcome::Quit);
        assert!(!report.boost_used);
        assert!(!account.boost_active());
    }

    #[test]
    fn boost_cannot_be_bought_mid_session() {
        let mut account = funded(10);
        let (ctrl, _clock) = started(&account);
        assert!(matches!(
            ctrl.activate_boost(&mut account),
            Err(AppError::InvalidState { .. })
        ));
        assert_eq!(account.balance.value, 10);
    }

    #[test]
    fn completion_beats_a_same_instant_miss() {
        let mut account = Account::default();
        let short = SessionRules {
            duration_secs: 140,
            ..rules()
        };
        let mut ctrl = PresenceController::new(short);
        let mut clock = VirtualClock::new();
        clock.apply(&ctrl.start(&account).unwrap().timers);

        run_until(&mut ctrl, &mut clock, &mut account, 140);
        assert_eq!(ctrl.state(), SessionState::Completed);
        assert_eq!(ctrl.session().missed_count, 1);
    }

    #[test]
    fn stale_tokens_from_a_previous_generation_are_ignored() {
        let mut account = Account::default();
        let (mut ctrl, mut clock) = started(&account);
        let old_liveness = ctrl.armed_liveness.unwrap();

        ctrl.quit(&mut account).unwrap();
        ctrl.take_report().unwrap();
        clock.apply(&ctrl.start(&account).unwrap().timers);

        let fx = ctrl.on_timer(old_liveness, &mut account);
        assert_eq!(fx.events, vec![PresenceEvent::StaleTimer(old_liveness)]);
        assert!(fx.timers.is_empty());
        assert_eq!(ctrl.session().missed_count, 0);
        assert_eq!(ctrl.state(), SessionState::Running);
    }

    #[test]
    fn superseded_liveness_deadline_is_ignored() {
        let mut account = Account::default();
        let (mut ctrl, _clock) = started(&account);
        let before_tap = ctrl.armed_liveness.unwrap();
        ctrl.tap().unwrap();

        let fx = ctrl.on_timer(before_tap, &mut account);
        assert!(matches!(fx.events[..], [PresenceEvent::StaleTimer(_)]));
        assert_eq!(ctrl.session().missed_count, 0);
    }

    #[test]
    fn teardown_invalidates_everything() {
        let mut account = Account::default();
        let (mut ctrl, _clock) = started(&account);
        let tick = ctrl.armed_tick.unwrap();

        let fx = ctrl.teardown();
        assert!(fx.timers.contains(&TimerCommand::Cancel(TimerKind::Tick)));
        assert_eq!(ctrl.state(), SessionState::Idle);
        assert!(ctrl.take_report().is_none());

        let fx = ctrl.on_timer(tick, &mut account);
        assert!(matches!(fx.events[..], [PresenceEvent::StaleTimer(_)]));
    }
}
