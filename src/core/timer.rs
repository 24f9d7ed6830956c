//! Timer tokens and the deterministic virtual clock.
//!
//! The presence controller never owns a real timer. It asks its driver to
//! arm or cancel deadlines, and every deadline carries a token naming the
//! session generation it was armed for. A token that is no longer the one
//! armed for its kind is stale and the controller ignores it.

use std::collections::BTreeSet;

/// `Tick` orders before `Liveness`, so at the same instant the countdown
/// is served first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    Tick,
    Liveness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken {
    pub kind: TimerKind,
    pub generation: u64,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Arm { token: TimerToken, after_secs: u32 },
    Cancel(TimerKind),
}

/// Virtual seconds clock used by `simulate` and by tests.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: u64,
    // (due, kind, seq, token): kind before seq keeps Tick ahead of Liveness
    queue: BTreeSet<(u64, TimerKind, u64, TimerToken)>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn apply(&mut self, commands: &[TimerCommand]) {
        for cmd in commands {
            match *cmd {
                TimerCommand::Arm { token, after_secs } => {
                    let due = self.now + u64::from(after_secs);
                    self.queue.insert((due, token.kind, token.seq, token));
                }
                TimerCommand::Cancel(kind) => {
                    self.queue.retain(|(_, k, _, _)| *k != kind);
                }
            }
        }
    }

    /// Deadline of the next armed timer, if any.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.first().map(|(due, ..)| *due)
    }

    /// Deadline and kind of the next armed timer, if any.
    pub fn peek_next(&self) -> Option<(u64, TimerKind)> {
        self.queue.first().map(|(due, kind, ..)| (*due, *kind))
    }

    /// Move to the next armed deadline and hand out its token.
    pub fn pop_due(&mut self) -> Option<TimerToken> {
        let (due, _, _, token) = self.queue.pop_first()?;
        self.now = self.now.max(due);
        Some(token)
    }

    /// Move the clock forward without firing anything.
    pub fn advance_to(&mut self, at: u64) {
        self.now = self.now.max(at);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
