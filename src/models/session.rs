use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How long past its full length a session marker is still trusted.
const RUNNING_GRACE_SECS: i64 = 60;

/// Tunables for one presence session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRules {
    pub duration_secs: u32,
    pub presence_interval_secs: u32,
    pub max_misses: u32,
    pub boost_cost: i64,
    pub base_reward: i64,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            duration_secs: 600,
            presence_interval_secs: 70,
            max_misses: 2,
            boost_cost: 5,
            base_reward: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Failed,
    Quit,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Quit
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
            SessionState::Quit => "quit",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOutcome {
    Completed,
    Failed,
    Quit,
}

impl SessionOutcome {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SessionOutcome::Completed => "completed",
            SessionOutcome::Failed => "failed",
            SessionOutcome::Quit => "quit",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(SessionOutcome::Completed),
            "failed" => Some(SessionOutcome::Failed),
            "quit" => Some(SessionOutcome::Quit),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SessionOutcome::Completed)
    }
}

impl From<SessionOutcome> for SessionState {
    fn from(o: SessionOutcome) -> Self {
        match o {
            SessionOutcome::Completed => SessionState::Completed,
            SessionOutcome::Failed => SessionState::Failed,
            SessionOutcome::Quit => SessionState::Quit,
        }
    }
}

/// Counters of the session currently (or most recently) running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub duration_total: u32,
    pub time_remaining: u32,
    pub missed_count: u32,
    pub max_misses: u32,
    pub boost_consumed: bool,
    pub taps: u32,
}

impl Session {
    pub fn new(rules: &SessionRules) -> Self {
        Self {
            duration_total: rules.duration_secs,
            time_remaining: rules.duration_secs,
            missed_count: 0,
            max_misses: rules.max_misses,
            boost_consumed: false,
            taps: 0,
        }
    }

    pub fn elapsed(&self) -> u32 {
        self.duration_total - self.time_remaining
    }
}

/// What a finished session hands over to the reward step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub generation: u64,
    pub outcome: SessionOutcome,
    pub elapsed_secs: u32,
    pub taps: u32,
    pub missed_count: u32,
    pub boost_used: bool,
}

/// Persisted while a session runs, so no other client starts a second one
/// or buys a boost until it has been settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningSession {
    pub started_at: DateTime<Utc>,
}

impl RunningSession {
    pub fn now() -> Self {
        Self {
            started_at: Utc::now(),
        }
    }

    /// A marker that outlived the longest possible session was left behind
    /// by a client that died before settling.
    pub fn is_stale(&self, now: DateTime<Utc>, rules: &SessionRules) -> bool {
        let limit = i64::from(rules.duration_secs) + RUNNING_GRACE_SECS;
        now - self.started_at > Duration::seconds(limit)
    }
}
