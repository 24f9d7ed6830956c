use super::streak::Streak;
use serde::{Deserialize, Serialize};

/// Persisted balance record: `{ "value": n }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub value: i64,
}

/// Persisted profile record (everything that is neither streak nor balance).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub boost_active: bool,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub verified: bool,
    /// Whether the initial sign-in grant was already paid out
    #[serde(default)]
    pub granted: bool,
}

/// Client-side account state, owned by a single client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    pub balance: Balance,
    pub streak: Streak,
    pub profile: Profile,
}

impl Account {
    pub fn boost_active(&self) -> bool {
        self.profile.boost_active
    }

    pub fn is_signed_in(&self) -> bool {
        self.profile.wallet_address.is_some()
    }
}
