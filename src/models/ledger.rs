use serde::Serialize;

/// Why the balance moved. Nothing else is allowed to touch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LedgerReason {
    InitialGrant,
    SessionReward,
    BoostDebit,
    Purchase,
}

impl LedgerReason {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            LedgerReason::InitialGrant => "grant",
            LedgerReason::SessionReward => "reward",
            LedgerReason::BoostDebit => "boost",
            LedgerReason::Purchase => "purchase",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "grant" => Some(LedgerReason::InitialGrant),
            "reward" => Some(LedgerReason::SessionReward),
            "boost" => Some(LedgerReason::BoostDebit),
            "purchase" => Some(LedgerReason::Purchase),
            _ => None,
        }
    }
}

/// One balance mutation, as returned by the wallet operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub reason: LedgerReason,
    pub delta: i64,
    pub balance_after: i64,
    pub reference: String,
}

impl LedgerEntry {
    pub fn new(reason: LedgerReason, delta: i64, balance_after: i64) -> Self {
        Self {
            reason,
            delta,
            balance_after,
            reference: String::new(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }
}

/// A row of the `ledger` table.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRow {
    pub id: i64,
    pub created_at: String,
    pub entry: LedgerEntry,
}
