//! Host bridge contract.
//!
//! The wallet/identity host is an opaque capability. Every command is a
//! single-shot request whose failure (including the user cancelling) comes
//! back as [`CommandOutcome::Error`], a normal outcome rather than an
//! `AppError`.

pub mod signing;
pub mod simulated;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use simulated::SimulatedBridge;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CommandOutcome<T> {
    Success(T),
    Error {
        #[serde(rename = "error_code")]
        code: String,
    },
}

impl<T> CommandOutcome<T> {
    pub fn cancelled() -> Self {
        CommandOutcome::Error {
            code: "user_rejected".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VerificationLevel {
    Orb,
    Device,
}

impl fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationLevel::Orb => f.write_str("orb"),
            VerificationLevel::Device => f.write_str("device"),
        }
    }
}

/// Interval in which a wallet sign-in message is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityWindow {
    pub not_before: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
}

impl ValidityWindow {
    /// One day back, seven days ahead.
    pub fn standard(now: DateTime<Utc>) -> Self {
        Self {
            not_before: now - Duration::days(1),
            expiration_time: now + Duration::days(7),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at < self.expiration_time
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPayload {
    pub address: String,
    pub message: String,
    pub signature: String,
    pub nonce: String,
    pub window: ValidityWindow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub merkle_root: String,
    pub nullifier_hash: String,
    pub proof: String,
    pub verification_level: VerificationLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub symbol: String,
    /// Integer amount in the token's smallest unit
    pub token_amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayRequest {
    pub reference: String,
    pub to: String,
    pub tokens: Vec<TokenAmount>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub reference: String,
    pub transaction_id: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    pub address: String,
    pub function_name: String,
    pub args: Vec<String>,
}

#[allow(async_fn_in_trait)]
pub trait Bridge {
    fn is_available(&self) -> bool;

    async fn authenticate(
        &self,
        nonce: &str,
        window: ValidityWindow,
        statement: &str,
    ) -> CommandOutcome<SignedPayload>;

    async fn request_proof(
        &self,
        action: &str,
        signal: &str,
        level: VerificationLevel,
    ) -> CommandOutcome<Proof>;

    async fn pay(&self, request: &PayRequest) -> CommandOutcome<PaymentReceipt>;

    async fn submit_transaction(&self, call: &ContractCall) -> CommandOutcome<String>;
}
