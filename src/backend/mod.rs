//! Backend confirmation contract.
//!
//! The backend issues single-use nonces and payment references and gives a
//! yes/no verdict on signed payloads, identity proofs and payment receipts.
//! Calls are pass-throughs: the client makes one attempt and shows the
//! verdict.

pub mod local;

use crate::bridge::{PaymentReceipt, Proof, SignedPayload};
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};

pub use local::LocalBackend;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInVerdict {
    pub status: String,
    pub is_valid: bool,
}

impl SignInVerdict {
    pub fn accepted(&self) -> bool {
        self.status == "success" && self.is_valid
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub payload: Proof,
    pub action: String,
    pub signal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub status: u16,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl VerifyResponse {
    pub fn ok() -> Self {
        Self {
            status: 200,
            verified: true,
            detail: None,
        }
    }

    pub fn rejected(detail: impl Into<String>) -> Self {
        Self {
            status: 400,
            verified: false,
            detail: Some(detail.into()),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: 500,
            verified: false,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmResponse {
    pub success: bool,
}

#[allow(async_fn_in_trait)]
pub trait Backend {
    /// Fresh single-use token bound to the next sign-in.
    async fn issue_nonce(&self) -> AppResult<String>;

    async fn complete_sign_in(&self, payload: &SignedPayload, nonce: &str)
    -> AppResult<SignInVerdict>;

    async fn verify_proof(&self, request: &VerifyRequest) -> VerifyResponse;

    /// Reference the next payment must carry.
    async fn initiate_payment(&self) -> AppResult<String>;

    async fn confirm_payment(&self, receipt: &PaymentReceipt) -> AppResult<ConfirmResponse>;
}
