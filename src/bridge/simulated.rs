//! Dev-mode host: approves (or cancels) every command locally.

use super::signing;
use super::{
    Bridge, CommandOutcome, ContractCall, PayRequest, PaymentReceipt, Proof, SignedPayload,
    ValidityWindow, VerificationLevel,
};

#[derive(Debug, Clone)]
pub struct SimulatedBridge {
    pub address: String,
    pub installed: bool,
    pub cancel: bool,
}

impl SimulatedBridge {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            installed: true,
            cancel: false,
        }
    }

    /// Derive a stable dev wallet address from a seed (the database path).
    pub fn for_seed(seed: &str) -> Self {
        let d = signing::digest(&["wallet", seed]);
        Self::new(d[..42].to_string())
    }

    pub fn cancelling(mut self, cancel: bool) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn uninstalled(mut self) -> Self {
        self.installed = false;
        self
    }
}

impl Bridge for SimulatedBridge {
    fn is_available(&self) -> bool {
        self.installed
    }

    async fn authenticate(
        &self,
        nonce: &str,
        window: ValidityWindow,
        statement: &str,
    ) -> CommandOutcome<SignedPayload> {
        if self.cancel {
            return CommandOutcome::cancelled();
        }

        let message = signing::sign_in_message(
            &self.address,
            statement,
            nonce,
            &window.not_before.to_rfc3339(),
            &window.expiration_time.to_rfc3339(),
        );
        let signature = signing::sign(&self.address, &message);

        CommandOutcome::Success(SignedPayload {
            address: self.address.clone(),
            message,
            signature,
            nonce: nonce.to_string(),
            window,
        })
    }

    async fn request_proof(
        &self,
        action: &str,
        signal: &str,
        level: VerificationLevel,
    ) -> CommandOutcome<Proof> {
        if self.cancel {
            return CommandOutcome::cancelled();
        }

        let nullifier_hash = signing::nullifier(&self.address, action);
        let proof = signing::proof(&nullifier_hash, action, signal);

        CommandOutcome::Success(Proof {
            merkle_root: signing::digest(&["root", &level.to_string()]),
            nullifier_hash,
            proof,
            verification_level: level,
        })
    }

    async fn pay(&self, request: &PayRequest) -> CommandOutcome<PaymentReceipt> {
        if self.cancel {
            return CommandOutcome::cancelled();
        }
        if request.tokens.is_empty() {
            return CommandOutcome::Error {
                code: "invalid_payload".to_string(),
            };
        }

        CommandOutcome::Success(PaymentReceipt {
            reference: request.reference.clone(),
            transaction_id: signing::digest(&["pay", &request.reference, &self.address]),
            from: self.address.clone(),
            to: request.to.clone(),
        })
    }

    async fn submit_transaction(&self, call: &ContractCall) -> CommandOutcome<String> {
        if self.cancel {
            return CommandOutcome::cancelled();
        }

        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let mut parts = vec![
            "tx",
            self.address.as_str(),
            call.address.as_str(),
            call.function_name.as_str(),
        ];
        parts.extend(call.args.iter().map(String::as_str));
        parts.push(&nonce);

        CommandOutcome::Success(signing::digest(&parts))
    }
}
