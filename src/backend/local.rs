//! In-process backend over the local SQLite database.

use super::{Backend, ConfirmResponse, SignInVerdict, VerifyRequest, VerifyResponse};
use crate::bridge::signing;
use crate::bridge::{PaymentReceipt, SignedPayload};
use crate::errors::AppResult;
use chrono::{Duration, Utc};
use rusqlite::{Connection, OptionalExtension, params};

pub struct LocalBackend<'a> {
    conn: &'a Connection,
    nonce_ttl: Duration,
}

fn is_digest(s: &str) -> bool {
    s.len() == 66 && s.starts_with("0x") && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

impl<'a> LocalBackend<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            nonce_ttl: Duration::minutes(10),
        }
    }

    pub fn with_nonce_ttl(mut self, ttl: Duration) -> Self {
        self.nonce_ttl = ttl;
        self
    }

    /// Mark the nonce used. True only for a known, unused, unexpired nonce.
    fn consume_nonce(&self, nonce: &str) -> AppResult<bool> {
        let issued_at: Option<i64> = self
            .conn
            .query_row(
                "SELECT issued_at FROM nonces WHERE nonce = ?1 AND used = 0",
                params![nonce],
                |row| row.get(0),
            )
            .optional()?;

        let Some(issued_at) = issued_at else {
            return Ok(false);
        };

        self.conn
            .execute("UPDATE nonces SET used = 1 WHERE nonce = ?1", params![nonce])?;

        let age = Utc::now().timestamp() - issued_at;
        Ok(age < self.nonce_ttl.num_seconds())
    }
}

impl Backend for LocalBackend<'_> {
    async fn issue_nonce(&self) -> AppResult<String> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        self.conn.execute(
            "INSERT INTO nonces (nonce, issued_at, used) VALUES (?1, ?2, 0)",
            params![nonce, Utc::now().timestamp()],
        )?;
        Ok(nonce)
    }

    async fn complete_sign_in(
        &self,
        payload: &SignedPayload,
        nonce: &str,
    ) -> AppResult<SignInVerdict> {
        let fresh = self.consume_nonce(nonce)?;

        let is_valid = fresh
            && payload.nonce == nonce
            && signing::message_nonce(&payload.message) == Some(nonce)
            && payload.window.contains(Utc::now())
            && signing::verify_signature(&payload.address, &payload.message, &payload.signature);

        Ok(SignInVerdict {
            status: if fresh { "success" } else { "error" }.to_string(),
            is_valid,
        })
    }

    async fn verify_proof(&self, request: &VerifyRequest) -> VerifyResponse {
        let p = &request.payload;
        if !is_digest(&p.proof) || !is_digest(&p.nullifier_hash) || !is_digest(&p.merkle_root) {
            return VerifyResponse::failed("malformed proof payload");
        }
        if request.action.trim().is_empty() {
            return VerifyResponse::rejected("missing action");
        }

        let expected = signing::proof(&p.nullifier_hash, &request.action, &request.signal);
        if expected == p.proof {
            VerifyResponse::ok()
        } else {
            VerifyResponse::rejected("proof does not match action and signal")
        }
    }

    async fn initiate_payment(&self) -> AppResult<String> {
        let reference = uuid::Uuid::new_v4().simple().to_string();
        self.conn.execute(
            "INSERT INTO payments (reference, created_at) VALUES (?1, ?2)",
            params![reference, Utc::now().to_rfc3339()],
        )?;
        Ok(reference)
    }

    async fn confirm_payment(&self, receipt: &PaymentReceipt) -> AppResult<ConfirmResponse> {
        if receipt.transaction_id.is_empty() {
            return Ok(ConfirmResponse { success: false });
        }

        let known: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT transaction_id FROM payments WHERE reference = ?1",
                params![receipt.reference],
                |row| row.get(0),
            )
            .optional()?;

        let success = match known {
            None => false,
            // already confirmed: same receipt, same verdict
            Some(Some(tx)) => tx == receipt.transaction_id,
            Some(None) => {
                self.conn.execute(
                    "UPDATE payments SET transaction_id = ?1, confirmed_at = ?2
                     WHERE reference = ?3",
                    params![
                        receipt.transaction_id,
                        Utc::now().to_rfc3339(),
                        receipt.reference
                    ],
                )?;
                true
            }
        };

        Ok(ConfirmResponse { success })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{
        Bridge, CommandOutcome, PayRequest, SimulatedBridge, TokenAmount, ValidityWindow,
        VerificationLevel,
    };
    use crate::db::migrate::run_pending_migrations;

    fn conn() -> Connection {
        let c = Connection::open_in_memory().unwrap();
        run_pending_migrations(&c).unwrap();
        c
    }

    async fn signed(bridge: &SimulatedBridge, nonce: &str) -> SignedPayload {
        match bridge
            .authenticate(nonce, ValidityWindow::standard(Utc::now()), "Sign in")
            .await
        {
            CommandOutcome::Success(p) => p,
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn nonces_are_hex_and_unique() {
        let c = conn();
        let backend = LocalBackend::new(&c);
        let a = backend.issue_nonce().await.unwrap();
        let b = backend.issue_nonce().await.unwrap();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn sign_in_accepts_once_per_nonce() {
        let c = conn();
        let backend = LocalBackend::new(&c);
        let bridge = SimulatedBridge::new("0x00000000000000000000000000000000000000aa");
        let nonce = backend.issue_nonce().await.unwrap();
        let payload = signed(&bridge, &nonce).await;

        assert!(backend.complete_sign_in(&payload, &nonce).await.unwrap().accepted());
        let replay = backend.complete_sign_in(&payload, &nonce).await.unwrap();
        assert!(!replay.accepted());
        assert_eq!(replay.status, "error");
    }

    #[tokio::test]
    async fn sign_in_rejects_unknown_and_expired_nonces() {
        let c = conn();
        let bridge = SimulatedBridge::new("0xaa");

        let backend = LocalBackend::new(&c);
        let payload = signed(&bridge, "feedface").await;
        assert!(!backend.complete_sign_in(&payload, "feedface").await.unwrap().accepted());

        let expiring = LocalBackend::new(&c).with_nonce_ttl(Duration::zero());
        let nonce = expiring.issue_nonce().await.unwrap();
        let payload = signed(&bridge, &nonce).await;
        assert!(!expiring.complete_sign_in(&payload, &nonce).await.unwrap().accepted());
    }

    #[tokio::test]
    async fn tampered_signature_is_invalid() {
        let c = conn();
        let backend = LocalBackend::new(&c);
        let bridge = SimulatedBridge::new("0xaa");
        let nonce = backend.issue_nonce().await.unwrap();
        let mut payload = signed(&bridge, &nonce).await;
        payload.address = "0xbb".into();

        let verdict = backend.complete_sign_in(&payload, &nonce).await.unwrap();
        assert_eq!(verdict.status, "success");
        assert!(!verdict.is_valid);
    }

    #[tokio::test]
    async fn proof_verdicts() {
        let c = conn();
        let backend = LocalBackend::new(&c);
        let bridge = SimulatedBridge::new("0xaa");
        let CommandOutcome::Success(proof) = bridge
            .request_proof("daily-presence", "0xaa", VerificationLevel::Orb)
            .await
        else {
            panic!("proof refused");
        };

        let mut req = VerifyRequest {
            payload: proof,
            action: "daily-presence".into(),
            signal: "0xaa".into(),
        };
        assert_eq!(backend.verify_proof(&req).await, VerifyResponse::ok());

        req.signal = "0xbb".into();
        let r = backend.verify_proof(&req).await;
        assert_eq!((r.status, r.verified), (400, false));

        req.payload.proof = "garbage".into();
        assert_eq!(backend.verify_proof(&req).await.status, 500);
    }

    #[tokio::test]
    async fn payment_confirmation_is_idempotent() {
        let c = conn();
        let backend = LocalBackend::new(&c);
        let bridge = SimulatedBridge::new("0xaa");
        let reference = backend.initiate_payment().await.unwrap();
        let request = PayRequest {
            reference: reference.clone(),
            to: "0xcc".into(),
            tokens: vec![TokenAmount {
                symbol: "WLD".into(),
                token_amount: "1000000000000000000".into(),
            }],
            description: "top up".into(),
        };
        let CommandOutcome::Success(receipt) = bridge.pay(&request).await else {
            panic!("payment refused");
        };

        assert!(backend.confirm_payment(&receipt).await.unwrap().success);
        assert!(backend.confirm_payment(&receipt).await.unwrap().success);

        let mut forged = receipt.clone();
        forged.transaction_id = "0xother".into();
        assert!(!backend.confirm_payment(&forged).await.unwrap().success);

        forged.reference = "unknown".into();
        assert!(!backend.confirm_payment(&forged).await.unwrap().success);
    }
}
