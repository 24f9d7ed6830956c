//! Digest helpers shared by the simulated host and the local backend.
//! They stand in for real wallet signatures and zero-knowledge proofs.

use sha2::{Digest, Sha256};

pub fn digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for p in parts {
        hasher.update(p.as_bytes());
        hasher.update([0x1f]);
    }
    format!("0x{}", hex::encode(hasher.finalize()))
}

pub fn sign(address: &str, message: &str) -> String {
    digest(&["sig", address, message])
}

pub fn verify_signature(address: &str, message: &str, signature: &str) -> bool {
    sign(address, message) == signature
}

pub fn nullifier(address: &str, action: &str) -> String {
    digest(&["nullifier", address, action])
}

pub fn proof(nullifier_hash: &str, action: &str, signal: &str) -> String {
    digest(&["proof", nullifier_hash, action, signal])
}

/// The message the host signs for a wallet sign-in.
pub fn sign_in_message(
    address: &str,
    statement: &str,
    nonce: &str,
    not_before: &str,
    expiration: &str,
) -> String {
    format!(
        "{address} wants you to sign in with your Ethereum account:\n\
         {statement}\n\
         Nonce: {nonce}\n\
         Not Before: {not_before}\n\
         Expiration Time: {expiration}"
    )
}

/// Pull the `Nonce:` line back out of a sign-in message.
pub fn message_nonce(message: &str) -> Option<&str> {
    message
        .lines()
        .find_map(|l| l.strip_prefix("Nonce: "))
        .map(str::trim)
}
