//! One-shot user actions brokered by the host bridge and confirmed by the
//! backend. Calls are awaited one after another and never retried.

use crate::backend::{Backend, VerifyRequest, VerifyResponse};
use crate::bridge::{
    Bridge, CommandOutcome, ContractCall, PayRequest, PaymentReceipt, TokenAmount,
    ValidityWindow, VerificationLevel,
};
use crate::core::wallet;
use crate::errors::AppResult;
use crate::models::account::Account;
use crate::models::ledger::LedgerEntry;
use crate::utils::amount::Amount;
use chrono::Utc;

pub const SIGN_IN_STATEMENT: &str = "Sign in to rpresence via your wallet";

/// Decimals of the external currency on chain.
const PAYMENT_DECIMALS: u32 = 18;
const PAYMENT_SYMBOL: &str = "WLD";

/// How a user action ended. Only `Done` changed the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome<T> {
    Done(T),
    /// The host application is not present
    Unavailable,
    /// The host returned an error status, usually the user cancelling
    Cancelled(String),
    /// The backend did not confirm the result
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub address: String,
    pub grant: Option<LedgerEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub paid: Amount,
    pub receipt: PaymentReceipt,
    pub entry: LedgerEntry,
}

pub async fn sign_in<B: Bridge, K: Backend>(
    bridge: &B,
    backend: &K,
    account: &mut Account,
    initial_grant: i64,
) -> AppResult<FlowOutcome<SignedIn>> {
    if !bridge.is_available() {
        return Ok(FlowOutcome::Unavailable);
    }

    let nonce = backend.issue_nonce().await?;
    let window = ValidityWindow::standard(Utc::now());

    let payload = match bridge.authenticate(&nonce, window, SIGN_IN_STATEMENT).await {
        CommandOutcome::Success(p) => p,
        CommandOutcome::Error { code } => return Ok(FlowOutcome::Cancelled(code)),
    };

    let verdict = backend.complete_sign_in(&payload, &nonce).await?;
    if !verdict.accepted() {
        return Ok(FlowOutcome::Rejected("Failed to verify signature".into()));
    }

    account.profile.wallet_address = Some(payload.address.clone());
    let grant = wallet::grant_initial(account, initial_grant);

    Ok(FlowOutcome::Done(SignedIn {
        address: payload.address,
        grant,
    }))
}

pub async fn verify_human<B: Bridge, K: Backend>(
    bridge: &B,
    backend: &K,
    account: &mut Account,
    action: &str,
    signal: &str,
    level: VerificationLevel,
) -> AppResult<FlowOutcome<VerifyResponse>> {
    if !bridge.is_available() {
        return Ok(FlowOutcome::Unavailable);
    }

    let proof = match bridge.request_proof(action, signal, level).await {
        CommandOutcome::Success(p) => p,
        CommandOutcome::Error { code } => return Ok(FlowOutcome::Cancelled(code)),
    };

    let response = backend
        .verify_proof(&VerifyRequest {
            payload: proof,
            action: action.to_string(),
            signal: signal.to_string(),
        })
        .await;

    if !response.verified {
        let why = response
            .detail
            .clone()
            .unwrap_or_else(|| format!("status {}", response.status));
        return Ok(FlowOutcome::Rejected(why));
    }

    account.profile.verified = true;
    Ok(FlowOutcome::Done(response))
}

pub async fn purchase<B: Bridge, K: Backend>(
    bridge: &B,
    backend: &K,
    account: &mut Account,
    amount: Amount,
    recipient: &str,
    rate: i64,
) -> AppResult<FlowOutcome<Purchase>> {
    if !bridge.is_available() {
        return Ok(FlowOutcome::Unavailable);
    }

    let reference = backend.initiate_payment().await?;
    let request = PayRequest {
        reference,
        to: recipient.to_string(),
        tokens: vec![TokenAmount {
            symbol: PAYMENT_SYMBOL.to_string(),
            token_amount: amount.to_token_units(PAYMENT_DECIMALS),
        }],
        description: format!("{} tokens", amount.convert(rate)),
    };

    let receipt = match bridge.pay(&request).await {
        CommandOutcome::Success(r) => r,
        CommandOutcome::Error { code } => return Ok(FlowOutcome::Cancelled(code)),
    };

    let confirmed = backend.confirm_payment(&receipt).await?;
    if !confirmed.success {
        return Ok(FlowOutcome::Rejected("Payment could not be confirmed".into()));
    }

    let entry = wallet::credit_purchase(account, amount, rate)
        .with_reference(receipt.transaction_id.clone());

    Ok(FlowOutcome::Done(Purchase {
        paid: amount,
        receipt,
        entry,
    }))
}

pub async fn submit_transaction<B: Bridge>(
    bridge: &B,
    call: &ContractCall,
) -> FlowOutcome<String> {
    if !bridge.is_available() {
        return FlowOutcome::Unavailable;
    }

    match bridge.submit_transaction(call).await {
        CommandOutcome::Success(tx) => FlowOutcome::Done(tx),
        CommandOutcome::Error { code } => FlowOutcome::Cancelled(code),
    }
}
