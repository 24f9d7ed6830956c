//! Balance mutations. These are the only functions allowed to move
//! `Account::balance`; each one returns the ledger entry to record.

use crate::errors::{AppError, AppResult};
use crate::models::account::Account;
use crate::models::ledger::{LedgerEntry, LedgerReason};
use crate::utils::amount::Amount;

/// Debit `cost` and mark the boost active for the next session.
pub fn activate_boost(account: &mut Account, cost: i64) -> AppResult<LedgerEntry> {
    if account.profile.boost_active {
        return Err(AppError::BoostAlreadyActive);
    }
    if account.balance.value < cost {
        return Err(AppError::InsufficientFunds {
            needed: cost,
            available: account.balance.value,
        });
    }

    account.balance.value -= cost;
    account.profile.boost_active = true;

    Ok(LedgerEntry::new(
        LedgerReason::BoostDebit,
        -cost,
        account.balance.value,
    ))
}

/// One-time grant paid on the first successful sign-in.
pub fn grant_initial(account: &mut Account, amount: i64) -> Option<LedgerEntry> {
    if account.profile.granted {
        return None;
    }
    account.profile.granted = true;
    account.balance.value += amount;

    Some(LedgerEntry::new(
        LedgerReason::InitialGrant,
        amount,
        account.balance.value,
    ))
}

pub fn credit_reward(account: &mut Account, reward: i64) -> Option<LedgerEntry> {
    if reward <= 0 {
        return None;
    }
    account.balance.value += reward;
    Some(LedgerEntry::new(
        LedgerReason::SessionReward,
        reward,
        account.balance.value,
    ))
}

/// Credit a confirmed purchase at `rate` tokens per unit of external
/// currency, rounded down.
pub fn credit_purchase(account: &mut Account, paid: Amount, rate: i64) -> LedgerEntry {
    let credit = paid.convert(rate);
    account.balance.value += credit;
    LedgerEntry::new(LedgerReason::Purchase, credit, account.balance.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_balance(value: i64) -> Account {
        let mut a = Account::default();
        a.balance.value = value;
        a
    }

    #[test]
    fn boost_with_insufficient_funds_leaves_balance_alone() {
        let mut a = with_balance(3);
        let err = activate_boost(&mut a, 5).unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientFunds {
                needed: 5,
                available: 3
            }
        ));
        assert_eq!(a.balance.value, 3);
        assert!(!a.boost_active());
    }

    #[test]
    fn boost_debits_and_activates() {
        let mut a = with_balance(10);
        let entry = activate_boost(&mut a, 5).unwrap();
        assert_eq!(a.balance.value, 5);
        assert!(a.boost_active());
        assert_eq!(entry.delta, -5);
        assert_eq!(entry.balance_after, 5);
    }

    #[test]
    fn second_boost_is_refused_while_one_is_pending() {
        let mut a = with_balance(20);
        activate_boost(&mut a, 5).unwrap();
        assert!(matches!(
            activate_boost(&mut a, 5),
            Err(AppError::BoostAlreadyActive)
        ));
        assert_eq!(a.balance.value, 15);
    }

    #[test]
    fn initial_grant_is_paid_once() {
        let mut a = Account::default();
        assert!(grant_initial(&mut a, 25).is_some());
        assert!(grant_initial(&mut a, 25).is_none());
        assert_eq!(a.balance.value, 25);
    }

    #[test]
    fn purchase_credit_rounds_down() {
        let mut a = Account::default();
        let paid = Amount::parse("1.25").unwrap();
        let entry = credit_purchase(&mut a, paid, 10);
        assert_eq!(entry.delta, 12);
        assert_eq!(a.balance.value, 12);
    }
}
