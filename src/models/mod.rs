pub mod account;
pub mod history;
pub mod ledger;
pub mod session;
pub mod streak;
