//! Storage port for the persisted client records.
//!
//! The account lives under three named keys, each holding a JSON record:
//! `streak` → `{count, lastSessionDate}`, `balance` → `{value}`,
//! `profile` → `{boostActive, walletAddress, verified, granted}`.
//! While a session runs, `running` holds `{startedAt}`.

use crate::errors::{AppError, AppResult};
use crate::models::account::{Account, Balance, Profile};
use crate::models::session::RunningSession;
use crate::models::streak::Streak;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

pub const STREAK_KEY: &str = "streak";
pub const BALANCE_KEY: &str = "balance";
pub const PROFILE_KEY: &str = "profile";
pub const RUNNING_KEY: &str = "running";

pub trait KeyValueStore {
    fn read(&self, key: &str) -> AppResult<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&mut self, key: &str) -> AppResult<()>;
}

/// In-process store, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

fn read_optional<T, S>(store: &S, key: &str) -> AppResult<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    store
        .read(key)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|source| AppError::Record {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
}

fn read_record<T, S>(store: &S, key: &str) -> AppResult<T>
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    Ok(read_optional(store, key)?.unwrap_or_default())
}

fn write_record<T, S>(store: &mut S, key: &str, record: &T) -> AppResult<()>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(record)?;
    store.write(key, &raw)
}

pub fn load_account<S: KeyValueStore + ?Sized>(store: &S) -> AppResult<Account> {
    Ok(Account {
        balance: read_record::<Balance, _>(store, BALANCE_KEY)?,
        streak: read_record::<Streak, _>(store, STREAK_KEY)?,
        profile: read_record::<Profile, _>(store, PROFILE_KEY)?,
    })
}

pub fn save_account<S: KeyValueStore + ?Sized>(store: &mut S, account: &Account) -> AppResult<()> {
    write_record(store, BALANCE_KEY, &account.balance)?;
    write_record(store, STREAK_KEY, &account.streak)?;
    write_record(store, PROFILE_KEY, &account.profile)?;
    Ok(())
}

pub fn load_running<S: KeyValueStore + ?Sized>(store: &S) -> AppResult<Option<RunningSession>> {
    read_optional(store, RUNNING_KEY)
}

pub fn save_running<S>(store: &mut S, marker: &RunningSession) -> AppResult<()>
where
    S: KeyValueStore + ?Sized,
{
    write_record(store, RUNNING_KEY, marker)
}

pub fn clear_running<S: KeyValueStore + ?Sized>(store: &mut S) -> AppResult<()> {
    store.remove(RUNNING_KEY)
}
