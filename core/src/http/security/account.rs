//! User accounts and account storage.
//!
//! Accounts carry the state used by password authentication: the encoded
//! password, granted permissions, lock status and login bookkeeping.
//!
//! # Spring Security Equivalent
//! `UserDetails` / `UserDetailsService`

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use derive_more::{Display, Error};
use tokio::sync::RwLock;

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub username: String,
    /// Encoded password.
    pub password: String,
    pub permissions: Vec<String>,
    pub disabled: bool,
    pub locked: bool,
    pub lock_time: Option<SystemTime>,
    pub failed_attempts: u32,
    pub last_login: Option<SystemTime>,
    pub password_changed_at: Option<SystemTime>,
}

impl Account {
    pub fn new(id: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Account {
            id: id.into(),
            username: username.into(),
            password: password.into(),
            permissions: Vec::new(),
            disabled: false,
            locked: false,
            lock_time: None,
            failed_attempts: 0,
            last_login: None,
            password_changed_at: None,
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn password_changed_at(mut self, at: SystemTime) -> Self {
        self.password_changed_at = Some(at);
        self
    }

    pub fn record_success(&mut self, now: SystemTime) {
        self.failed_attempts = 0;
        self.last_login = Some(now);
    }

    /// Counts a failed attempt and locks the account once `limit` is reached.
    /// Returns true when this failure locked the account.
    pub fn record_failure(&mut self, now: SystemTime, limit: u32) -> bool {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        if !self.locked && limit > 0 && self.failed_attempts >= limit {
            self.locked = true;
            self.lock_time = Some(now);
            return true;
        }
        false
    }

    pub fn reset_failed_attempts(&mut self) {
        self.failed_attempts = 0;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
        self.lock_time = None;
        self.failed_attempts = 0;
    }

    /// True when the account is locked and the lockout has not run out yet.
    pub fn is_lock_active(&self, now: SystemTime, lockout_duration: Option<Duration>) -> bool {
        if !self.locked {
            return false;
        }
        match (self.lock_time, lockout_duration) {
            (Some(locked_at), Some(duration)) => now
                .duration_since(locked_at)
                .map_or(true, |elapsed| elapsed < duration),
            // no duration means the lock must be lifted manually
            _ => true,
        }
    }

    pub fn is_password_expired(&self, now: SystemTime, max_age: Duration) -> bool {
        match self.password_changed_at {
            Some(changed) => now
                .duration_since(changed)
                .is_ok_and(|age| age > max_age),
            None => false,
        }
    }
}

/// Brute-force protection rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockingRules {
    pub enabled: bool,
    pub failures_limit: u32,
    /// `None` keeps accounts locked until unlocked explicitly.
    pub lockout_duration: Option<Duration>,
}

impl Default for LockingRules {
    fn default() -> Self {
        LockingRules {
            enabled: true,
            failures_limit: 5,
            lockout_duration: Some(Duration::from_secs(15 * 60)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordAgingRules {
    pub enabled: bool,
    pub max_age: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum AccountStoreError {
    #[display("account storage failure: {reason}")]
    Storage { reason: String },
}

/// Loads and stores accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn load_account_by_username(&self, username: &str) -> Result<Option<Account>, AccountStoreError>;

    async fn load_account_by_id(&self, id: &str) -> Result<Option<Account>, AccountStoreError>;

    async fn save(&self, account: &Account) -> Result<(), AccountStoreError>;

    async fn load_locking_rules(&self) -> Result<Option<LockingRules>, AccountStoreError> {
        Ok(None)
    }

    async fn load_pwd_aging_rules(&self) -> Result<Option<PasswordAgingRules>, AccountStoreError> {
        Ok(None)
    }
}

/// Account store backed by a map, keyed by username.
#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    locking_rules: Option<LockingRules>,
    pwd_aging_rules: Option<PasswordAgingRules>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account. Must be called before the store is shared.
    pub fn with_account(self, account: Account) -> Self {
        match self.accounts.try_write() {
            Ok(mut accounts) => {
                if accounts.contains_key(&account.username) {
                    log::warn!("Account {} already exists, replacing it", account.username);
                }
                accounts.insert(account.username.clone(), account);
            }
            Err(_) => log::warn!("Account store is busy, account {} not added", account.username),
        }
        self
    }

    pub fn locking_rules(mut self, rules: LockingRules) -> Self {
        self.locking_rules = Some(rules);
        self
    }

    pub fn pwd_aging_rules(mut self, rules: PasswordAgingRules) -> Self {
        self.pwd_aging_rules = Some(rules);
        self
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn load_account_by_username(&self, username: &str) -> Result<Option<Account>, AccountStoreError> {
        Ok(self.accounts.read().await.get(username).cloned())
    }

    async fn load_account_by_id(&self, id: &str) -> Result<Option<Account>, AccountStoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|account| account.id == id)
            .cloned())
    }

    async fn save(&self, account: &Account) -> Result<(), AccountStoreError> {
        self.accounts
            .write()
            .await
            .insert(account.username.clone(), account.clone());
        Ok(())
    }

    async fn load_locking_rules(&self) -> Result<Option<LockingRules>, AccountStoreError> {
        Ok(self.locking_rules.clone())
    }

    async fn load_pwd_aging_rules(&self) -> Result<Option<PasswordAgingRules>, AccountStoreError> {
        Ok(self.pwd_aging_rules.clone())
    }
}
