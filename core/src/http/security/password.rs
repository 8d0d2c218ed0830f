//! Username/password authentication against an [`AccountStore`].
//!
//! After each attempt on a known account, the outcome is passed through a
//! chain of [`PostAuthenticationProcessor`]s. They update the account's
//! bookkeeping (failed attempts, lockout) and persist it.
//!
//! # Spring Security Equivalent
//! `DaoAuthenticationProvider`

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;

use crate::http::error::AuthenticationError;
use crate::http::security::account::{Account, AccountStore, LockingRules};
use crate::http::security::authentication::Authentication;
use crate::http::security::authenticator::Authenticator;
use crate::http::security::candidate::Candidate;
use crate::http::security::crypto::PasswordEncoder;
use crate::http::security::order::{ordered_first, HIGHEST_PRECEDENCE, LOWEST_PRECEDENCE};

/// Detail key holding the authenticated account id.
pub const ACCOUNT_ID_DETAIL: &str = "account_id";

/// Outcome of one password authentication attempt.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    pub candidate: Candidate,
    pub outcome: Result<Authentication, AuthenticationError>,
}

/// Runs after a password attempt on a known account.
///
/// Processors run from the highest order value to the lowest, so
/// [`PersistAccountPostProcessor`] (highest precedence) always runs last.
#[async_trait]
pub trait PostAuthenticationProcessor: Send + Sync {
    fn order(&self) -> Option<i32> {
        None
    }

    async fn process(&self, account: &mut Account, result: &mut AuthenticationResult);
}

/// Tracks failed attempts and locks the account when the store's
/// [`LockingRules`] say so.
pub struct AccountStatusPostProcessor {
    store: Arc<dyn AccountStore>,
}

impl AccountStatusPostProcessor {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        AccountStatusPostProcessor { store }
    }
}

#[async_trait]
impl PostAuthenticationProcessor for AccountStatusPostProcessor {
    fn order(&self) -> Option<i32> {
        Some(LOWEST_PRECEDENCE)
    }

    async fn process(&self, account: &mut Account, result: &mut AuthenticationResult) {
        let now = SystemTime::now();
        match &result.outcome {
            Ok(_) => account.record_success(now),
            Err(AuthenticationError::BadCredentials) => {
                let rules = match self.store.load_locking_rules().await {
                    Ok(rules) => rules.unwrap_or_default(),
                    Err(e) => {
                        log::warn!("Unable to load locking rules, using defaults: {}", e);
                        LockingRules::default()
                    }
                };
                let limit = if rules.enabled { rules.failures_limit } else { 0 };
                if account.record_failure(now, limit) {
                    log::info!(
                        "Account {} locked after {} failed attempts",
                        account.username,
                        account.failed_attempts
                    );
                }
            }
            Err(_) => {}
        }
    }
}

/// Saves the account after the other processors ran.
pub struct PersistAccountPostProcessor {
    store: Arc<dyn AccountStore>,
}

impl PersistAccountPostProcessor {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        PersistAccountPostProcessor { store }
    }
}

#[async_trait]
impl PostAuthenticationProcessor for PersistAccountPostProcessor {
    fn order(&self) -> Option<i32> {
        Some(HIGHEST_PRECEDENCE)
    }

    async fn process(&self, account: &mut Account, _result: &mut AuthenticationResult) {
        if let Err(e) = self.store.save(account).await {
            log::warn!("Unable to persist account {}: {}", account.username, e);
        }
    }
}

/// Authenticates [`Candidate::UsernamePassword`] candidates.
///
/// Declines every other kind of candidate.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use actix_websecurity_core::http::security::account::{Account, InMemoryAccountStore};
/// use actix_websecurity_core::http::security::crypto::NoOpPasswordEncoder;
/// use actix_websecurity_core::http::security::password::PasswordAuthenticator;
///
/// let store = InMemoryAccountStore::new()
///     .with_account(Account::new("1", "admin", "admin").with_permissions(["ADMIN"]));
/// let authenticator = PasswordAuthenticator::new(Arc::new(store), Arc::new(NoOpPasswordEncoder));
/// ```
pub struct PasswordAuthenticator {
    store: Arc<dyn AccountStore>,
    encoder: Arc<dyn PasswordEncoder>,
    processors: Vec<Arc<dyn PostAuthenticationProcessor>>,
}

impl PasswordAuthenticator {
    /// Creates an authenticator with the default account status and
    /// persistence processors.
    pub fn new(store: Arc<dyn AccountStore>, encoder: Arc<dyn PasswordEncoder>) -> Self {
        let mut authenticator = PasswordAuthenticator {
            store: Arc::clone(&store),
            encoder,
            processors: Vec::new(),
        };
        authenticator.add_processor(Arc::new(AccountStatusPostProcessor::new(Arc::clone(&store))));
        authenticator.add_processor(Arc::new(PersistAccountPostProcessor::new(store)));
        authenticator
    }

    pub fn with_processor<P: PostAuthenticationProcessor + 'static>(mut self, processor: P) -> Self {
        self.add_processor(Arc::new(processor));
        self
    }

    fn add_processor(&mut self, processor: Arc<dyn PostAuthenticationProcessor>) {
        self.processors.push(processor);
        self.processors.sort_by(|l, r| ordered_first(r.order(), l.order()));
    }

    async fn check(&self, account: &mut Account, password: &str) -> Result<Authentication, AuthenticationError> {
        let now = SystemTime::now();
        if account.disabled {
            return Err(AuthenticationError::AccountDisabled);
        }

        if account.locked {
            let rules = self.load_locking_rules().await?;
            if account.is_lock_active(now, rules.lockout_duration) {
                return Err(AuthenticationError::AccountLocked);
            }
            log::debug!("Lockout of account {} expired", account.username);
            account.unlock();
        }

        if !self.encoder.matches(password, &account.password) {
            return Err(AuthenticationError::BadCredentials);
        }

        let aging = self
            .store
            .load_pwd_aging_rules()
            .await
            .map_err(|e| AuthenticationError::internal(e.to_string()))?;
        if let Some(aging) = aging.filter(|rules| rules.enabled) {
            if account.is_password_expired(now, aging.max_age) {
                return Err(AuthenticationError::CredentialsExpired);
            }
        }

        Ok(Authentication::authenticated(account.username.clone())
            .with_permissions(account.permissions.iter().cloned())
            .with_detail(ACCOUNT_ID_DETAIL, account.id.clone()))
    }

    async fn load_locking_rules(&self) -> Result<LockingRules, AuthenticationError> {
        self.store
            .load_locking_rules()
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| AuthenticationError::internal(e.to_string()))
    }

    async fn post_process(&self, account: &mut Account, result: &mut AuthenticationResult) {
        for processor in &self.processors {
            let previous = result.outcome.clone();
            processor.process(account, result).await;
            if let (Ok(before), Ok(after)) = (&previous, &result.outcome) {
                if after.state() < before.state() {
                    log::warn!(
                        "Post-authentication processor tried to downgrade {:?} to {:?}, ignored",
                        before.state(),
                        after.state()
                    );
                    result.outcome = previous;
                }
            }
        }
    }
}

#[async_trait]
impl Authenticator for PasswordAuthenticator {
    async fn authenticate(&self, candidate: &Candidate) -> Result<Option<Authentication>, AuthenticationError> {
        let Candidate::UsernamePassword { username, password } = candidate else {
            return Ok(None);
        };

        let mut account = self
            .store
            .load_account_by_username(username)
            .await
            .map_err(|e| AuthenticationError::internal(e.to_string()))?
            .ok_or(AuthenticationError::BadCredentials)?;

        let outcome = self.check(&mut account, password).await;
        if let Err(e) = &outcome {
            log::debug!("Password authentication of {} failed: {}", username, e);
        }

        let mut result = AuthenticationResult {
            candidate: candidate.clone(),
            outcome,
        };
        self.post_process(&mut account, &mut result).await;
        result.outcome.map(Some)
    }
}
