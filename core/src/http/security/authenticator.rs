//! Authenticators.
//!
//! An [`Authenticator`] turns a [`Candidate`] into an [`Authentication`].
//! Delegates are chained with [`CompositeAuthenticator`], which asks each
//! one in turn and stops at the first that claims the candidate.
//!
//! # Spring Security Equivalent
//! `AuthenticationManager` / `ProviderManager`

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;

use crate::http::error::AuthenticationError;
use crate::http::security::authentication::Authentication;
use crate::http::security::candidate::Candidate;

/// Authenticates candidates.
///
/// Returning `Ok(None)` declines the candidate so the next delegate of a
/// composite gets a chance. Returning an error ends the chain.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, candidate: &Candidate) -> Result<Option<Authentication>, AuthenticationError>;

    /// Whether this authenticator verifies real credentials.
    ///
    /// Fallbacks such as [`AnonymousAuthenticator`] return `false` so the
    /// initializer can tell whether a `WebSecurity` is actually protected.
    fn is_concrete(&self) -> bool {
        true
    }

    fn as_composite(&self) -> Option<&CompositeAuthenticator> {
        None
    }
}

/// Ordered list of delegate authenticators.
#[derive(Clone, Default)]
pub struct CompositeAuthenticator {
    delegates: Vec<Arc<dyn Authenticator>>,
}

impl CompositeAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add`](Self::add).
    pub fn with<A: Authenticator + 'static>(mut self, authenticator: A) -> Self {
        self.add(Arc::new(authenticator));
        self
    }

    pub fn add(&mut self, authenticator: Arc<dyn Authenticator>) {
        self.delegates.push(authenticator);
    }

    /// Appends every delegate of `other`, keeping their order.
    pub fn merge(&mut self, other: &CompositeAuthenticator) {
        self.delegates.extend(other.delegates.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }

    pub fn delegates(&self) -> &[Arc<dyn Authenticator>] {
        &self.delegates
    }

    /// True when at least one delegate is concrete.
    pub fn has_concrete(&self) -> bool {
        self.delegates.iter().any(|d| d.is_concrete())
    }

    /// Tries each delegate in order.
    ///
    /// Stops at the first delegate that returns an authentication or an
    /// error. Fails with [`AuthenticationError::NoAuthenticator`] when every
    /// delegate declines, including when there are none.
    pub async fn authenticate(&self, candidate: &Candidate) -> Result<Authentication, AuthenticationError> {
        for delegate in &self.delegates {
            if let Some(authentication) = delegate.authenticate(candidate).await? {
                return Ok(authentication);
            }
        }
        log::debug!("No authenticator accepted {} candidate", candidate.kind());
        Err(AuthenticationError::NoAuthenticator)
    }
}

#[async_trait]
impl Authenticator for CompositeAuthenticator {
    async fn authenticate(&self, candidate: &Candidate) -> Result<Option<Authentication>, AuthenticationError> {
        match CompositeAuthenticator::authenticate(self, candidate).await {
            Ok(authentication) => Ok(Some(authentication)),
            Err(AuthenticationError::NoAuthenticator) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn is_concrete(&self) -> bool {
        self.has_concrete()
    }

    fn as_composite(&self) -> Option<&CompositeAuthenticator> {
        Some(self)
    }
}

/// Accepts every candidate as an anonymous authentication.
///
/// Installed by the initializer when a `WebSecurity` has no concrete
/// authenticator, so requests always end up with an authentication.
#[derive(Debug, Clone, Default)]
pub struct AnonymousAuthenticator;

#[async_trait]
impl Authenticator for AnonymousAuthenticator {
    async fn authenticate(&self, candidate: &Candidate) -> Result<Option<Authentication>, AuthenticationError> {
        let principal = match candidate {
            Candidate::Anonymous { principal } => principal.clone(),
            _ => None,
        };
        Ok(Some(Authentication::anonymous_as(principal)))
    }

    fn is_concrete(&self) -> bool {
        false
    }
}

/// Handle to the authenticator of a `WebSecurity`.
///
/// Middleware are built before the final authenticator of their
/// `WebSecurity` is known; the handle is resolved once initialization
/// completes the authenticator.
#[derive(Clone, Default)]
pub struct AuthenticatorRef {
    inner: Arc<OnceLock<Arc<CompositeAuthenticator>>>,
}

impl AuthenticatorRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that is already resolved.
    pub fn resolved(authenticator: CompositeAuthenticator) -> Self {
        let handle = Self::new();
        handle.resolve(authenticator);
        handle
    }

    /// Sets the authenticator. Only the first call has an effect.
    pub(crate) fn resolve(&self, authenticator: CompositeAuthenticator) -> bool {
        self.inner.set(Arc::new(authenticator)).is_ok()
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.get().is_some()
    }

    pub fn get(&self) -> Option<Arc<CompositeAuthenticator>> {
        self.inner.get().cloned()
    }

    pub async fn authenticate(&self, candidate: &Candidate) -> Result<Authentication, AuthenticationError> {
        let authenticator = self.get().ok_or(AuthenticationError::Uninitialized)?;
        authenticator.authenticate(candidate).await
    }
}
