//! Authentication result model.
//!
//! # Spring Security Equivalent
//! `org.springframework.security.core.Authentication`

use std::collections::{HashMap, HashSet};
use std::fmt;

/// How far authentication has progressed.
///
/// Totally ordered: `Anonymous < PrincipalKnown < Authenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AuthenticationState {
    #[default]
    Anonymous,
    /// Identity is known (e.g. remembered) but credentials were not verified.
    PrincipalKnown,
    Authenticated,
}

/// Set of granted permissions. Only presence matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions(HashSet<String>);

impl Permissions {
    pub fn new() -> Self {
        Permissions(HashSet::new())
    }

    pub fn has(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn insert(&mut self, permission: impl Into<String>) -> bool {
        self.0.insert(permission.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Permissions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Permissions(iter.into_iter().map(Into::into).collect())
    }
}

/// The resolved identity of a request.
///
/// Stored in the request extensions by the authentication middleware and
/// available to handlers through
/// [`CurrentAuthentication`](crate::http::security::extractor::CurrentAuthentication).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authentication {
    principal: Option<String>,
    permissions: Permissions,
    state: AuthenticationState,
    details: HashMap<String, String>,
}

impl Authentication {
    pub fn anonymous() -> Self {
        Authentication {
            principal: None,
            permissions: Permissions::new(),
            state: AuthenticationState::Anonymous,
            details: HashMap::new(),
        }
    }

    /// An anonymous authentication with a display principal, e.g. `"anonymousUser"`.
    pub fn anonymous_as(principal: Option<String>) -> Self {
        Authentication {
            principal,
            ..Self::anonymous()
        }
    }

    pub fn principal_known(principal: impl Into<String>) -> Self {
        Authentication {
            principal: Some(principal.into()),
            state: AuthenticationState::PrincipalKnown,
            ..Self::anonymous()
        }
    }

    pub fn authenticated(principal: impl Into<String>) -> Self {
        Authentication {
            principal: Some(principal.into()),
            state: AuthenticationState::Authenticated,
            ..Self::anonymous()
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for permission in permissions {
            self.permissions.insert(permission);
        }
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    pub fn state(&self) -> AuthenticationState {
        self.state
    }

    pub fn details(&self) -> &HashMap<String, String> {
        &self.details
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }

    pub fn is_fully_authenticated(&self) -> bool {
        self.state >= AuthenticationState::Authenticated
    }

    /// Raises the state. Never lowers it; returns whether the state changed.
    pub fn elevate(&mut self, state: AuthenticationState) -> bool {
        if state > self.state {
            self.state = state;
            true
        } else {
            false
        }
    }
}

impl Default for Authentication {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl fmt::Display for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Authentication {{ principal: {}, state: {:?}, permissions: {} }}",
            self.principal.as_deref().unwrap_or("<none>"),
            self.state,
            self.permissions.len()
        )
    }
}

/// Returns true when `auth` holds every permission in `permissions`.
pub fn has_permissions(auth: &Authentication, permissions: &[&str]) -> bool {
    permissions.iter().all(|p| auth.permissions().has(p))
}

/// True when moving from `from` to `to` completes an authentication.
pub fn is_being_authenticated(from: Option<&Authentication>, to: Option<&Authentication>) -> bool {
    let from_unauthenticated = from.map_or(true, |a| a.state() < AuthenticationState::Authenticated);
    let to_authenticated = to.is_some_and(|a| a.state() > AuthenticationState::PrincipalKnown);
    from_unauthenticated && to_authenticated
}

/// True when moving from `from` to `to` drops an authentication.
pub fn is_being_unauthenticated(from: Option<&Authentication>, to: Option<&Authentication>) -> bool {
    let from_authenticated = from.is_some_and(|a| a.state() > AuthenticationState::Anonymous);
    let to_unauthenticated = to.map_or(true, |a| a.state() <= AuthenticationState::Anonymous);
    from_authenticated && to_unauthenticated
}
