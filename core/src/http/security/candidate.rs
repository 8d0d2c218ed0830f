//! Unauthenticated credential material.

use std::fmt;

/// Credentials presented for authentication.
///
/// Created per request by an authentication middleware and handed to the
/// authenticator exactly once.
#[derive(Clone, PartialEq, Eq)]
pub enum Candidate {
    UsernamePassword { username: String, password: String },
    BearerToken(String),
    /// An opaque, already-validated assertion (SAML, OIDC id token...).
    Assertion {
        issuer: Option<String>,
        subject: String,
        payload: String,
    },
    Anonymous { principal: Option<String> },
}

impl Candidate {
    pub fn username_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Candidate::UsernamePassword {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Candidate::BearerToken(token.into())
    }

    pub fn anonymous() -> Self {
        Candidate::Anonymous { principal: None }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Candidate::UsernamePassword { .. } => "username-password",
            Candidate::BearerToken(_) => "bearer-token",
            Candidate::Assertion { .. } => "assertion",
            Candidate::Anonymous { .. } => "anonymous",
        }
    }

    /// The identity the candidate claims, if it names one.
    pub fn principal(&self) -> Option<&str> {
        match self {
            Candidate::UsernamePassword { username, .. } => Some(username),
            Candidate::Assertion { subject, .. } => Some(subject),
            Candidate::Anonymous { principal } => principal.as_deref(),
            Candidate::BearerToken(_) => None,
        }
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"[redacted]")
                .finish(),
            Candidate::BearerToken(_) => f.debug_tuple("BearerToken").field(&"[redacted]").finish(),
            Candidate::Assertion { issuer, subject, .. } => f
                .debug_struct("Assertion")
                .field("issuer", issuer)
                .field("subject", subject)
                .finish_non_exhaustive(),
            Candidate::Anonymous { principal } => f
                .debug_struct("Anonymous")
                .field("principal", principal)
                .finish(),
        }
    }
}
