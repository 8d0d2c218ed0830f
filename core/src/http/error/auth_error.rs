use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use derive_more::{Display, Error};

/// Per-request authentication failure.
///
/// Returned by authenticators and surfaced to the error handlers configured
/// on a `WebSecurity`. These never affect the initializer.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum AuthenticationError {
    /// No delegate accepted the candidate.
    #[display("no authenticator available for the given credentials")]
    NoAuthenticator,

    /// The authenticator was used before security initialization finished.
    #[display("authenticator is not initialized")]
    Uninitialized,

    #[display("bad credentials")]
    BadCredentials,

    #[display("account is locked")]
    AccountLocked,

    #[display("account is disabled")]
    AccountDisabled,

    #[display("credentials have expired")]
    CredentialsExpired,

    /// The request is not (fully) authenticated but the resource requires it.
    #[display("full authentication is required to access this resource")]
    InsufficientAuthentication,

    /// Credentials were present but could not be decoded.
    #[display("malformed credentials: {reason}")]
    MalformedCredentials { reason: String },

    /// A delegate failed for reasons unrelated to the credentials
    /// (e.g. the account store is unreachable).
    #[display("authentication failed: {reason}")]
    Internal { reason: String },
}

impl AuthenticationError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        AuthenticationError::MalformedCredentials {
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        AuthenticationError::Internal {
            reason: reason.into(),
        }
    }
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthenticationError::Uninitialized | AuthenticationError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthenticationError::NoAuthenticator
            | AuthenticationError::BadCredentials
            | AuthenticationError::AccountLocked
            | AuthenticationError::AccountDisabled
            | AuthenticationError::CredentialsExpired
            | AuthenticationError::InsufficientAuthentication
            | AuthenticationError::MalformedCredentials { .. } => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), &self.to_string())
    }
}

/// Authorization failure for an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum AccessDeniedError {
    #[display("access denied")]
    Denied,

    #[display("access denied: missing permissions {missing:?}")]
    MissingPermissions { missing: Vec<String> },
}

impl ResponseError for AccessDeniedError {
    fn status_code(&self) -> StatusCode {
        StatusCode::FORBIDDEN
    }

    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), &self.to_string())
    }
}

fn json_error(status: StatusCode, message: &str) -> HttpResponse {
    let error = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"{{"error":"{}","message":"{}"}}"#,
        error,
        message.replace('"', "'")
    );

    HttpResponse::build(status)
        .content_type("application/json")
        .body(body)
}
