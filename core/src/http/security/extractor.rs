//! Access to the request's authentication from handlers.
//!
//! # Spring Equivalent
//! `@AuthenticationPrincipal` annotation / `SecurityContextHolder`

use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

use crate::http::error::AuthenticationError;
use crate::http::security::authentication::Authentication;

/// Extractor for the current authentication.
///
/// Never fails: requests nobody authenticated get an anonymous
/// authentication.
///
/// # Usage
/// ```ignore
/// async fn handler(auth: CurrentAuthentication) -> impl Responder {
///     format!("state: {:?}", auth.state())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentAuthentication(Authentication);

impl CurrentAuthentication {
    pub fn into_inner(self) -> Authentication {
        self.0
    }
}

impl Deref for CurrentAuthentication {
    type Target = Authentication;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for CurrentAuthentication {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(CurrentAuthentication(req.authentication())))
    }
}

/// Extractor for the principal of a fully authenticated request.
///
/// # Errors
/// Returns `401 Unauthorized` if the request is not fully authenticated.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    principal: String,
    authentication: Authentication,
}

impl AuthenticatedPrincipal {
    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn authentication(&self) -> &Authentication {
        &self.authentication
    }
}

impl Deref for AuthenticatedPrincipal {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.principal
    }
}

impl FromRequest for AuthenticatedPrincipal {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let authentication = req.authentication();
        let result = match authentication.principal() {
            Some(principal) if authentication.is_fully_authenticated() => Ok(AuthenticatedPrincipal {
                principal: principal.to_string(),
                authentication: authentication.clone(),
            }),
            _ => Err(AuthenticationError::InsufficientAuthentication),
        };
        ready(result)
    }
}

/// Reads and writes the authentication stored in the request extensions.
///
/// Implemented for every [`HttpMessage`], so middleware (on `ServiceRequest`)
/// and handlers (on `HttpRequest`) see the same value.
pub trait SecurityExt {
    /// The stored authentication, if any.
    fn find_authentication(&self) -> Option<Authentication>;

    /// The stored authentication, or an anonymous one.
    fn authentication(&self) -> Authentication {
        self.find_authentication().unwrap_or_default()
    }

    fn is_fully_authenticated(&self) -> bool {
        self.find_authentication()
            .is_some_and(|a| a.is_fully_authenticated())
    }

    /// Stores an authentication, returning the previous one.
    fn set_authentication(&self, authentication: Authentication) -> Option<Authentication>;

    fn clear_authentication(&self) -> Option<Authentication>;
}

impl<T: HttpMessage> SecurityExt for T {
    fn find_authentication(&self) -> Option<Authentication> {
        self.extensions().get::<Authentication>().cloned()
    }

    fn set_authentication(&self, authentication: Authentication) -> Option<Authentication> {
        self.extensions_mut().insert(authentication)
    }

    fn clear_authentication(&self) -> Option<Authentication> {
        self.extensions_mut().remove::<Authentication>()
    }
}
