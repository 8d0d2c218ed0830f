//! Authentication outcome handlers.
//!
//! Every `WebSecurity` owns one composite of each kind. Features add their
//! handlers to the composite while the `WebSecurity` is configured; the
//! composites are cheap handles that middleware keep and call per request.
//!
//! # Spring Security Equivalent
//! `AuthenticationSuccessHandler`, `AuthenticationEntryPoint`,
//! `AccessDeniedHandler`

use std::sync::{Arc, PoisonError, RwLock};

use actix_web::dev::ServiceRequest;
use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};

use crate::http::error::{AccessDeniedError, AuthenticationError};
use crate::http::security::authentication::Authentication;
use crate::http::security::authenticator::AuthenticatorRef;
use crate::http::security::candidate::Candidate;
use crate::http::security::extractor::SecurityExt;
use crate::http::security::mapping::Flow;

/// Notified whenever the authentication of a request changes.
pub trait AuthenticationSuccessHandler: Send + Sync {
    fn handle(&self, req: &HttpRequest, from: Option<&Authentication>, to: Option<&Authentication>);
}

/// Turns an authentication failure into a response.
///
/// Returning `None` lets the next handler try.
pub trait AuthenticationErrorHandler: Send + Sync {
    fn handle(&self, req: &HttpRequest, error: &AuthenticationError) -> Option<HttpResponse>;
}

/// Turns an authorization failure into a response.
pub trait AccessDeniedHandler: Send + Sync {
    fn handle(&self, req: &HttpRequest, error: &AccessDeniedError) -> Option<HttpResponse>;
}

macro_rules! composite_handler {
    ($name:ident, $handler:ident) => {
        #[derive(Clone, Default)]
        pub struct $name {
            delegates: Arc<RwLock<Vec<Arc<dyn $handler>>>>,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn add(&self, handler: Arc<dyn $handler>) {
                self.delegates
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(handler);
            }

            pub fn len(&self) -> usize {
                self.delegates.read().unwrap_or_else(PoisonError::into_inner).len()
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            fn snapshot(&self) -> Vec<Arc<dyn $handler>> {
                self.delegates.read().unwrap_or_else(PoisonError::into_inner).clone()
            }
        }
    };
}

composite_handler!(CompositeSuccessHandler, AuthenticationSuccessHandler);
composite_handler!(CompositeErrorHandler, AuthenticationErrorHandler);
composite_handler!(CompositeAccessDeniedHandler, AccessDeniedHandler);

impl CompositeSuccessHandler {
    /// Notifies every delegate, in registration order.
    pub fn handle(&self, req: &HttpRequest, from: Option<&Authentication>, to: Option<&Authentication>) {
        for handler in self.snapshot() {
            handler.handle(req, from, to);
        }
    }
}

impl CompositeErrorHandler {
    /// First delegate response wins. Falls back to the error's own response.
    pub fn handle(&self, req: &HttpRequest, error: &AuthenticationError) -> HttpResponse {
        self.snapshot()
            .iter()
            .find_map(|handler| handler.handle(req, error))
            .unwrap_or_else(|| error.error_response())
    }
}

impl CompositeAccessDeniedHandler {
    /// First delegate response wins. Falls back to the error's own response.
    pub fn handle(&self, req: &HttpRequest, error: &AccessDeniedError) -> HttpResponse {
        self.snapshot()
            .iter()
            .find_map(|handler| handler.handle(req, error))
            .unwrap_or_else(|| error.error_response())
    }
}

/// Authenticates `candidate` and records the outcome on the request.
///
/// On success the authentication is stored and the success handler is
/// notified. On failure the authentication is cleared and the error handler
/// answers.
pub(crate) async fn authenticate_request(
    req: &ServiceRequest,
    candidate: Candidate,
    authenticator: &AuthenticatorRef,
    success_handler: &CompositeSuccessHandler,
    error_handler: &CompositeErrorHandler,
) -> Flow {
    let before = req.find_authentication();
    match authenticator.authenticate(&candidate).await {
        Ok(authentication) => {
            req.set_authentication(authentication.clone());
            success_handler.handle(req.request(), before.as_ref(), Some(&authentication));
            Flow::Continue
        }
        Err(e) => {
            log::debug!("{} {}: authentication failed: {}", req.method(), req.path(), e);
            req.clear_authentication();
            Flow::Respond(error_handler.handle(req.request(), &e))
        }
    }
}

/// Challenges the client for HTTP Basic credentials.
///
/// # Spring Security Equivalent
/// `BasicAuthenticationEntryPoint`
#[derive(Debug, Clone)]
pub struct BasicAuthEntryPoint {
    realm: String,
}

impl BasicAuthEntryPoint {
    pub fn new(realm: impl Into<String>) -> Self {
        BasicAuthEntryPoint { realm: realm.into() }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }
}

impl AuthenticationErrorHandler for BasicAuthEntryPoint {
    fn handle(&self, _req: &HttpRequest, error: &AuthenticationError) -> Option<HttpResponse> {
        if error.status_code() != StatusCode::UNAUTHORIZED {
            return None;
        }
        Some(
            HttpResponse::Unauthorized()
                .insert_header((
                    header::WWW_AUTHENTICATE,
                    format!("Basic realm=\"{}\"", self.realm),
                ))
                .finish(),
        )
    }
}

/// Redirects unauthenticated requests, e.g. to a login page.
#[derive(Debug, Clone)]
pub struct RedirectErrorHandler {
    url: String,
}

impl RedirectErrorHandler {
    pub fn new(url: impl Into<String>) -> Self {
        RedirectErrorHandler { url: url.into() }
    }
}

impl AuthenticationErrorHandler for RedirectErrorHandler {
    fn handle(&self, _req: &HttpRequest, error: &AuthenticationError) -> Option<HttpResponse> {
        if error.status_code() != StatusCode::UNAUTHORIZED {
            return None;
        }
        Some(
            HttpResponse::Found()
                .insert_header((header::LOCATION, self.url.as_str()))
                .finish(),
        )
    }
}

/// Logs authentication changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSuccessHandler;

impl AuthenticationSuccessHandler for LoggingSuccessHandler {
    fn handle(&self, req: &HttpRequest, from: Option<&Authentication>, to: Option<&Authentication>) {
        log::debug!(
            "{} {}: authentication changed from {:?} to {:?}",
            req.method(),
            req.path(),
            from.and_then(Authentication::principal),
            to.and_then(Authentication::principal)
        );
    }
}
