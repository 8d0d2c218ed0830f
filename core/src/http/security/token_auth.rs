//! Bearer token authentication.
//!
//! The middleware only extracts the token; validating it is the job of an
//! [`Authenticator`] accepting [`Candidate::BearerToken`].
//!
//! # Spring Security Equivalent
//! `BearerTokenAuthenticationFilter`

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::dev::ServiceRequest;
use actix_web::http;
use actix_web::Error;
use async_trait::async_trait;

use crate::http::error::{AuthenticationError, SecurityInitError};
use crate::http::security::authentication::Authentication;
use crate::http::security::authenticator::{Authenticator, AuthenticatorRef};
use crate::http::security::candidate::Candidate;
use crate::http::security::extractor::SecurityExt;
use crate::http::security::feature::{downcast_feature, Feature, FeatureConfigurer, FeatureIdentifier};
use crate::http::security::handler::{authenticate_request, CompositeErrorHandler, CompositeSuccessHandler};
use crate::http::security::mapping::{Flow, MiddlewareHandler, MiddlewareTemplate};
use crate::http::security::order::{feature_order, middleware_order};
use crate::http::security::web::WebSecurity;
use crate::impl_feature;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Default)]
pub struct TokenAuthFeature;

impl TokenAuthFeature {
    pub const IDENTIFIER: FeatureIdentifier = FeatureIdentifier::new("TokenAuth", feature_order::AUTHENTICATOR);

    pub fn new() -> Self {
        TokenAuthFeature
    }
}

impl_feature!(TokenAuthFeature);

/// Extracts the token of an `Authorization: Bearer` header.
///
/// Other authorization schemes are left to their own middleware.
pub fn extract_bearer_token(req: &ServiceRequest) -> Result<Option<String>, AuthenticationError> {
    let Some(header) = req.headers().get(http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| AuthenticationError::malformed("authorization header is not ASCII"))?;
    let Some(token) = value.strip_prefix(BEARER_PREFIX) else {
        return Ok(None);
    };
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthenticationError::malformed("missing bearer token"));
    }
    Ok(Some(token.to_string()))
}

struct TokenAuthMiddleware {
    authenticator: AuthenticatorRef,
    success_handler: CompositeSuccessHandler,
    error_handler: CompositeErrorHandler,
}

#[async_trait(?Send)]
impl MiddlewareHandler for TokenAuthMiddleware {
    async fn handle(&self, req: &ServiceRequest) -> Result<Flow, Error> {
        match extract_bearer_token(req) {
            Ok(Some(token)) => Ok(authenticate_request(
                req,
                Candidate::BearerToken(token),
                &self.authenticator,
                &self.success_handler,
                &self.error_handler,
            )
            .await),
            Ok(None) => Ok(Flow::Continue),
            Err(e) => {
                req.clear_authentication();
                Ok(Flow::Respond(self.error_handler.handle(req.request(), &e)))
            }
        }
    }
}

pub struct TokenAuthConfigurer;

impl FeatureConfigurer for TokenAuthConfigurer {
    fn apply(&self, feature: &dyn Feature, ws: &mut WebSecurity) -> Result<(), SecurityInitError> {
        downcast_feature::<TokenAuthFeature>(feature)?;
        let middleware = TokenAuthMiddleware {
            authenticator: ws.authenticator_ref(),
            success_handler: ws.success_handler(),
            error_handler: ws.error_handler(),
        };
        ws.add(MiddlewareTemplate::new("token-auth", Arc::new(middleware)).order(middleware_order::TOKEN_AUTH));
        Ok(())
    }
}

/// Accepts a fixed set of tokens. Unknown tokens are rejected.
///
/// Meant for service-to-service keys and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, Authentication>,
}

impl StaticTokenAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, authentication: Authentication) -> Self {
        self.tokens.insert(token.into(), authentication);
        self
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, candidate: &Candidate) -> Result<Option<Authentication>, AuthenticationError> {
        let Candidate::BearerToken(token) = candidate else {
            return Ok(None);
        };
        self.tokens
            .get(token)
            .cloned()
            .map(Some)
            .ok_or(AuthenticationError::BadCredentials)
    }
}
