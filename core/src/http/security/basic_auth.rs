//! HTTP Basic Authentication support.
//!
//! # Spring Security Equivalent
//! `org.springframework.security.web.authentication.www.BasicAuthenticationFilter`

use std::sync::Arc;

use actix_web::dev::ServiceRequest;
use actix_web::http;
use actix_web::Error;
use async_trait::async_trait;
use base64::prelude::*;

use crate::http::error::{AuthenticationError, SecurityInitError};
use crate::http::security::authenticator::AuthenticatorRef;
use crate::http::security::candidate::Candidate;
use crate::http::security::extractor::SecurityExt;
use crate::http::security::feature::{downcast_feature, Feature, FeatureConfigurer, FeatureIdentifier};
use crate::http::security::handler::{
    authenticate_request, BasicAuthEntryPoint, CompositeErrorHandler, CompositeSuccessHandler,
};
use crate::http::security::mapping::{Flow, MiddlewareHandler, MiddlewareTemplate};
use crate::http::security::order::{feature_order, middleware_order};
use crate::http::security::properties::BasicAuthProperties;
use crate::http::security::web::WebSecurity;
use crate::impl_feature;

/// HTTP Basic Authentication feature.
///
/// # Spring Security Equivalent
/// `HttpSecurity.httpBasic()`
#[derive(Debug, Clone)]
pub struct BasicAuthFeature {
    realm: String,
    entry_point: bool,
}

impl BasicAuthFeature {
    pub const IDENTIFIER: FeatureIdentifier = FeatureIdentifier::new("BasicAuth", feature_order::AUTHENTICATOR);

    /// Creates the feature with the default realm "Restricted".
    pub fn new() -> Self {
        BasicAuthFeature {
            realm: "Restricted".to_string(),
            entry_point: true,
        }
    }

    pub fn from_properties(properties: &BasicAuthProperties) -> Self {
        BasicAuthFeature {
            realm: properties.realm.clone(),
            entry_point: properties.entry_point,
        }
    }

    /// Sets the realm name for the WWW-Authenticate header.
    pub fn realm(mut self, realm: &str) -> Self {
        self.realm = realm.to_string();
        self
    }

    /// Whether unauthenticated requests are challenged with
    /// `WWW-Authenticate: Basic`.
    pub fn entry_point(mut self, enabled: bool) -> Self {
        self.entry_point = enabled;
        self
    }

    pub fn www_authenticate_header(&self) -> String {
        format!("Basic realm=\"{}\"", self.realm)
    }
}

impl Default for BasicAuthFeature {
    fn default() -> Self {
        Self::new()
    }
}

impl_feature!(BasicAuthFeature);

/// Extracts credentials from the `Authorization: Basic` header.
///
/// Returns `Ok(None)` when the request carries no Basic credentials.
pub fn extract_basic_auth(req: &ServiceRequest) -> Result<Option<Candidate>, AuthenticationError> {
    let Some(auth_header) = req.headers().get(http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthenticationError::malformed("authorization header is not ASCII"))?;

    let Some(credentials) = auth_str.strip_prefix("Basic ") else {
        return Ok(None);
    };

    let decoded = BASE64_STANDARD
        .decode(credentials.trim())
        .map_err(|e| AuthenticationError::malformed(format!("invalid basic credentials: {}", e)))?;
    let decoded_str = String::from_utf8(decoded)
        .map_err(|_| AuthenticationError::malformed("basic credentials are not UTF-8"))?;

    let (username, password) = decoded_str
        .split_once(':')
        .ok_or_else(|| AuthenticationError::malformed("basic credentials lack ':' separator"))?;

    Ok(Some(Candidate::username_password(username, password)))
}

struct BasicAuthMiddleware {
    authenticator: AuthenticatorRef,
    success_handler: CompositeSuccessHandler,
    error_handler: CompositeErrorHandler,
}

#[async_trait(?Send)]
impl MiddlewareHandler for BasicAuthMiddleware {
    async fn handle(&self, req: &ServiceRequest) -> Result<Flow, Error> {
        let candidate = match extract_basic_auth(req) {
            Ok(Some(candidate)) => candidate,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                req.clear_authentication();
                return Ok(Flow::Respond(self.error_handler.handle(req.request(), &e)));
            }
        };

        // skip re-authentication of the same user
        let current = req.find_authentication();
        if current.as_ref().is_some_and(|auth| {
            auth.is_fully_authenticated() && auth.principal() == candidate.principal()
        }) {
            return Ok(Flow::Continue);
        }

        Ok(authenticate_request(
            req,
            candidate,
            &self.authenticator,
            &self.success_handler,
            &self.error_handler,
        )
        .await)
    }
}

pub struct BasicAuthConfigurer;

impl FeatureConfigurer for BasicAuthConfigurer {
    fn apply(&self, feature: &dyn Feature, ws: &mut WebSecurity) -> Result<(), SecurityInitError> {
        let feature = downcast_feature::<BasicAuthFeature>(feature)?;
        if feature.realm.is_empty() {
            return Err(SecurityInitError::invalid_feature(
                BasicAuthFeature::IDENTIFIER,
                "realm must not be empty",
            ));
        }

        if feature.entry_point {
            ws.error_handler()
                .add(Arc::new(BasicAuthEntryPoint::new(feature.realm.clone())));
        }

        let middleware = BasicAuthMiddleware {
            authenticator: ws.authenticator_ref(),
            success_handler: ws.success_handler(),
            error_handler: ws.error_handler(),
        };
        ws.add(MiddlewareTemplate::new("basic-auth", Arc::new(middleware)).order(middleware_order::BASIC_AUTH));
        Ok(())
    }
}
