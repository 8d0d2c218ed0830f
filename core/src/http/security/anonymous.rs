//! Anonymous authentication.
//!
//! Gives requests that no other middleware authenticated an anonymous
//! authentication, so handlers and access rules always find one.
//!
//! # Spring Security Equivalent
//! `AnonymousAuthenticationFilter`

use std::sync::Arc;

use actix_web::dev::ServiceRequest;
use actix_web::Error;
use async_trait::async_trait;

use crate::http::error::SecurityInitError;
use crate::http::security::authentication::{Authentication, AuthenticationState};
use crate::http::security::authenticator::AuthenticatorRef;
use crate::http::security::candidate::Candidate;
use crate::http::security::extractor::SecurityExt;
use crate::http::security::feature::{downcast_feature, Feature, FeatureConfigurer, FeatureIdentifier};
use crate::http::security::mapping::{Flow, MiddlewareHandler, MiddlewareTemplate};
use crate::http::security::order::{feature_order, middleware_order};
use crate::http::security::web::WebSecurity;
use crate::impl_feature;

#[derive(Debug, Clone)]
pub struct AnonymousFeature {
    principal: String,
    permissions: Vec<String>,
}

impl AnonymousFeature {
    pub const IDENTIFIER: FeatureIdentifier = FeatureIdentifier::new("Anonymous", feature_order::ANONYMOUS);

    pub fn new() -> Self {
        AnonymousFeature {
            principal: "anonymousUser".to_string(),
            permissions: Vec::new(),
        }
    }

    pub fn principal(mut self, principal: &str) -> Self {
        self.principal = principal.to_string();
        self
    }

    /// Permissions granted to anonymous requests.
    pub fn permissions(mut self, permissions: &[&str]) -> Self {
        self.permissions = permissions.iter().map(|p| p.to_string()).collect();
        self
    }
}

impl Default for AnonymousFeature {
    fn default() -> Self {
        Self::new()
    }
}

impl_feature!(AnonymousFeature);

struct AnonymousMiddleware {
    principal: String,
    permissions: Vec<String>,
    authenticator: AuthenticatorRef,
}

impl AnonymousMiddleware {
    fn fallback(&self) -> Authentication {
        Authentication::anonymous_as(Some(self.principal.clone())).with_permissions(self.permissions.iter().cloned())
    }
}

#[async_trait(?Send)]
impl MiddlewareHandler for AnonymousMiddleware {
    async fn handle(&self, req: &ServiceRequest) -> Result<Flow, Error> {
        if req.find_authentication().is_some() {
            return Ok(Flow::Continue);
        }

        let candidate = Candidate::Anonymous {
            principal: Some(self.principal.clone()),
        };
        let authentication = match self.authenticator.authenticate(&candidate).await {
            Ok(auth) if auth.state() == AuthenticationState::Anonymous => {
                auth.with_permissions(self.permissions.iter().cloned())
            }
            Ok(auth) => auth,
            Err(e) => {
                log::debug!("Anonymous candidate not accepted ({}), using default", e);
                self.fallback()
            }
        };
        req.set_authentication(authentication);
        Ok(Flow::Continue)
    }
}

pub struct AnonymousConfigurer;

impl FeatureConfigurer for AnonymousConfigurer {
    fn apply(&self, feature: &dyn Feature, ws: &mut WebSecurity) -> Result<(), SecurityInitError> {
        let feature = downcast_feature::<AnonymousFeature>(feature)?;
        let middleware = AnonymousMiddleware {
            principal: feature.principal.clone(),
            permissions: feature.permissions.clone(),
            authenticator: ws.authenticator_ref(),
        };
        ws.add(MiddlewareTemplate::new("anonymous", Arc::new(middleware)).order(middleware_order::ANONYMOUS));
        Ok(())
    }
}
