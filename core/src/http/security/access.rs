//! Route based access control.
//!
//! # Spring Security Equivalent
//! `HttpSecurity.authorizeHttpRequests()` /
//! `RequestMatcherDelegatingAuthorizationManager`
//!
//! # Example
//! ```
//! use actix_websecurity_core::http::security::access::{Access, AccessControlFeature};
//!
//! let feature = AccessControlFeature::new()
//!     .request("/public/**", Access::PermitAll)
//!     .request("/admin/**", Access::has_permissions(&["ADMIN"]))
//!     .any_request(Access::Authenticated);
//! ```

use std::sync::Arc;

use actix_web::dev::ServiceRequest;
use actix_web::Error;
use async_trait::async_trait;

use crate::http::error::{AccessDeniedError, AuthenticationError, SecurityInitError};
use crate::http::security::authentication::Authentication;
use crate::http::security::extractor::SecurityExt;
use crate::http::security::feature::{downcast_feature, Feature, FeatureConfigurer, FeatureIdentifier};
use crate::http::security::handler::{CompositeAccessDeniedHandler, CompositeErrorHandler};
use crate::http::security::mapping::{Flow, MiddlewareHandler, MiddlewareTemplate};
use crate::http::security::matcher::{self, MatcherRef};
use crate::http::security::order::{feature_order, middleware_order};
use crate::http::security::route::{self, Route};
use crate::http::security::web::WebSecurity;
use crate::impl_feature;

/// Access requirement of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    PermitAll,
    DenyAll,
    /// Requires a fully authenticated request.
    Authenticated,
    /// Requires every listed permission.
    HasPermissions(Vec<String>),
    /// Requires at least one listed permission.
    HasAnyPermission(Vec<String>),
}

impl Access {
    pub fn has_permissions(permissions: &[&str]) -> Self {
        Access::HasPermissions(permissions.iter().map(|p| p.to_string()).collect())
    }

    pub fn has_any_permission(permissions: &[&str]) -> Self {
        Access::HasAnyPermission(permissions.iter().map(|p| p.to_string()).collect())
    }

    /// Decides on a request authentication.
    ///
    /// Permissions granted to anonymous requests count too; a request that
    /// lacks them and is not fully authenticated must authenticate first.
    pub fn check(&self, auth: &Authentication) -> Result<(), AccessError> {
        let missing: Vec<String> = match self {
            Access::PermitAll => return Ok(()),
            Access::DenyAll => return Err(AccessError::Denied(AccessDeniedError::Denied)),
            Access::Authenticated if auth.is_fully_authenticated() => return Ok(()),
            Access::Authenticated => return Err(AccessError::Unauthenticated),
            Access::HasPermissions(required) => required
                .iter()
                .filter(|p| !auth.permissions().has(p))
                .cloned()
                .collect(),
            Access::HasAnyPermission(required) => {
                if required.iter().any(|p| auth.permissions().has(p)) {
                    Vec::new()
                } else {
                    required.clone()
                }
            }
        };

        if missing.is_empty() {
            Ok(())
        } else if !auth.is_fully_authenticated() {
            Err(AccessError::Unauthenticated)
        } else {
            Err(AccessError::Denied(AccessDeniedError::MissingPermissions { missing }))
        }
    }
}

/// Why [`Access::check`] refused a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    Unauthenticated,
    Denied(AccessDeniedError),
}

#[derive(Clone)]
enum RuleTarget {
    Pattern(String),
    Matcher(MatcherRef<Route>),
}

#[derive(Clone)]
struct Rule {
    target: RuleTarget,
    access: Access,
}

/// Ordered access rules. The first rule matching a request decides;
/// requests no rule matches are let through.
#[derive(Clone, Default)]
pub struct AccessControlFeature {
    rules: Vec<Rule>,
}

impl AccessControlFeature {
    pub const IDENTIFIER: FeatureIdentifier = FeatureIdentifier::new("Access", feature_order::ACCESS);

    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule for an Ant-style path pattern.
    pub fn request(mut self, pattern: &str, access: Access) -> Self {
        self.rules.push(Rule {
            target: RuleTarget::Pattern(pattern.to_string()),
            access,
        });
        self
    }

    pub fn matcher(mut self, matcher: MatcherRef<Route>, access: Access) -> Self {
        self.rules.push(Rule {
            target: RuleTarget::Matcher(matcher),
            access,
        });
        self
    }

    pub fn any_request(self, access: Access) -> Self {
        self.matcher(matcher::any(), access)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl_feature!(AccessControlFeature);

struct AccessControlMiddleware {
    rules: Vec<(MatcherRef<Route>, Access)>,
    error_handler: CompositeErrorHandler,
    access_denied_handler: CompositeAccessDeniedHandler,
}

#[async_trait(?Send)]
impl MiddlewareHandler for AccessControlMiddleware {
    async fn handle(&self, req: &ServiceRequest) -> Result<Flow, Error> {
        let route = Route::from_request(req);
        for (matcher, access) in &self.rules {
            match matcher.matches(&route) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    log::warn!("Access rule skipped for {}: {}", req.path(), e);
                    continue;
                }
            }

            let auth = req.authentication();
            return Ok(match access.check(&auth) {
                Ok(()) => Flow::Continue,
                Err(AccessError::Unauthenticated) => Flow::Respond(
                    self.error_handler
                        .handle(req.request(), &AuthenticationError::InsufficientAuthentication),
                ),
                Err(AccessError::Denied(denied)) => {
                    log::debug!("Access to {} denied for {:?}: {}", req.path(), auth.principal(), denied);
                    Flow::Respond(self.access_denied_handler.handle(req.request(), &denied))
                }
            });
        }
        Ok(Flow::Continue)
    }
}

pub struct AccessControlConfigurer;

impl FeatureConfigurer for AccessControlConfigurer {
    fn apply(&self, feature: &dyn Feature, ws: &mut WebSecurity) -> Result<(), SecurityInitError> {
        let feature = downcast_feature::<AccessControlFeature>(feature)?;
        let rules = feature
            .rules
            .iter()
            .map(|rule| {
                let matcher = match &rule.target {
                    RuleTarget::Pattern(pattern) => route::path(pattern).map_err(|e| {
                        SecurityInitError::invalid_feature(
                            AccessControlFeature::IDENTIFIER,
                            format!("invalid pattern {}: {}", pattern, e),
                        )
                    })?,
                    RuleTarget::Matcher(matcher) => matcher.clone(),
                };
                Ok((matcher, rule.access.clone()))
            })
            .collect::<Result<Vec<_>, SecurityInitError>>()?;

        let middleware = AccessControlMiddleware {
            rules,
            error_handler: ws.error_handler(),
            access_denied_handler: ws.access_denied_handler(),
        };
        ws.add(
            MiddlewareTemplate::new("access-control", Arc::new(middleware))
                .order(middleware_order::ACCESS_CONTROL),
        );
        Ok(())
    }
}
