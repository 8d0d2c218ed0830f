//! Error handling configuration.
//!
//! Installs application supplied handlers on the composites of a
//! `WebSecurity`. Applied before the authentication features, so its
//! handlers are asked before any entry point those features add.
//!
//! # Spring Security Equivalent
//! `HttpSecurity.exceptionHandling()`

use std::sync::Arc;

use crate::http::error::SecurityInitError;
use crate::http::security::feature::{downcast_feature, Feature, FeatureConfigurer, FeatureIdentifier};
use crate::http::security::handler::{AccessDeniedHandler, AuthenticationErrorHandler, AuthenticationSuccessHandler};
use crate::http::security::order::feature_order;
use crate::http::security::web::WebSecurity;
use crate::impl_feature;

#[derive(Clone, Default)]
pub struct ErrorHandlingFeature {
    success_handlers: Vec<Arc<dyn AuthenticationSuccessHandler>>,
    error_handlers: Vec<Arc<dyn AuthenticationErrorHandler>>,
    access_denied_handlers: Vec<Arc<dyn AccessDeniedHandler>>,
}

impl ErrorHandlingFeature {
    pub const IDENTIFIER: FeatureIdentifier =
        FeatureIdentifier::new("ErrorHandling", feature_order::ERROR_HANDLING);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_handler(mut self, handler: Arc<dyn AuthenticationSuccessHandler>) -> Self {
        self.success_handlers.push(handler);
        self
    }

    /// Adds an authentication entry point.
    pub fn error_handler(mut self, handler: Arc<dyn AuthenticationErrorHandler>) -> Self {
        self.error_handlers.push(handler);
        self
    }

    pub fn access_denied_handler(mut self, handler: Arc<dyn AccessDeniedHandler>) -> Self {
        self.access_denied_handlers.push(handler);
        self
    }
}

impl_feature!(ErrorHandlingFeature);

pub struct ErrorHandlingConfigurer;

impl FeatureConfigurer for ErrorHandlingConfigurer {
    fn apply(&self, feature: &dyn Feature, ws: &mut WebSecurity) -> Result<(), SecurityInitError> {
        let feature = downcast_feature::<ErrorHandlingFeature>(feature)?;

        let success = ws.success_handler();
        feature.success_handlers.iter().for_each(|h| success.add(Arc::clone(h)));
        let error = ws.error_handler();
        feature.error_handlers.iter().for_each(|h| error.add(Arc::clone(h)));
        let denied = ws.access_denied_handler();
        feature
            .access_denied_handlers
            .iter()
            .for_each(|h| denied.add(Arc::clone(h)));

        log::debug!(
            "Installed {} success, {} error and {} access denied handlers on [{}]",
            feature.success_handlers.len(),
            feature.error_handlers.len(),
            feature.access_denied_handlers.len(),
            ws.name()
        );
        Ok(())
    }
}
