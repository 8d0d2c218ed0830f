//! Logout support.
//!
//! # Spring Security Equivalent
//! `HttpSecurity.logout()` / `LogoutFilter`

use std::sync::Arc;

use actix_web::http::{header, Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use async_trait::async_trait;
use derive_more::{Display, Error};

use crate::http::error::SecurityInitError;
use crate::http::security::authentication::Authentication;
use crate::http::security::extractor::SecurityExt;
use crate::http::security::feature::{downcast_feature, Feature, FeatureConfigurer, FeatureIdentifier};
use crate::http::security::handler::CompositeSuccessHandler;
use crate::http::security::mapping::{EndpointHandler, EndpointTemplate};
use crate::http::security::order::feature_order;
use crate::http::security::properties::LogoutProperties;
use crate::http::security::web::WebSecurity;
use crate::impl_feature;

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum LogoutError {
    /// A handler vetoed the logout.
    #[display("logout rejected: {reason}")]
    Rejected { reason: String },

    #[display("logout failed: {reason}")]
    Failed { reason: String },
}

impl ResponseError for LogoutError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

/// Performs one logout action, e.g. clearing the authentication or revoking
/// a token.
pub trait LogoutHandler: Send + Sync {
    /// Called for every handler before any logout action runs. An error
    /// cancels the logout.
    fn should_logout(&self, _req: &HttpRequest, _auth: &Authentication) -> Result<(), LogoutError> {
        Ok(())
    }

    fn handle_logout(&self, req: &HttpRequest, auth: &Authentication) -> Result<(), LogoutError>;
}

/// Clears the request authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLogoutHandler;

impl LogoutHandler for DefaultLogoutHandler {
    fn handle_logout(&self, req: &HttpRequest, _auth: &Authentication) -> Result<(), LogoutError> {
        req.clear_authentication();
        Ok(())
    }
}

#[derive(Clone)]
pub struct LogoutFeature {
    logout_url: String,
    success_url: String,
    error_url: Option<String>,
    handlers: Vec<Arc<dyn LogoutHandler>>,
}

impl LogoutFeature {
    pub const IDENTIFIER: FeatureIdentifier = FeatureIdentifier::new("Logout", feature_order::LOGOUT);

    pub fn new() -> Self {
        LogoutFeature {
            logout_url: "/logout".to_string(),
            success_url: "/login".to_string(),
            error_url: None,
            handlers: vec![Arc::new(DefaultLogoutHandler)],
        }
    }

    pub fn from_properties(properties: &LogoutProperties) -> Self {
        LogoutFeature {
            logout_url: properties.logout_url.clone(),
            success_url: properties.success_url.clone(),
            error_url: properties.error_url.clone(),
            ..Self::new()
        }
    }

    pub fn logout_url(mut self, url: &str) -> Self {
        self.logout_url = url.to_string();
        self
    }

    pub fn success_url(mut self, url: &str) -> Self {
        self.success_url = url.to_string();
        self
    }

    /// Where to redirect when a handler fails. Without it the error is
    /// answered with `400 Bad Request`.
    pub fn error_url(mut self, url: &str) -> Self {
        self.error_url = Some(url.to_string());
        self
    }

    /// Replaces every logout handler, including the default one.
    pub fn logout_handlers(mut self, handlers: Vec<Arc<dyn LogoutHandler>>) -> Self {
        self.handlers = handlers;
        self
    }

    /// Adds a handler that runs before the existing ones.
    pub fn add_logout_handler(mut self, handler: Arc<dyn LogoutHandler>) -> Self {
        self.handlers.insert(0, handler);
        self
    }
}

impl Default for LogoutFeature {
    fn default() -> Self {
        Self::new()
    }
}

impl_feature!(LogoutFeature);

struct LogoutEndpoint {
    success_url: String,
    error_url: Option<String>,
    handlers: Vec<Arc<dyn LogoutHandler>>,
    success_handler: CompositeSuccessHandler,
}

impl LogoutEndpoint {
    fn logout(&self, req: &HttpRequest, auth: &Authentication) -> Result<(), LogoutError> {
        for handler in &self.handlers {
            handler.should_logout(req, auth)?;
        }
        for handler in &self.handlers {
            handler.handle_logout(req, auth)?;
        }
        Ok(())
    }
}

fn redirect(url: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, url))
        .finish()
}

#[async_trait(?Send)]
impl EndpointHandler for LogoutEndpoint {
    async fn handle(&self, req: &HttpRequest) -> HttpResponse {
        let before = req.find_authentication();
        let auth = before.clone().unwrap_or_default();

        if let Err(e) = self.logout(req, &auth) {
            log::info!("Logout of {:?} failed: {}", auth.principal(), e);
            return match &self.error_url {
                Some(url) => redirect(url),
                None => e.error_response(),
            };
        }

        req.clear_authentication();
        self.success_handler.handle(req, before.as_ref(), None);
        redirect(&self.success_url)
    }
}

pub struct LogoutConfigurer;

impl FeatureConfigurer for LogoutConfigurer {
    fn apply(&self, feature: &dyn Feature, ws: &mut WebSecurity) -> Result<(), SecurityInitError> {
        let feature = downcast_feature::<LogoutFeature>(feature)?;
        if !feature.logout_url.starts_with('/') {
            return Err(SecurityInitError::invalid_feature(
                LogoutFeature::IDENTIFIER,
                format!("logout url must start with '/': {:?}", feature.logout_url),
            ));
        }

        let endpoint: Arc<dyn EndpointHandler> = Arc::new(LogoutEndpoint {
            success_url: feature.success_url.clone(),
            error_url: feature.error_url.clone(),
            handlers: feature.handlers.clone(),
            success_handler: ws.success_handler(),
        });
        for method in [Method::GET, Method::POST] {
            ws.add_endpoint(EndpointTemplate::new(
                format!("logout/{}", method),
                method,
                feature.logout_url.clone(),
                Arc::clone(&endpoint),
            ));
        }
        Ok(())
    }
}
