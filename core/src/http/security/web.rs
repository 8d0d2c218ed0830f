//! `WebSecurity` build context.
//!
//! One `WebSecurity` is created per [`Configurer`](crate::http::security::configurer::Configurer).
//! The configurer scopes it (route, condition), selects features and may add
//! raw middleware. The initializer then applies the features and compiles
//! everything into [`Mapping`]s.
//!
//! # Spring Security Equivalent
//! `HttpSecurity`
//!
//! # Example
//! ```
//! use actix_websecurity_core::http::security::basic_auth::BasicAuthFeature;
//! use actix_websecurity_core::http::security::route;
//! use actix_websecurity_core::http::security::web::WebSecurity;
//!
//! let mut ws = WebSecurity::new("api");
//! ws.route(route::path("/api/**").unwrap())
//!     .with(BasicAuthFeature::new().realm("api"));
//! assert_eq!(ws.features().len(), 1);
//! ```

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use actix_web::dev::ServiceRequest;

use crate::http::security::authenticator::{AuthenticatorRef, CompositeAuthenticator};
use crate::http::security::feature::{Feature, FeatureIdentifier};
use crate::http::security::handler::{
    CompositeAccessDeniedHandler, CompositeErrorHandler, CompositeSuccessHandler,
};
use crate::http::security::mapping::{
    EndpointTemplate, Mapping, MiddlewareTemplate, RequestPreProcessor, RequestPreProcessorMapping,
};
use crate::http::security::matcher::{self, MatcherRef};
use crate::http::security::route::Route;

/// Keys of the values every `WebSecurity` shares between its features.
pub mod shared_key {
    pub const COMPOSITE_AUTH_SUCCESS_HANDLER: &str = "CompositeAuthSuccessHandler";
    pub const COMPOSITE_AUTH_ERROR_HANDLER: &str = "CompositeAuthErrorHandler";
    pub const COMPOSITE_ACCESS_DENIED_HANDLER: &str = "CompositeAccessDeniedHandler";
    pub const REQUEST_PRE_PROCESSORS: &str = "RequestPreProcessors";
}

type SharedValue = Box<dyn Any + Send + Sync>;

pub struct WebSecurity {
    name: String,
    route: MatcherRef<Route>,
    condition: MatcherRef<ServiceRequest>,
    features: Vec<Box<dyn Feature>>,
    middlewares: Vec<MiddlewareTemplate>,
    endpoints: Vec<EndpointTemplate>,
    applied: HashSet<FeatureIdentifier>,
    shared: HashMap<&'static str, SharedValue>,
    authenticator: CompositeAuthenticator,
    authenticator_ref: AuthenticatorRef,
}

impl WebSecurity {
    pub fn new(name: impl Into<String>) -> Self {
        let mut ws = WebSecurity {
            name: name.into(),
            route: matcher::any(),
            condition: matcher::any(),
            features: Vec::new(),
            middlewares: Vec::new(),
            endpoints: Vec::new(),
            applied: HashSet::new(),
            shared: HashMap::new(),
            authenticator: CompositeAuthenticator::new(),
            authenticator_ref: AuthenticatorRef::new(),
        };
        ws.set_shared(
            shared_key::COMPOSITE_AUTH_SUCCESS_HANDLER,
            CompositeSuccessHandler::new(),
        );
        ws.set_shared(
            shared_key::COMPOSITE_AUTH_ERROR_HANDLER,
            CompositeErrorHandler::new(),
        );
        ws.set_shared(
            shared_key::COMPOSITE_ACCESS_DENIED_HANDLER,
            CompositeAccessDeniedHandler::new(),
        );
        ws
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Restricts every middleware of this `WebSecurity` to matching routes.
    pub fn route(&mut self, route: MatcherRef<Route>) -> &mut Self {
        self.route = route;
        self
    }

    /// Adds a request condition, combined with any previous one.
    pub fn and_condition(&mut self, condition: MatcherRef<ServiceRequest>) -> &mut Self {
        self.condition = matcher::and(self.condition.clone(), condition);
        self
    }

    /// Selects a feature. Selecting a feature with the same identifier again
    /// replaces the previous value and keeps its position.
    pub fn with<F: Feature>(&mut self, feature: F) -> &mut Self {
        let id = feature.identifier();
        match self.features.iter_mut().find(|f| f.identifier() == id) {
            Some(existing) => *existing = Box::new(feature),
            None => self.features.push(Box::new(feature)),
        }
        self
    }

    pub fn feature<F: Feature>(&self) -> Option<&F> {
        self.features
            .iter()
            .find_map(|f| f.as_any().downcast_ref::<F>())
    }

    /// Gives access to an already selected feature.
    pub fn feature_mut<F: Feature>(&mut self) -> Option<&mut F> {
        self.features
            .iter_mut()
            .find_map(|f| f.as_any_mut().downcast_mut::<F>())
    }

    pub fn features(&self) -> &[Box<dyn Feature>] {
        &self.features
    }

    pub fn add(&mut self, middleware: MiddlewareTemplate) -> &mut Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn add_endpoint(&mut self, endpoint: EndpointTemplate) -> &mut Self {
        self.endpoints.push(endpoint);
        self
    }

    pub fn shared<T: Any>(&self, key: &str) -> Option<&T> {
        self.shared.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn shared_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.shared.get_mut(key).and_then(|v| v.downcast_mut::<T>())
    }

    /// Stores a shared value unless the key is taken. Returns whether the
    /// value was stored.
    pub fn set_shared<T: Any + Send + Sync>(&mut self, key: &'static str, value: T) -> bool {
        if self.shared.contains_key(key) {
            log::debug!("Shared value [{}] already set on [{}], kept", key, self.name);
            return false;
        }
        self.shared.insert(key, Box::new(value));
        true
    }

    /// Stores a shared value, replacing any previous one.
    pub fn replace_shared<T: Any + Send + Sync>(&mut self, key: &'static str, value: T) {
        self.shared.insert(key, Box::new(value));
    }

    pub fn success_handler(&self) -> CompositeSuccessHandler {
        self.shared::<CompositeSuccessHandler>(shared_key::COMPOSITE_AUTH_SUCCESS_HANDLER)
            .cloned()
            .unwrap_or_default()
    }

    pub fn error_handler(&self) -> CompositeErrorHandler {
        self.shared::<CompositeErrorHandler>(shared_key::COMPOSITE_AUTH_ERROR_HANDLER)
            .cloned()
            .unwrap_or_default()
    }

    pub fn access_denied_handler(&self) -> CompositeAccessDeniedHandler {
        self.shared::<CompositeAccessDeniedHandler>(shared_key::COMPOSITE_ACCESS_DENIED_HANDLER)
            .cloned()
            .unwrap_or_default()
    }

    /// Adds a request pre-processor. The first one of a name wins.
    pub fn add_request_pre_processor(&mut self, processor: Arc<dyn RequestPreProcessor>) -> bool {
        self.set_shared(
            shared_key::REQUEST_PRE_PROCESSORS,
            Vec::<RequestPreProcessorMapping>::new(),
        );
        let Some(processors) =
            self.shared_mut::<Vec<RequestPreProcessorMapping>>(shared_key::REQUEST_PRE_PROCESSORS)
        else {
            log::warn!(
                "Shared value [{}] has an unexpected type, pre-processor [{}] ignored",
                shared_key::REQUEST_PRE_PROCESSORS,
                processor.name()
            );
            return false;
        };
        if processors.iter().any(|p| p.name() == processor.name()) {
            return false;
        }
        processors.push(RequestPreProcessorMapping::new(processor));
        true
    }

    /// The local authenticator.
    pub fn authenticator(&self) -> &CompositeAuthenticator {
        &self.authenticator
    }

    pub fn authenticator_mut(&mut self) -> &mut CompositeAuthenticator {
        &mut self.authenticator
    }

    /// Handle to the final authenticator, for middleware built now and run
    /// after initialization.
    pub fn authenticator_ref(&self) -> AuthenticatorRef {
        self.authenticator_ref.clone()
    }

    pub fn is_applied(&self, id: FeatureIdentifier) -> bool {
        self.applied.contains(&id)
    }

    pub fn applied(&self) -> impl Iterator<Item = FeatureIdentifier> + '_ {
        self.applied.iter().copied()
    }

    pub(crate) fn take_features(&mut self) -> Vec<Box<dyn Feature>> {
        std::mem::take(&mut self.features)
    }

    pub(crate) fn mark_applied(&mut self, id: FeatureIdentifier) {
        self.applied.insert(id);
    }

    /// Number of middleware and endpoints added so far.
    pub(crate) fn handler_count(&self) -> usize {
        self.middlewares.len() + self.endpoints.len()
    }

    /// Resolves the authenticator handle and compiles the mappings.
    ///
    /// Mapping names are qualified with the `WebSecurity` name. Request
    /// pre-processors keep their own names.
    pub(crate) fn into_mappings(mut self) -> Vec<Mapping> {
        self.authenticator_ref.resolve(self.authenticator.clone());

        let pre_processors = self
            .shared
            .remove(shared_key::REQUEST_PRE_PROCESSORS)
            .and_then(|v| v.downcast::<Vec<RequestPreProcessorMapping>>().ok())
            .map(|v| *v)
            .unwrap_or_default();

        let ws_name = self.name;
        let route = self.route;
        let condition = self.condition;

        let middlewares = self.middlewares.into_iter().map(|m| {
            let name = format!("{}/{}", ws_name, m.name());
            Mapping::Middleware(m.into_mapping(name, route.clone(), condition.clone()))
        });
        let endpoints = self.endpoints.into_iter().map(|e| {
            let name = format!("{}/{}", ws_name, e.name());
            Mapping::Endpoint(e.into_mapping(name))
        });

        middlewares
            .chain(endpoints)
            .chain(pre_processors.into_iter().map(Mapping::PreProcessor))
            .collect()
    }
}

impl fmt::Debug for WebSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSecurity")
            .field("name", &self.name)
            .field(
                "features",
                &self.features.iter().map(|f| f.identifier()).collect::<Vec<_>>(),
            )
            .field("middlewares", &self.middlewares.len())
            .field("endpoints", &self.endpoints.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for WebSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
