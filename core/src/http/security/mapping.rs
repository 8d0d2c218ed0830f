//! Security mappings.
//!
//! A `WebSecurity` is compiled into [`Mapping`]s, which the initializer hands
//! to a [`RouteRegistrar`]:
//!
//! - [`MiddlewareMapping`]: a handler run for every request whose route and
//!   condition match, ordered by precedence
//! - [`EndpointMapping`]: a handler bound to one method and path
//!   (e.g. `POST /logout`)
//! - [`RequestPreProcessorMapping`]: a hook run once per request before any
//!   middleware
//!
//! Features describe middleware and endpoints with templates; the final
//! route and condition are only known once the owning `WebSecurity` is
//! compiled.

use std::fmt;
use std::sync::Arc;

use actix_web::dev::ServiceRequest;
use actix_web::http::Method;
use actix_web::{Error, HttpRequest, HttpResponse};
use async_trait::async_trait;

use crate::http::error::{MatchError, RegistrationError};
use crate::http::security::matcher::{self, MatcherRef};
use crate::http::security::order::middleware_order;
use crate::http::security::route::Route;

/// What a middleware handler decided.
pub enum Flow {
    /// Pass the request on to the next middleware.
    Continue,
    /// Short-circuit with this response.
    Respond(HttpResponse),
}

impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Continue => f.write_str("Continue"),
            Flow::Respond(resp) => write!(f, "Respond({})", resp.status()),
        }
    }
}

#[async_trait(?Send)]
pub trait MiddlewareHandler: Send + Sync {
    async fn handle(&self, req: &ServiceRequest) -> Result<Flow, Error>;
}

#[async_trait(?Send)]
pub trait EndpointHandler: Send + Sync {
    async fn handle(&self, req: &HttpRequest) -> HttpResponse;
}

/// Hook run on every request before the security middleware.
pub trait RequestPreProcessor: Send + Sync {
    /// Unique name; only the first pre-processor of a name is kept.
    fn name(&self) -> &str;

    fn process(&self, req: &ServiceRequest) -> Result<(), Error>;
}

/// Middleware as declared by a feature.
#[derive(Clone)]
pub struct MiddlewareTemplate {
    name: String,
    order: i32,
    route: MatcherRef<Route>,
    condition: MatcherRef<ServiceRequest>,
    handler: Arc<dyn MiddlewareHandler>,
}

impl MiddlewareTemplate {
    pub fn new(name: impl Into<String>, handler: Arc<dyn MiddlewareHandler>) -> Self {
        MiddlewareTemplate {
            name: name.into(),
            order: middleware_order::LOWEST,
            route: matcher::any(),
            condition: matcher::any(),
            handler,
        }
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Narrows the routes this middleware applies to.
    pub fn route(mut self, route: MatcherRef<Route>) -> Self {
        self.route = route;
        self
    }

    pub fn condition(mut self, condition: MatcherRef<ServiceRequest>) -> Self {
        self.condition = condition;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_mapping(
        self,
        name: String,
        route: MatcherRef<Route>,
        condition: MatcherRef<ServiceRequest>,
    ) -> MiddlewareMapping {
        MiddlewareMapping {
            name,
            order: self.order,
            route: matcher::and(route, self.route),
            condition: matcher::and(condition, self.condition),
            handler: self.handler,
        }
    }
}

/// Endpoint as declared by a feature.
#[derive(Clone)]
pub struct EndpointTemplate {
    name: String,
    method: Method,
    path: String,
    handler: Arc<dyn EndpointHandler>,
}

impl EndpointTemplate {
    pub fn new(
        name: impl Into<String>,
        method: Method,
        path: impl Into<String>,
        handler: Arc<dyn EndpointHandler>,
    ) -> Self {
        EndpointTemplate {
            name: name.into(),
            method,
            path: path.into(),
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_mapping(self, name: String) -> EndpointMapping {
        EndpointMapping {
            name,
            method: self.method,
            path: self.path,
            handler: self.handler,
        }
    }
}

#[derive(Clone)]
pub struct MiddlewareMapping {
    name: String,
    order: i32,
    route: MatcherRef<Route>,
    condition: MatcherRef<ServiceRequest>,
    handler: Arc<dyn MiddlewareHandler>,
}

impl MiddlewareMapping {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn handler(&self) -> &Arc<dyn MiddlewareHandler> {
        &self.handler
    }

    /// Whether the middleware runs for this request. The route is checked
    /// first so the condition only sees requests on matching routes.
    pub fn applies(&self, route: &Route, req: &ServiceRequest) -> Result<bool, MatchError> {
        Ok(self.route.matches(route)? && self.condition.matches(req)?)
    }
}

impl fmt::Debug for MiddlewareMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareMapping")
            .field("name", &self.name)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct EndpointMapping {
    name: String,
    method: Method,
    path: String,
    handler: Arc<dyn EndpointHandler>,
}

impl EndpointMapping {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handler(&self) -> &Arc<dyn EndpointHandler> {
        &self.handler
    }
}

impl fmt::Debug for EndpointMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointMapping")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct RequestPreProcessorMapping {
    processor: Arc<dyn RequestPreProcessor>,
}

impl RequestPreProcessorMapping {
    pub fn new(processor: Arc<dyn RequestPreProcessor>) -> Self {
        RequestPreProcessorMapping { processor }
    }

    pub fn name(&self) -> &str {
        self.processor.name()
    }

    pub fn processor(&self) -> &Arc<dyn RequestPreProcessor> {
        &self.processor
    }
}

impl fmt::Debug for RequestPreProcessorMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RequestPreProcessorMapping")
            .field(&self.name())
            .finish()
    }
}

/// Everything the initializer registers.
#[derive(Debug, Clone)]
pub enum Mapping {
    Middleware(MiddlewareMapping),
    Endpoint(EndpointMapping),
    PreProcessor(RequestPreProcessorMapping),
}

impl Mapping {
    pub fn name(&self) -> &str {
        match self {
            Mapping::Middleware(m) => m.name(),
            Mapping::Endpoint(m) => m.name(),
            Mapping::PreProcessor(m) => m.name(),
        }
    }
}

/// Receives the mappings produced by the initializer.
pub trait RouteRegistrar {
    fn register(&mut self, mapping: Mapping) -> Result<(), RegistrationError>;
}
