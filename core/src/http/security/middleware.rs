//! Security middleware for Actix Web.
//!
//! # Spring Equivalent
//! `SecurityFilterChain` / `FilterChainProxy`

use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{web, Error, HttpRequest};
use futures_util::future::{ok, LocalBoxFuture, Ready};

use crate::http::security::mapping::{
    EndpointMapping, Flow, MiddlewareMapping, RequestPreProcessorMapping,
};
use crate::http::security::route::Route;

/// The compiled security chain.
///
/// Wrap the app with it to run the security middleware, and pass
/// [`configure`](SecurityChain::configure) to `App::configure` to mount the
/// security endpoints.
///
/// # Example
/// ```ignore
/// let chain = registrar.build();
/// HttpServer::new(move || {
///     App::new()
///         .wrap(chain.clone())
///         .configure(|cfg| chain.configure(cfg))
/// })
/// ```
#[derive(Debug, Clone)]
pub struct SecurityChain {
    middlewares: Arc<[MiddlewareMapping]>,
    endpoints: Arc<[EndpointMapping]>,
    pre_processors: Arc<[RequestPreProcessorMapping]>,
}

impl SecurityChain {
    pub(crate) fn new(
        middlewares: Vec<MiddlewareMapping>,
        endpoints: Vec<EndpointMapping>,
        pre_processors: Vec<RequestPreProcessorMapping>,
    ) -> Self {
        SecurityChain {
            middlewares: middlewares.into(),
            endpoints: endpoints.into(),
            pre_processors: pre_processors.into(),
        }
    }

    pub fn middlewares(&self) -> &[MiddlewareMapping] {
        &self.middlewares
    }

    pub fn endpoints(&self) -> &[EndpointMapping] {
        &self.endpoints
    }

    pub fn pre_processors(&self) -> &[RequestPreProcessorMapping] {
        &self.pre_processors
    }

    /// Mounts the security endpoints.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        for endpoint in self.endpoints.iter() {
            let handler = Arc::clone(endpoint.handler());
            cfg.route(
                endpoint.path(),
                web::method(endpoint.method().clone()).to(move |req: HttpRequest| {
                    let handler = Arc::clone(&handler);
                    async move { handler.handle(&req).await }
                }),
            );
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityChain
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SecurityService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SecurityService {
            chain: self.clone(),
            service: Rc::new(service),
        })
    }
}

/// Security middleware service.
///
/// # Spring Equivalent
/// `FilterChainProxy`
pub struct SecurityService<S> {
    chain: SecurityChain,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SecurityService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let chain = self.chain.clone();

        Box::pin(async move {
            for pre_processor in chain.pre_processors.iter() {
                pre_processor.processor().process(&req)?;
            }

            let route = Route::from_request(&req);
            for mapping in chain.middlewares.iter() {
                match mapping.applies(&route, &req) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        log::warn!("Security middleware [{}] skipped: {}", mapping.name(), e);
                        continue;
                    }
                }

                let flow = mapping.handler().handle(&req).await?;
                if let Flow::Respond(resp) = flow {
                    return Ok(req.into_response(resp).map_into_right_body());
                }
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
