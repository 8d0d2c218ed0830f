//! actix-web route registrar.

use std::collections::HashSet;

use crate::http::error::RegistrationError;
use crate::http::security::mapping::{
    EndpointMapping, Mapping, MiddlewareMapping, RequestPreProcessorMapping, RouteRegistrar,
};
use crate::http::security::middleware::SecurityChain;

/// Collects security mappings and turns them into a [`SecurityChain`].
///
/// Registering the same mapping name twice is a no-op.
#[derive(Debug, Default)]
pub struct SecurityRegistrar {
    names: HashSet<String>,
    middlewares: Vec<MiddlewareMapping>,
    endpoints: Vec<EndpointMapping>,
    pre_processors: Vec<RequestPreProcessorMapping>,
}

impl SecurityRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Builds the chain. Middleware are sorted by ascending order; ties keep
    /// registration order.
    pub fn build(self) -> SecurityChain {
        let mut middlewares = self.middlewares;
        middlewares.sort_by_key(MiddlewareMapping::order);
        SecurityChain::new(middlewares, self.endpoints, self.pre_processors)
    }
}

impl RouteRegistrar for SecurityRegistrar {
    fn register(&mut self, mapping: Mapping) -> Result<(), RegistrationError> {
        if self.names.contains(mapping.name()) {
            log::debug!("Mapping [{}] already registered, skipped", mapping.name());
            return Ok(());
        }

        if let Mapping::Endpoint(endpoint) = &mapping {
            let conflict = self
                .endpoints
                .iter()
                .find(|e| e.method() == endpoint.method() && e.path() == endpoint.path());
            if let Some(existing) = conflict {
                return Err(RegistrationError::EndpointConflict {
                    method: endpoint.method().to_string(),
                    path: endpoint.path().to_string(),
                    existing: existing.name().to_string(),
                });
            }
        }

        self.names.insert(mapping.name().to_string());
        match mapping {
            Mapping::Middleware(m) => self.middlewares.push(m),
            Mapping::Endpoint(e) => self.endpoints.push(e),
            Mapping::PreProcessor(p) => self.pre_processors.push(p),
        }
        Ok(())
    }
}
