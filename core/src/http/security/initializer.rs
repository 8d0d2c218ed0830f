//! Security initializer.
//!
//! Collects [`Configurer`]s and [`FeatureConfigurer`]s, then builds every
//! `WebSecurity` exactly once and hands the resulting mappings to a
//! [`RouteRegistrar`].
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use actix_websecurity_core::http::security::authenticator::CompositeAuthenticator;
//! use actix_websecurity_core::http::security::basic_auth::BasicAuthFeature;
//! use actix_websecurity_core::http::security::configurer::configurer_fn;
//! use actix_websecurity_core::http::security::initializer::{Initializer, InitializerState};
//! use actix_websecurity_core::http::security::registrar::SecurityRegistrar;
//!
//! let mut initializer = Initializer::with_default_features(Arc::new(CompositeAuthenticator::new()));
//! initializer
//!     .register(configurer_fn(|ws| {
//!         ws.with(BasicAuthFeature::new());
//!         Ok(())
//!     }))
//!     .unwrap();
//!
//! let mut registrar = SecurityRegistrar::new();
//! initializer.initialize(&mut registrar).unwrap();
//! assert_eq!(initializer.state(), InitializerState::Initialized);
//! ```

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use crate::http::error::SecurityInitError;
use crate::http::security::access::{AccessControlConfigurer, AccessControlFeature};
use crate::http::security::anonymous::{AnonymousConfigurer, AnonymousFeature};
use crate::http::security::authenticator::{AnonymousAuthenticator, Authenticator};
use crate::http::security::basic_auth::{BasicAuthConfigurer, BasicAuthFeature};
use crate::http::security::configurer::Configurer;
use crate::http::security::error_handling::{ErrorHandlingConfigurer, ErrorHandlingFeature};
use crate::http::security::feature::{FeatureConfigurer, FeatureIdentifier};
use crate::http::security::logout::{LogoutConfigurer, LogoutFeature};
use crate::http::security::mapping::{Mapping, RequestPreProcessorMapping, RouteRegistrar};
use crate::http::security::order::ordered_first;
use crate::http::security::token_auth::{TokenAuthConfigurer, TokenAuthFeature};
use crate::http::security::web::WebSecurity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitializerState {
    #[default]
    Unconfigured,
    Initializing,
    Initialized,
}

pub struct Initializer {
    state: Mutex<InitializerState>,
    feature_configurers: HashMap<FeatureIdentifier, Arc<dyn FeatureConfigurer>>,
    configurers: Vec<Arc<dyn Configurer>>,
    global_authenticator: Arc<dyn Authenticator>,
    strict_features: bool,
}

impl Initializer {
    /// Creates an initializer without any feature configurer.
    ///
    /// `global_authenticator` backs every `WebSecurity` that ends up without
    /// a concrete authenticator of its own.
    pub fn new(global_authenticator: Arc<dyn Authenticator>) -> Self {
        Initializer {
            state: Mutex::new(InitializerState::Unconfigured),
            feature_configurers: HashMap::new(),
            configurers: Vec::new(),
            global_authenticator,
            strict_features: false,
        }
    }

    /// Creates an initializer with the configurers of the built-in features.
    pub fn with_default_features(global_authenticator: Arc<dyn Authenticator>) -> Self {
        let mut initializer = Self::new(global_authenticator);
        initializer
            .feature_configurers
            .insert(ErrorHandlingFeature::IDENTIFIER, Arc::new(ErrorHandlingConfigurer));
        initializer
            .feature_configurers
            .insert(BasicAuthFeature::IDENTIFIER, Arc::new(BasicAuthConfigurer));
        initializer
            .feature_configurers
            .insert(TokenAuthFeature::IDENTIFIER, Arc::new(TokenAuthConfigurer));
        initializer
            .feature_configurers
            .insert(AnonymousFeature::IDENTIFIER, Arc::new(AnonymousConfigurer));
        initializer
            .feature_configurers
            .insert(LogoutFeature::IDENTIFIER, Arc::new(LogoutConfigurer));
        initializer
            .feature_configurers
            .insert(AccessControlFeature::IDENTIFIER, Arc::new(AccessControlConfigurer));
        initializer
    }

    /// Rejects a second [`register_feature`](Self::register_feature) for the
    /// same identifier instead of replacing the first configurer.
    pub fn strict_features(mut self, strict: bool) -> Self {
        self.strict_features = strict;
        self
    }

    pub fn state(&self) -> InitializerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register<C: Configurer + 'static>(&mut self, configurer: C) -> Result<(), SecurityInitError> {
        self.register_all(vec![Arc::new(configurer)])
    }

    pub fn register_all(&mut self, configurers: Vec<Arc<dyn Configurer>>) -> Result<(), SecurityInitError> {
        self.validate_state("register security configurer")?;
        self.configurers.extend(configurers);
        Ok(())
    }

    pub fn register_feature<C: FeatureConfigurer + 'static>(
        &mut self,
        id: FeatureIdentifier,
        configurer: C,
    ) -> Result<(), SecurityInitError> {
        self.validate_state("register feature configurer")?;
        match self.feature_configurers.entry(id) {
            Entry::Occupied(_) if self.strict_features => Err(SecurityInitError::DuplicateFeature {
                feature: id.to_string(),
            }),
            Entry::Occupied(mut entry) => {
                log::debug!("Replacing FeatureConfigurer for [{}]", id);
                entry.insert(Arc::new(configurer));
                Ok(())
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(configurer));
                Ok(())
            }
        }
    }

    fn validate_state(&self, action: &'static str) -> Result<(), SecurityInitError> {
        match self.state() {
            InitializerState::Unconfigured => Ok(()),
            InitializerState::Initializing => Err(SecurityInitError::AlreadyInitializing { action }),
            InitializerState::Initialized => Err(SecurityInitError::AlreadyInitialized { action }),
        }
    }

    /// Builds every registered configurer and registers the resulting
    /// mappings.
    ///
    /// May only run once, and every `WebSecurity` name must be unique. On
    /// failure the initializer stays in [`InitializerState::Initializing`];
    /// mappings registered before the failure are not withdrawn.
    pub fn initialize(&self, registrar: &mut dyn RouteRegistrar) -> Result<(), SecurityInitError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != InitializerState::Unconfigured {
            return Err(SecurityInitError::InitializeCalledTwice);
        }
        *state = InitializerState::Initializing;

        let mut configurers = self.configurers.clone();
        configurers.sort_by(|l, r| ordered_first(l.order(), r.order()));

        let mut pre_processors: Vec<RequestPreProcessorMapping> = Vec::new();
        let mut names = HashSet::new();
        for (index, configurer) in configurers.iter().enumerate() {
            let ws = self.build(configurer.as_ref(), index)?;
            // mapping names are qualified by the WebSecurity name
            if !names.insert(ws.name().to_string()) {
                return Err(SecurityInitError::DuplicateWebSecurity {
                    web_security: ws.name().to_string(),
                });
            }
            for mapping in ws.into_mappings() {
                match mapping {
                    Mapping::PreProcessor(p) => {
                        if pre_processors.iter().all(|existing| existing.name() != p.name()) {
                            pre_processors.push(p);
                        }
                    }
                    mapping => {
                        let description = describe(&mapping);
                        registrar.register(mapping)?;
                        log::info!("Registered security {}", description);
                    }
                }
            }
        }

        for p in pre_processors {
            let name = p.name().to_string();
            registrar.register(Mapping::PreProcessor(p))?;
            log::info!("Registered request pre-processor [{}]", name);
        }

        *state = InitializerState::Initialized;
        Ok(())
    }

    fn build(&self, configurer: &dyn Configurer, index: usize) -> Result<WebSecurity, SecurityInitError> {
        let name = configurer
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("web-security-{}", index));
        let mut ws = WebSecurity::new(name);
        configurer.configure(&mut ws)?;

        // feature configurers may select further features
        loop {
            let mut features = ws.take_features();
            if features.is_empty() {
                break;
            }
            features.sort_by_key(|f| f.identifier().order());

            for feature in features {
                let id = feature.identifier();
                if ws.is_applied(id) {
                    log::debug!("Feature [{}] already applied to [{}], skipped", id, ws.name());
                    continue;
                }
                let fc = self
                    .feature_configurers
                    .get(&id)
                    .ok_or_else(|| SecurityInitError::UnresolvedFeature {
                        feature: id.to_string(),
                    })?;
                let result = fc.apply(feature.as_ref(), &mut ws);
                ws.mark_applied(id);
                result?;
            }
        }

        self.process(&mut ws)?;
        Ok(ws)
    }

    /// Authenticator fallback and sanity checks.
    fn process(&self, ws: &mut WebSecurity) -> Result<(), SecurityInitError> {
        if ws.handler_count() == 0 {
            return Err(SecurityInitError::NoMiddleware {
                web_security: ws.name().to_string(),
            });
        }

        let local_concrete = ws.authenticator().has_concrete();
        let global_concrete = self.global_authenticator.is_concrete();
        if !local_concrete && !global_concrete {
            log::debug!("No concrete authenticator for [{}], using anonymous", ws.name());
            ws.authenticator_mut().add(Arc::new(AnonymousAuthenticator));
        } else if !local_concrete {
            log::debug!("[{}] uses the global authenticator", ws.name());
            match self.global_authenticator.as_composite() {
                Some(global) => ws.authenticator_mut().merge(global),
                None => ws.authenticator_mut().add(Arc::clone(&self.global_authenticator)),
            }
        }
        Ok(())
    }
}

fn describe(mapping: &Mapping) -> String {
    match mapping {
        Mapping::Middleware(m) => format!("middleware [{}][{}]", m.order(), m.name()),
        Mapping::Endpoint(m) => format!("endpoint [{}] {} {}", m.name(), m.method(), m.path()),
        Mapping::PreProcessor(m) => format!("pre-processor [{}]", m.name()),
    }
}
