//! Initializer lifecycle tests.
//!
//! A recording registrar observes which mappings are registered, and in
//! which order.

use std::sync::{Arc, Mutex};
use std::thread;

use actix_web::dev::ServiceRequest;
use actix_web::Error;
use async_trait::async_trait;

use actix_websecurity_core::http::error::{AuthenticationError, RegistrationError, SecurityInitError};
use actix_websecurity_core::http::security::authentication::{Authentication, AuthenticationState};
use actix_websecurity_core::http::security::authenticator::{Authenticator, AuthenticatorRef, CompositeAuthenticator};
use actix_websecurity_core::http::security::candidate::Candidate;
use actix_websecurity_core::http::security::configurer::configurer_fn;
use actix_websecurity_core::http::security::feature::{
    downcast_feature, Feature, FeatureConfigurer, FeatureIdentifier,
};
use actix_websecurity_core::http::security::initializer::{Initializer, InitializerState};
use actix_websecurity_core::http::security::mapping::{
    Flow, Mapping, MiddlewareHandler, MiddlewareTemplate, RequestPreProcessor, RouteRegistrar,
};
use actix_websecurity_core::http::security::token_auth::StaticTokenAuthenticator;
use actix_websecurity_core::http::security::web::WebSecurity;

#[derive(Default)]
struct Recording {
    names: Vec<String>,
    fail_on: Option<String>,
}

impl RouteRegistrar for Recording {
    fn register(&mut self, mapping: Mapping) -> Result<(), RegistrationError> {
        if self.fail_on.as_deref() == Some(mapping.name()) {
            return Err(RegistrationError::Rejected {
                name: mapping.name().to_string(),
                reason: "test".to_string(),
            });
        }
        self.names.push(mapping.name().to_string());
        Ok(())
    }
}

struct Noop;

#[async_trait(?Send)]
impl MiddlewareHandler for Noop {
    async fn handle(&self, _: &ServiceRequest) -> Result<Flow, Error> {
        Ok(Flow::Continue)
    }
}

struct Trace;

impl RequestPreProcessor for Trace {
    fn name(&self) -> &str {
        "trace"
    }

    fn process(&self, _: &ServiceRequest) -> Result<(), Error> {
        Ok(())
    }
}

fn noop(ws: &mut WebSecurity) -> Result<(), SecurityInitError> {
    ws.add(MiddlewareTemplate::new("noop", Arc::new(Noop)));
    Ok(())
}

fn empty_global() -> Arc<dyn Authenticator> {
    Arc::new(CompositeAuthenticator::new())
}

/// Feature whose configurer adds one middleware named after `name`.
struct Custom {
    name: &'static str,
}

impl Custom {
    const IDENTIFIER: FeatureIdentifier = FeatureIdentifier::new("Custom", 10);
}

actix_websecurity_core::impl_feature!(Custom);

/// Selected by `CustomConfigurer`.
struct Extra;

impl Extra {
    const IDENTIFIER: FeatureIdentifier = FeatureIdentifier::new("Extra", 20);
}

actix_websecurity_core::impl_feature!(Extra);

struct CustomConfigurer;

impl FeatureConfigurer for CustomConfigurer {
    fn apply(&self, feature: &dyn Feature, ws: &mut WebSecurity) -> Result<(), SecurityInitError> {
        let custom = downcast_feature::<Custom>(feature)?;
        ws.add(MiddlewareTemplate::new(custom.name, Arc::new(Noop)));
        ws.with(Extra);
        Ok(())
    }
}

struct ExtraConfigurer;

impl FeatureConfigurer for ExtraConfigurer {
    fn apply(&self, feature: &dyn Feature, ws: &mut WebSecurity) -> Result<(), SecurityInitError> {
        downcast_feature::<Extra>(feature)?;
        ws.add(MiddlewareTemplate::new("extra", Arc::new(Noop)));
        Ok(())
    }
}

#[test]
fn test_ordered_configurers_register_first() {
    let mut initializer = Initializer::new(empty_global());
    initializer.register(configurer_fn(noop).with_name("unordered")).unwrap();
    initializer.register(configurer_fn(noop).with_name("ten").with_order(10)).unwrap();
    initializer.register(configurer_fn(noop).with_name("five").with_order(5)).unwrap();

    let mut registrar = Recording::default();
    initializer.initialize(&mut registrar).unwrap();
    assert_eq!(registrar.names, vec!["five/noop", "ten/noop", "unordered/noop"]);
}

#[test]
fn test_feature_registers_its_middleware_once() {
    let mut initializer = Initializer::new(empty_global());
    initializer
        .register_feature(Custom::IDENTIFIER, CustomConfigurer)
        .unwrap();
    initializer
        .register_feature(Extra::IDENTIFIER, ExtraConfigurer)
        .unwrap();
    initializer
        .register(
            configurer_fn(|ws| {
                ws.with(Custom { name: "custom" });
                Ok(())
            })
            .with_name("ws"),
        )
        .unwrap();

    let mut registrar = Recording::default();
    initializer.initialize(&mut registrar).unwrap();
    assert_eq!(registrar.names, vec!["ws/custom", "ws/extra"]);
}

#[test]
fn test_last_registered_feature_configurer_wins() {
    struct Replacement;

    impl FeatureConfigurer for Replacement {
        fn apply(&self, _: &dyn Feature, ws: &mut WebSecurity) -> Result<(), SecurityInitError> {
            ws.add(MiddlewareTemplate::new("replacement", Arc::new(Noop)));
            Ok(())
        }
    }

    let mut initializer = Initializer::new(empty_global());
    initializer
        .register_feature(Custom::IDENTIFIER, CustomConfigurer)
        .unwrap();
    initializer
        .register_feature(Custom::IDENTIFIER, Replacement)
        .unwrap();
    initializer
        .register(
            configurer_fn(|ws| {
                ws.with(Custom { name: "custom" });
                Ok(())
            })
            .with_name("ws"),
        )
        .unwrap();

    let mut registrar = Recording::default();
    initializer.initialize(&mut registrar).unwrap();
    assert_eq!(registrar.names, vec!["ws/replacement"]);
}

#[test]
fn test_initialize_twice() {
    let mut initializer = Initializer::new(empty_global());
    initializer.register(configurer_fn(noop)).unwrap();

    let mut registrar = Recording::default();
    initializer.initialize(&mut registrar).unwrap();
    assert_eq!(registrar.names.len(), 1);

    assert!(matches!(
        initializer.initialize(&mut registrar),
        Err(SecurityInitError::InitializeCalledTwice)
    ));
    assert_eq!(registrar.names.len(), 1);
    assert_eq!(initializer.state(), InitializerState::Initialized);
}

#[test]
fn test_concurrent_initialize_runs_once() {
    let mut initializer = Initializer::new(empty_global());
    initializer.register(configurer_fn(noop)).unwrap();
    let initializer = Arc::new(initializer);

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let initializer = Arc::clone(&initializer);
            thread::spawn(move || match initializer.initialize(&mut Recording::default()) {
                Ok(()) => Ok(()),
                Err(SecurityInitError::InitializeCalledTwice) => Err(()),
                Err(e) => panic!("unexpected error: {}", e),
            })
        })
        .collect();
    let results: Vec<Result<(), ()>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    assert_eq!(initializer.state(), InitializerState::Initialized);
}

#[test]
fn test_duplicate_web_security_name() {
    let mut initializer = Initializer::new(empty_global());
    initializer.register(configurer_fn(noop).with_name("api")).unwrap();
    initializer.register(configurer_fn(noop).with_name("api")).unwrap();

    let mut registrar = Recording::default();
    let err = initializer.initialize(&mut registrar).unwrap_err();
    assert!(matches!(err, SecurityInitError::DuplicateWebSecurity { ref web_security } if web_security == "api"));
    assert_eq!(registrar.names, vec!["api/noop"]);
}

#[test]
fn test_register_after_initialize() {
    let mut initializer = Initializer::new(empty_global());
    initializer.register(configurer_fn(noop)).unwrap();
    initializer.initialize(&mut Recording::default()).unwrap();

    assert!(matches!(
        initializer.register(configurer_fn(noop)),
        Err(SecurityInitError::AlreadyInitialized { .. })
    ));
    assert!(matches!(
        initializer.register_feature(Custom::IDENTIFIER, CustomConfigurer),
        Err(SecurityInitError::AlreadyInitialized { .. })
    ));
}

#[test]
fn test_unresolved_feature() {
    let mut initializer = Initializer::new(empty_global());
    initializer
        .register(configurer_fn(|ws| {
            ws.with(Custom { name: "custom" });
            Ok(())
        }))
        .unwrap();

    let err = initializer.initialize(&mut Recording::default()).unwrap_err();
    assert!(matches!(err, SecurityInitError::UnresolvedFeature { ref feature } if feature == "Custom"));
}

#[test]
fn test_configurer_without_middleware() {
    let mut initializer = Initializer::new(empty_global());
    initializer
        .register(configurer_fn(|_| Ok(())).with_name("empty"))
        .unwrap();

    let err = initializer.initialize(&mut Recording::default()).unwrap_err();
    assert!(matches!(err, SecurityInitError::NoMiddleware { ref web_security } if web_security == "empty"));
}

#[test]
fn test_failure_keeps_earlier_registrations() {
    let mut initializer = Initializer::new(empty_global());
    initializer.register(configurer_fn(noop).with_name("first").with_order(1)).unwrap();
    initializer
        .register(
            configurer_fn(|_| {
                Err(SecurityInitError::Configure {
                    configurer: "second".to_string(),
                    reason: "broken".to_string(),
                })
            })
            .with_order(2),
        )
        .unwrap();

    let mut registrar = Recording::default();
    assert!(matches!(
        initializer.initialize(&mut registrar),
        Err(SecurityInitError::Configure { .. })
    ));
    assert_eq!(registrar.names, vec!["first/noop"]);
    assert_eq!(initializer.state(), InitializerState::Initializing);

    assert!(matches!(
        initializer.initialize(&mut registrar),
        Err(SecurityInitError::InitializeCalledTwice)
    ));
    assert_eq!(registrar.names, vec!["first/noop"]);
}

#[test]
fn test_registration_error_is_surfaced() {
    let mut initializer = Initializer::new(empty_global());
    initializer.register(configurer_fn(noop).with_name("ws")).unwrap();

    let mut registrar = Recording {
        fail_on: Some("ws/noop".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        initializer.initialize(&mut registrar),
        Err(SecurityInitError::Registration { .. })
    ));
}

#[test]
fn test_pre_processors_are_merged_and_registered_last() {
    let mut initializer = Initializer::new(empty_global());
    for name in ["a", "b"] {
        initializer
            .register(
                configurer_fn(|ws| {
                    ws.add_request_pre_processor(Arc::new(Trace));
                    noop(ws)
                })
                .with_name(name),
            )
            .unwrap();
    }

    let mut registrar = Recording::default();
    initializer.initialize(&mut registrar).unwrap();
    assert_eq!(registrar.names, vec!["a/noop", "b/noop", "trace"]);
}

/// Registers a configurer that exposes the authenticator handle of its
/// `WebSecurity`, optionally with a local authenticator.
fn capture_authenticator(
    initializer: &mut Initializer,
    local: Option<StaticTokenAuthenticator>,
) -> Arc<Mutex<Option<AuthenticatorRef>>> {
    let captured = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&captured);
    initializer
        .register(configurer_fn(move |ws| {
            if let Some(local) = &local {
                ws.authenticator_mut().add(Arc::new(local.clone()));
            }
            *slot.lock().unwrap() = Some(ws.authenticator_ref());
            noop(ws)
        }))
        .unwrap();
    captured
}

fn resolved(captured: &Arc<Mutex<Option<AuthenticatorRef>>>) -> AuthenticatorRef {
    let handle = captured.lock().unwrap().clone().unwrap();
    assert!(handle.is_resolved());
    handle
}

#[actix_web::test]
async fn test_anonymous_fallback_without_concrete_authenticators() {
    let mut initializer = Initializer::new(empty_global());
    let captured = capture_authenticator(&mut initializer, None);
    initializer.initialize(&mut Recording::default()).unwrap();

    let auth = resolved(&captured)
        .authenticate(&Candidate::username_password("alice", "secret"))
        .await
        .unwrap();
    assert_eq!(auth.state(), AuthenticationState::Anonymous);
}

#[actix_web::test]
async fn test_global_authenticator_fallback() {
    let global = CompositeAuthenticator::new()
        .with(StaticTokenAuthenticator::new().with_token("global", Authentication::authenticated("svc")));
    let mut initializer = Initializer::new(Arc::new(global));
    let captured = capture_authenticator(&mut initializer, None);
    initializer.initialize(&mut Recording::default()).unwrap();

    let auth = resolved(&captured)
        .authenticate(&Candidate::bearer("global"))
        .await
        .unwrap();
    assert_eq!(auth.principal(), Some("svc"));
    assert!(auth.is_fully_authenticated());
}

#[actix_web::test]
async fn test_local_authenticator_shadows_global() {
    let global = CompositeAuthenticator::new()
        .with(StaticTokenAuthenticator::new().with_token("global", Authentication::authenticated("svc")));
    let local = StaticTokenAuthenticator::new().with_token("local", Authentication::authenticated("app"));
    let mut initializer = Initializer::new(Arc::new(global));
    let captured = capture_authenticator(&mut initializer, Some(local));
    initializer.initialize(&mut Recording::default()).unwrap();

    let handle = resolved(&captured);
    let auth = handle.authenticate(&Candidate::bearer("local")).await.unwrap();
    assert_eq!(auth.principal(), Some("app"));
    assert_eq!(
        handle.authenticate(&Candidate::bearer("global")).await,
        Err(AuthenticationError::BadCredentials)
    );
}

#[actix_web::test]
async fn test_plain_global_authenticator_is_added_as_delegate() {
    let global = StaticTokenAuthenticator::new().with_token("global", Authentication::authenticated("svc"));
    let mut initializer = Initializer::new(Arc::new(global));
    let captured = capture_authenticator(&mut initializer, None);
    initializer.initialize(&mut Recording::default()).unwrap();

    let handle = resolved(&captured);
    let auth = handle.authenticate(&Candidate::bearer("global")).await.unwrap();
    assert_eq!(auth.principal(), Some("svc"));
    assert_eq!(
        handle.authenticate(&Candidate::bearer("other")).await,
        Err(AuthenticationError::BadCredentials)
    );
}
