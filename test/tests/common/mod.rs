//! Common test utilities and configuration.
//!
//! This module provides shared test infrastructure including:
//! - Test accounts
//! - Security chain and test app builders
//! - Helper functions

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{get, test, App, HttpResponse, Responder};
use base64::prelude::*;

use actix_websecurity_core::http::security::access::{Access, AccessControlFeature};
use actix_websecurity_core::http::security::account::{Account, InMemoryAccountStore, LockingRules};
use actix_websecurity_core::http::security::anonymous::AnonymousFeature;
use actix_websecurity_core::http::security::authenticator::CompositeAuthenticator;
use actix_websecurity_core::http::security::basic_auth::BasicAuthFeature;
use actix_websecurity_core::http::security::configurer::configurer_fn;
use actix_websecurity_core::http::security::crypto::NoOpPasswordEncoder;
use actix_websecurity_core::http::security::extractor::{AuthenticatedPrincipal, CurrentAuthentication};
use actix_websecurity_core::http::security::initializer::Initializer;
use actix_websecurity_core::http::security::logout::LogoutFeature;
use actix_websecurity_core::http::security::middleware::SecurityChain;
use actix_websecurity_core::http::security::password::PasswordAuthenticator;
use actix_websecurity_core::http::security::registrar::SecurityRegistrar;

// =============================================================================
// Test Configuration
// =============================================================================

pub const REALM: &str = "test";
pub const FAILURES_LIMIT: u32 = 3;

/// Creates an account store with predefined accounts.
///
/// Passwords are stored in plain text (NoOp encoder).
/// - admin/admin: ADMIN, USER
/// - user/user: USER
/// - disabled/disabled: disabled account
pub fn test_store() -> InMemoryAccountStore {
    InMemoryAccountStore::new()
        .locking_rules(LockingRules {
            enabled: true,
            failures_limit: FAILURES_LIMIT,
            lockout_duration: None,
        })
        .with_account(Account::new("1", "admin", "admin").with_permissions(["ADMIN", "USER"]))
        .with_account(Account::new("2", "user", "user").with_permissions(["USER"]))
        .with_account(Account::new("3", "disabled", "disabled").disabled(true))
}

pub fn test_authenticator(store: InMemoryAccountStore) -> CompositeAuthenticator {
    CompositeAuthenticator::new().with(PasswordAuthenticator::new(
        Arc::new(store),
        Arc::new(NoOpPasswordEncoder),
    ))
}

/// Builds the chain of the test application.
///
/// Rules:
/// - /login and /whoami are public
/// - /admin/** requires ADMIN
/// - everything else requires authentication
pub fn test_chain(store: InMemoryAccountStore) -> SecurityChain {
    let mut initializer = Initializer::with_default_features(Arc::new(test_authenticator(store)));
    initializer
        .register(
            configurer_fn(|ws| {
                ws.with(BasicAuthFeature::new().realm(REALM))
                    .with(AnonymousFeature::new())
                    .with(LogoutFeature::new())
                    .with(
                        AccessControlFeature::new()
                            .request("/login", Access::PermitAll)
                            .request("/whoami", Access::PermitAll)
                            .request("/admin/**", Access::has_permissions(&["ADMIN"]))
                            .any_request(Access::Authenticated),
                    );
                Ok(())
            })
            .with_name("test"),
        )
        .unwrap();

    let mut registrar = SecurityRegistrar::new();
    initializer.initialize(&mut registrar).unwrap();
    registrar.build()
}

/// Helper function to create Basic Auth header value.
pub fn basic_auth(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    format!("Basic {}", BASE64_STANDARD.encode(credentials))
}

// =============================================================================
// Test Handlers
// =============================================================================

#[get("/")]
pub async fn index(principal: AuthenticatedPrincipal) -> impl Responder {
    HttpResponse::Ok().body(format!("Welcome, {}!", principal.principal()))
}

#[get("/login")]
pub async fn login() -> impl Responder {
    HttpResponse::Ok().body("Login page")
}

#[get("/whoami")]
pub async fn whoami(auth: CurrentAuthentication) -> impl Responder {
    HttpResponse::Ok().body(auth.principal().unwrap_or("<none>").to_string())
}

#[get("/admin/dashboard")]
pub async fn admin_dashboard(principal: AuthenticatedPrincipal) -> impl Responder {
    HttpResponse::Ok().body(format!("Admin: {}", principal.principal()))
}

// =============================================================================
// Test App
// =============================================================================

pub async fn create_test_app(
    store: InMemoryAccountStore,
) -> impl Service<actix_http::Request, Response = ServiceResponse<EitherBody<BoxBody>>, Error = actix_web::Error> {
    let chain = test_chain(store);
    let endpoints = chain.clone();
    test::init_service(
        App::new()
            .wrap(chain)
            .configure(move |cfg| endpoints.configure(cfg))
            .service(index)
            .service(login)
            .service(whoami)
            .service(admin_dashboard),
    )
    .await
}
