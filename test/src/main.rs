//! Actix WebSecurity Demo Application
//!
//! One configurer secures the whole application with HTTP Basic, anonymous
//! access to public pages, logout and permission based access rules.

use std::io;
use std::sync::Arc;

use actix_web::{get, App, HttpResponse, HttpServer, Responder};

use actix_websecurity_core::http::security::access::{Access, AccessControlFeature};
use actix_websecurity_core::http::security::account::{Account, InMemoryAccountStore, LockingRules};
use actix_websecurity_core::http::security::anonymous::AnonymousFeature;
use actix_websecurity_core::http::security::authenticator::CompositeAuthenticator;
use actix_websecurity_core::http::security::basic_auth::BasicAuthFeature;
use actix_websecurity_core::http::security::configurer::configurer_fn;
use actix_websecurity_core::http::security::crypto::{Argon2PasswordEncoder, PasswordEncoder};
use actix_websecurity_core::http::security::extractor::{AuthenticatedPrincipal, CurrentAuthentication};
use actix_websecurity_core::http::security::initializer::Initializer;
use actix_websecurity_core::http::security::logout::LogoutFeature;
use actix_websecurity_core::http::security::password::PasswordAuthenticator;
use actix_websecurity_core::http::security::properties::{ConfigPropertyBinder, SecurityProperties};
use actix_websecurity_core::http::security::registrar::SecurityRegistrar;

#[get("/login")]
async fn login() -> impl Responder {
    HttpResponse::Ok().body("Login page")
}

#[get("/")]
async fn index(principal: AuthenticatedPrincipal) -> impl Responder {
    HttpResponse::Ok().body(format!("Welcome, {}!", principal.principal()))
}

#[get("/profile")]
async fn profile(auth: CurrentAuthentication) -> impl Responder {
    HttpResponse::Ok().body(auth.to_string())
}

#[get("/admin/dashboard")]
async fn admin_dashboard(principal: AuthenticatedPrincipal) -> impl Responder {
    HttpResponse::Ok().body(format!("Admin: {}", principal.principal()))
}

/// Creates the password authenticator with the demo accounts.
fn authenticator() -> io::Result<PasswordAuthenticator> {
    let encoder = Argon2PasswordEncoder::new();
    let store = InMemoryAccountStore::new()
        .locking_rules(LockingRules::default())
        .with_account(
            Account::new("1", "admin", encoder.encode("admin").map_err(io::Error::other)?)
                .with_permissions(["ADMIN", "USER"]),
        )
        .with_account(
            Account::new("2", "user", encoder.encode("user").map_err(io::Error::other)?)
                .with_permissions(["USER"]),
        );
    Ok(PasswordAuthenticator::new(Arc::new(store), Arc::new(encoder)))
}

fn properties() -> io::Result<SecurityProperties> {
    let config = config::Config::builder()
        .add_source(config::File::with_name("security").required(false))
        .build()
        .map_err(io::Error::other)?;
    SecurityProperties::bind(&ConfigPropertyBinder::new(config)).map_err(io::Error::other)
}

fn print_startup_info(properties: &SecurityProperties) {
    println!("=== Actix WebSecurity Demo ===");
    println!();
    println!("Server: http://127.0.0.1:8080");
    println!("Realm:  {}", properties.basic_auth.realm);
    println!();
    println!("Accounts (passwords are hashed with Argon2):");
    println!("  admin/admin - Permissions: [ADMIN, USER]");
    println!("  user/user   - Permissions: [USER]");
    println!();
    println!("Routes:");
    println!("  GET  /login           - Public");
    println!("  GET  /profile         - Public, shows the current authentication");
    println!("  GET  /                - Authenticated");
    println!("  GET  /admin/dashboard - ADMIN permission");
    println!("  GET  {}           - Logout", properties.logout.logout_url);
    println!();
    println!("Examples:");
    println!("  curl -u admin:admin http://127.0.0.1:8080/admin/dashboard");
    println!("  curl -u user:user http://127.0.0.1:8080/admin/dashboard   # 403 Forbidden");
    println!();
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let properties = properties()?;
    print_startup_info(&properties);

    let global = CompositeAuthenticator::new().with(authenticator()?);
    let mut initializer =
        Initializer::with_default_features(Arc::new(global)).strict_features(properties.strict_features);

    let security = properties.clone();
    initializer
        .register(
            configurer_fn(move |ws| {
                ws.with(BasicAuthFeature::from_properties(&security.basic_auth))
                    .with(AnonymousFeature::new())
                    .with(LogoutFeature::from_properties(&security.logout))
                    .with(
                        AccessControlFeature::new()
                            .request("/login", Access::PermitAll)
                            .request("/profile", Access::PermitAll)
                            .request("/admin/**", Access::has_permissions(&["ADMIN"]))
                            .any_request(Access::Authenticated),
                    );
                Ok(())
            })
            .with_name("app"),
        )
        .map_err(io::Error::other)?;

    let mut registrar = SecurityRegistrar::new();
    initializer.initialize(&mut registrar).map_err(io::Error::other)?;
    let chain = registrar.build();
    log::info!(
        "Security chain ready: {} middleware, {} endpoints",
        chain.middlewares().len(),
        chain.endpoints().len()
    );

    HttpServer::new(move || {
        let endpoints = chain.clone();
        App::new()
            .wrap(chain.clone())
            .configure(move |cfg| endpoints.configure(cfg))
            .service(login)
            .service(profile)
            .service(index)
            .service(admin_dashboard)
    })
    .bind("127.0.0.1:8080")?
    .run()
    .await
}
