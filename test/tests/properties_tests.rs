//! Features configured from externalized properties.

mod common;

use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use config::{Config, File, FileFormat};

use actix_websecurity_core::http::security::access::{Access, AccessControlFeature};
use actix_websecurity_core::http::security::basic_auth::BasicAuthFeature;
use actix_websecurity_core::http::security::configurer::configurer_fn;
use actix_websecurity_core::http::security::initializer::Initializer;
use actix_websecurity_core::http::security::logout::LogoutFeature;
use actix_websecurity_core::http::security::properties::{ConfigPropertyBinder, SecurityProperties};
use actix_websecurity_core::http::security::registrar::SecurityRegistrar;
use common::{basic_auth, index, test_authenticator, test_store};

const PROPERTIES: &str = r#"
[security.basic_auth]
realm = "configured"

[security.logout]
logout_url = "/signout"
success_url = "/bye"
"#;

fn properties() -> SecurityProperties {
    let config = Config::builder()
        .add_source(File::from_str(PROPERTIES, FileFormat::Toml))
        .build()
        .unwrap();
    SecurityProperties::bind(&ConfigPropertyBinder::new(config)).unwrap()
}

#[actix_web::test]
async fn test_features_from_properties() {
    let properties = properties();
    assert!(!properties.strict_features);

    let mut initializer = Initializer::with_default_features(Arc::new(test_authenticator(test_store())));
    initializer
        .register(configurer_fn(move |ws| {
            ws.with(BasicAuthFeature::from_properties(&properties.basic_auth))
                .with(LogoutFeature::from_properties(&properties.logout))
                .with(AccessControlFeature::new().any_request(Access::Authenticated));
            Ok(())
        }))
        .unwrap();
    let mut registrar = SecurityRegistrar::new();
    initializer.initialize(&mut registrar).unwrap();
    let chain = registrar.build();
    assert_eq!(chain.endpoints().len(), 2);

    let endpoints = chain.clone();
    let app = test::init_service(
        App::new()
            .wrap(chain)
            .configure(move |cfg| endpoints.configure(cfg))
            .service(index),
    )
    .await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"configured\""
    );

    let req = test::TestRequest::post()
        .uri("/signout")
        .insert_header((header::AUTHORIZATION, basic_auth("admin", "admin")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/bye");
}
