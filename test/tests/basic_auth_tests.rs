//! HTTP Basic Authentication tests.
//!
//! Runs the default features (basic auth, anonymous, access control) over a
//! real actix-web service.

mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;

use actix_websecurity_core::http::security::account::AccountStore;
use common::{basic_auth, create_test_app, test_store, FAILURES_LIMIT};

#[actix_web::test]
async fn test_basic_auth_success() {
    let app = create_test_app(test_store()).await;

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header((header::AUTHORIZATION, basic_auth("admin", "admin")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    assert_eq!(String::from_utf8_lossy(&body), "Welcome, admin!");
}

#[actix_web::test]
async fn test_basic_auth_wrong_password() {
    let app = create_test_app(test_store()).await;

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header((header::AUTHORIZATION, basic_auth("admin", "wrongpassword")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"test\""
    );
}

#[actix_web::test]
async fn test_basic_auth_unknown_user() {
    let app = create_test_app(test_store()).await;

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header((header::AUTHORIZATION, basic_auth("unknown", "password")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_disabled_account() {
    let app = create_test_app(test_store()).await;

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header((header::AUTHORIZATION, basic_auth("disabled", "disabled")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_malformed_credentials() {
    let app = create_test_app(test_store()).await;

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header((header::AUTHORIZATION, "Basic !!!"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_no_auth_gets_challenged() {
    let app = create_test_app(test_store()).await;

    let req = test::TestRequest::get().uri("/").to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[actix_web::test]
async fn test_public_page_is_anonymous() {
    let app = create_test_app(test_store()).await;

    let req = test::TestRequest::get().uri("/login").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/whoami").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(String::from_utf8_lossy(&body), "anonymousUser");
}

#[actix_web::test]
async fn test_missing_permission_is_forbidden() {
    let app = create_test_app(test_store()).await;

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header((header::AUTHORIZATION, basic_auth("user", "user")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header((header::AUTHORIZATION, basic_auth("admin", "admin")))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(String::from_utf8_lossy(&body), "Admin: admin");
}

#[actix_web::test]
async fn test_account_locked_after_failures() {
    let store = test_store();
    let app = create_test_app(store.clone()).await;

    for _ in 0..FAILURES_LIMIT {
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::AUTHORIZATION, basic_auth("user", "guess")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    let account = store.load_account_by_username("user").await.unwrap().unwrap();
    assert!(account.locked);
    assert_eq!(account.failed_attempts, FAILURES_LIMIT);

    // the right password no longer helps
    let req = test::TestRequest::get()
        .uri("/")
        .insert_header((header::AUTHORIZATION, basic_auth("user", "user")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_successful_login_is_persisted() {
    let store = test_store();
    let app = create_test_app(store.clone()).await;

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header((header::AUTHORIZATION, basic_auth("admin", "admin")))
        .to_request();
    test::call_service(&app, req).await;

    let account = store.load_account_by_username("admin").await.unwrap().unwrap();
    assert!(account.last_login.is_some());
    assert_eq!(account.failed_attempts, 0);
}
