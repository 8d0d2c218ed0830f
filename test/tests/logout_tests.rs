//! Logout endpoint tests.

mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;

use common::{basic_auth, create_test_app, test_store};

#[actix_web::test]
async fn test_logout_redirects_to_success_url() {
    let app = create_test_app(test_store()).await;

    for req in [test::TestRequest::get(), test::TestRequest::post()] {
        let req = req
            .uri("/logout")
            .insert_header((header::AUTHORIZATION, basic_auth("user", "user")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
    }
}

#[actix_web::test]
async fn test_logout_requires_authentication() {
    let app = create_test_app(test_store()).await;

    let req = test::TestRequest::post().uri("/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_other_methods_are_not_mapped() {
    let app = create_test_app(test_store()).await;

    let req = test::TestRequest::delete()
        .uri("/logout")
        .insert_header((header::AUTHORIZATION, basic_auth("user", "user")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
    assert_ne!(resp.status(), StatusCode::FOUND);
}
