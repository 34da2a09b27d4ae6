#![cfg(feature = "server")]

mod common;

use std::time::Duration;

use actix_web::{http::header, test, App};
use hairtry::{server, GeminiClient};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

const BODY_LIMIT: usize = 10 * 1024 * 1024;

fn try_on_body() -> Value {
    json!({
        "modelImage": "data:image/jpeg;base64,U1RZTEU=",
        "selfieImage": "U0VMRklF"
    })
}

#[actix_web::test]
async fn returns_output_image_on_success() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_response(json!({
            "inlineData": { "data": "T1VUUFVU" }
        }))))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = test::init_service(
        App::new().configure(server::configure(gemini_client(&upstream), BODY_LIMIT)),
    )
    .await;
    let req = test::TestRequest::post()
        .uri(server::TRY_ON_PATH)
        .set_json(try_on_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "outputImage": "T1VUUFVU" }));
}

#[actix_web::test]
async fn missing_selfie_is_bad_request_and_upstream_untouched() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_only_response()))
        .expect(0)
        .mount(&upstream)
        .await;

    let app = test::init_service(
        App::new().configure(server::configure(gemini_client(&upstream), BODY_LIMIT)),
    )
    .await;
    let req = test::TestRequest::post()
        .uri(server::TRY_ON_PATH)
        .set_json(json!({ "modelImage": "U1RZTEU=" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "modelImage and selfieImage are required.");
}

#[actix_web::test]
async fn upstream_failure_keeps_status_and_details() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model overloaded"))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = test::init_service(
        App::new().configure(server::configure(gemini_client(&upstream), BODY_LIMIT)),
    )
    .await;
    let req = test::TestRequest::post()
        .uri(server::TRY_ON_PATH)
        .set_json(try_on_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 503);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Gemini request failed");
    assert_eq!(body["details"], "model overloaded");
}

#[actix_web::test]
async fn empty_result_is_distinct_server_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_only_response()))
        .mount(&upstream)
        .await;

    let app = test::init_service(
        App::new().configure(server::configure(gemini_client(&upstream), BODY_LIMIT)),
    )
    .await;
    let req = test::TestRequest::post()
        .uri(server::TRY_ON_PATH)
        .set_json(try_on_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "No image returned from Gemini response.");
    assert!(body.get("details").is_none());
}

#[actix_web::test]
async fn upstream_timeout_is_gateway_timeout() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_only_response())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&upstream)
        .await;

    let config = gemini_config(&upstream).with_timeout(Duration::from_millis(200));
    let client = GeminiClient::new(config).unwrap();
    let app = test::init_service(App::new().configure(server::configure(client, BODY_LIMIT))).await;
    let req = test::TestRequest::post()
        .uri(server::TRY_ON_PATH)
        .set_json(try_on_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 504);
}

#[actix_web::test]
async fn other_methods_are_not_allowed() {
    let upstream = MockServer::start().await;
    let app = test::init_service(
        App::new().configure(server::configure(gemini_client(&upstream), BODY_LIMIT)),
    )
    .await;
    let req = test::TestRequest::get().uri(server::TRY_ON_PATH).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 405);
    assert_eq!(resp.headers().get(header::ALLOW).unwrap(), "POST");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Method not allowed");
}

#[actix_web::test]
async fn malformed_json_is_bad_request() {
    let upstream = MockServer::start().await;
    let app = test::init_service(
        App::new().configure(server::configure(gemini_client(&upstream), BODY_LIMIT)),
    )
    .await;
    let req = test::TestRequest::post()
        .uri(server::TRY_ON_PATH)
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn oversized_body_is_rejected() {
    let upstream = MockServer::start().await;
    let app =
        test::init_service(App::new().configure(server::configure(gemini_client(&upstream), 64)))
            .await;
    let req = test::TestRequest::post()
        .uri(server::TRY_ON_PATH)
        .set_json(json!({ "modelImage": "A".repeat(200), "selfieImage": "B".repeat(200) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 413);
}

#[actix_web::test]
async fn health_reports_ok() {
    let upstream = MockServer::start().await;
    let app = test::init_service(
        App::new().configure(server::configure(gemini_client(&upstream), BODY_LIMIT)),
    )
    .await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}
