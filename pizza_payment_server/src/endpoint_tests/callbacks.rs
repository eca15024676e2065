use std::time::Duration;

use actix_web::{http::StatusCode, test, App};
use pizza_payment_engine::test_utils::{prepare_test_env, GatewayCall, TestGateway};
use ppg_common::Cents;

use super::helpers::{configure_api, send_post, submit_order, test_api};

const SCAN_BODY: &str = r#"{"object": {"id": "customer-token-abc"}}"#;
const PAYMENT_OK_BODY: &str = r#"{"object": {"tid": "GWTX-2", "status": "ok"}}"#;
const PAYMENT_FAIL_BODY: &str = r#"{"object": {"tid": "GWTX-2", "status": "fail"}}"#;

#[actix_web::test]
async fn a_scan_requests_authorization_and_acknowledges() {
    prepare_test_env();
    let gateway = TestGateway::new();
    let api = test_api(gateway.clone());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let summary = submit_order(&app).await;
    let (status, body) = send_post(&app, &format!("/api/callback/shortlink/{}", summary.id.as_str()), SCAN_BODY).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
    let calls = gateway.calls();
    assert_eq!(calls.len(), 2);
    let expected = GatewayCall::RequestAuthorization {
        customer_token: "customer-token-abc".to_string(),
        pos_id: "corner-shop".to_string(),
        pos_tid: summary.id.as_str().to_string(),
        callback_uri: "http://pizza.test/api/callback/payment/".to_string(),
    };
    assert_eq!(calls[1], expected);
}

#[actix_web::test]
async fn unparseable_callback_bodies_are_rejected() {
    prepare_test_env();
    let api = test_api(TestGateway::new());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let (status, body) = send_post(&app, "/api/callback/shortlink/36e19a4f93e0cd01", "not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("callback body"), "Unexpected error body: {body}");
    let (status, _) = send_post(&app, "/api/callback/payment/GWTX-2", "<xml/>").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn event_notices_are_acknowledged_without_side_effects() {
    prepare_test_env();
    let gateway = TestGateway::new();
    let api = test_api(gateway.clone());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let notice = r#"{"event": "shortlink_reconfigured", "id": "sl-771"}"#;
    let (status, body) = send_post(&app, "/api/callback/shortlink/36e19a4f93e0cd01", notice).await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "OK"));
    let (status, body) = send_post(&app, "/api/callback/payment/GWTX-2", notice).await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "OK"));
    assert!(gateway.calls().is_empty());
}

#[actix_web::test]
async fn a_scan_without_a_customer_token_is_ignored() {
    prepare_test_env();
    let gateway = TestGateway::new();
    let api = test_api(gateway.clone());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let summary = submit_order(&app).await;
    let (status, body) = send_post(&app, &format!("/api/callback/shortlink/{}", summary.id.as_str()), "{}").await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "OK"));
    assert_eq!(gateway.calls().len(), 1, "A token-less scan must not request an authorization");
}

#[actix_web::test]
async fn scans_of_unknown_orders_are_acknowledged_and_ignored() {
    prepare_test_env();
    let gateway = TestGateway::new();
    let api = test_api(gateway.clone());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let (status, body) = send_post(&app, "/api/callback/shortlink/36e19a4f93e0cd01", SCAN_BODY).await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "OK"));
    assert!(gateway.calls().is_empty());
}

#[actix_web::test]
async fn a_failed_authorization_request_is_reported_upstream() {
    prepare_test_env();
    let gateway = TestGateway::new();
    let api = test_api(gateway.clone());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let summary = submit_order(&app).await;
    gateway.fail_authorizations(true);
    let (status, body) = send_post(&app, &format!("/api/callback/shortlink/{}", summary.id.as_str()), SCAN_BODY).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("payment gateway"), "Unexpected error body: {body}");
}

#[actix_web::test]
async fn payment_callbacks_for_unknown_transactions_are_acknowledged() {
    prepare_test_env();
    let api = test_api(TestGateway::new());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let (status, body) = send_post(&app, "/api/callback/payment/GWTX-99", PAYMENT_OK_BODY).await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "OK"));
}

/// The full happy path: submit, scan, suspend a poll, settle the payment, and check that the
/// poller is woken with the verdict.
#[actix_web::test]
async fn a_captured_payment_wakes_the_suspended_poller() {
    prepare_test_env();
    let gateway = TestGateway::new();
    let api = test_api(gateway.clone());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let summary = submit_order(&app).await;
    assert_eq!(summary.amount, Cents::from(41));
    let (status, _) = send_post(&app, &format!("/api/callback/shortlink/{}", summary.id.as_str()), SCAN_BODY).await;
    assert_eq!(status, StatusCode::OK);

    let poll_path = format!("/api/poll/{}", summary.id.as_str());
    let poller = send_post(&app, &poll_path, "");
    let payment = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        send_post(&app, "/api/callback/payment/GWTX-2", PAYMENT_OK_BODY).await
    };
    let ((poll_status, poll_body), (cb_status, cb_body)) = tokio::join!(poller, payment);
    assert_eq!((cb_status, cb_body.as_str()), (StatusCode::OK, "OK"));
    assert_eq!(poll_status, StatusCode::OK);
    assert_eq!(poll_body, r#"{"result":true}"#);
    assert_eq!(gateway.capture_count(), 1);
}

#[actix_web::test]
async fn a_failed_capture_still_settles_the_order() {
    prepare_test_env();
    let gateway = TestGateway::new();
    let api = test_api(gateway.clone());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let summary = submit_order(&app).await;
    send_post(&app, &format!("/api/callback/shortlink/{}", summary.id.as_str()), SCAN_BODY).await;
    gateway.fail_captures(true);
    let (status, body) = send_post(&app, "/api/callback/payment/GWTX-2", PAYMENT_OK_BODY).await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "OK"));

    let (status, body) = send_post(&app, &format!("/api/poll/{}", summary.id.as_str()), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"result":false}"#, "An uncaptured payment must not be reported as a success");
}

#[actix_web::test]
async fn repeated_payment_callbacks_cannot_change_the_verdict() {
    prepare_test_env();
    let gateway = TestGateway::new();
    let api = test_api(gateway.clone());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let summary = submit_order(&app).await;
    send_post(&app, &format!("/api/callback/shortlink/{}", summary.id.as_str()), SCAN_BODY).await;
    let (status, _) = send_post(&app, "/api/callback/payment/GWTX-2", PAYMENT_OK_BODY).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send_post(&app, "/api/callback/payment/GWTX-2", PAYMENT_FAIL_BODY).await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "OK"));

    let (status, body) = send_post(&app, &format!("/api/poll/{}", summary.id.as_str()), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"result":true}"#);
    assert_eq!(gateway.capture_count(), 1);
}
