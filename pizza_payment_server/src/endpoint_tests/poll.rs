use actix_web::{http::StatusCode, test, web, web::Data, App};
use pizza_payment_engine::{
    db_types::OrderId,
    events::EventProducers,
    test_utils::{catalog_with_corner_shop, prepare_test_env, TestGateway},
    OrderFlowApi,
    TransactionStoreError,
};

use super::{
    helpers::{configure_api, send_post, submit_order, test_api, test_settings},
    mocks::MockTransactionDb,
};
use crate::routes::PollOrderRoute;

const SCAN_BODY: &str = r#"{"object": {"id": "customer-token-abc"}}"#;
const DECLINE_BODY: &str = r#"{"object": {"tid": "GWTX-2", "status": "fail"}}"#;

#[actix_web::test]
async fn a_poll_with_no_news_times_out_empty_handed() {
    prepare_test_env();
    let api = test_api(TestGateway::new());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let summary = submit_order(&app).await;
    let (status, body) = send_post(&app, &format!("/api/poll/{}", summary.id.as_str()), "").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn polls_for_unknown_orders_are_rejected() {
    prepare_test_env();
    let api = test_api(TestGateway::new());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let (status, body) = send_post(&app, "/api/poll/36e19a4f93e0cd0136e19a4f93e0cd01", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("error"), "Expected an error body, got {body}");
}

#[actix_web::test]
async fn poll_ids_must_look_like_order_ids() {
    prepare_test_env();
    let api = test_api(TestGateway::new());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    // Too short, bad alphabet and uppercase hex all miss the route and fall through to a bare 404
    for path in ["/api/poll/abc123", "/api/poll/not-an-order-id-here", "/api/poll/36E19A4F93E0CD0136E19A4F93E0CD01"] {
        let (status, body) = send_post(&app, path, "").await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path} should not match the poll route");
        assert!(body.is_empty(), "{path} should not reach a handler");
    }
}

#[actix_web::test]
async fn a_settled_order_answers_polls_immediately() {
    prepare_test_env();
    let api = test_api(TestGateway::new());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let summary = submit_order(&app).await;
    let scan_path = format!("/api/callback/shortlink/{}", summary.id.as_str());
    let (status, _) = send_post(&app, &scan_path, SCAN_BODY).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_post(&app, "/api/callback/payment/GWTX-2", DECLINE_BODY).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_post(&app, &format!("/api/poll/{}", summary.id.as_str()), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"result":false}"#);
}

#[actix_web::test]
async fn a_store_failure_is_reported_as_a_server_error() {
    prepare_test_env();
    let mut store = MockTransactionDb::new();
    store.expect_fetch_transaction().returning(|_| {
        Err(TransactionStoreError::TransactionNotFound(OrderId::from("36e19a4f93e0cd01".to_string())))
    });
    let api = Data::new(OrderFlowApi::new(
        store,
        TestGateway::new(),
        catalog_with_corner_shop(),
        test_settings(),
        EventProducers::default(),
    ));
    let app = test::init_service(App::new().configure(move |cfg| {
        cfg.app_data(api)
            .service(web::scope("/api").service(PollOrderRoute::<MockTransactionDb, TestGateway>::new()));
    }))
    .await;

    let (status, body) = send_post(&app, "/api/poll/36e19a4f93e0cd01", "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("backend"), "Unexpected error body: {body}");
}
