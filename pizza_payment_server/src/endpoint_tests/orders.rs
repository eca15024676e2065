use actix_web::{cookie::Cookie, http::StatusCode, test, test::TestRequest, App};
use pizza_payment_engine::{
    order_objects::OrderSummary,
    test_utils::{prepare_test_env, GatewayCall, TestGateway},
};
use ppg_common::Cents;

use super::helpers::{configure_api, send_post, test_api, ORDER_CONTENT};

#[actix_web::test]
async fn submitting_an_order_returns_payment_details() {
    prepare_test_env();
    let gateway = TestGateway::new();
    let api = test_api(gateway.clone());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let req = TestRequest::post().uri("/api/orders/corner-shop").set_payload(ORDER_CONTENT).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie =
        res.response().cookies().find(|c| c.name() == "customer_ref").expect("No customer_ref cookie was minted");
    assert!(!cookie.value().is_empty());
    let summary: OrderSummary = test::read_body_json(res).await;
    assert_eq!(summary.id.as_str().len(), 32);
    assert!(summary.id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(summary.amount, Cents::from(41));
    assert_eq!(summary.poll_uri, format!("http://pizza.test/api/poll/{}", summary.id.as_str()));
    assert_eq!(summary.qrcode_url, format!("https://qr.test/SL-1/{}", summary.id.as_str()));
    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], GatewayCall::IssueShortlink { callback_uri } if callback_uri == "http://pizza.test/api/callback/shortlink/"));
}

#[actix_web::test]
async fn resubmitting_the_same_basket_reuses_the_order() {
    prepare_test_env();
    let gateway = TestGateway::new();
    let api = test_api(gateway.clone());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let req = TestRequest::post()
        .uri("/api/orders/corner-shop")
        .cookie(Cookie::new("customer_ref", "cust-1"))
        .set_payload(ORDER_CONTENT)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.response().cookies().next().is_none(), "A returning customer must keep their cookie");
    let first: OrderSummary = test::read_body_json(res).await;

    let req = TestRequest::post()
        .uri("/api/orders/corner-shop")
        .cookie(Cookie::new("customer_ref", "cust-1"))
        .set_payload(ORDER_CONTENT)
        .to_request();
    let second: OrderSummary = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(first, second);
    assert_eq!(gateway.shortlink_count(), 1, "A resubmission must not issue a second shortlink");
}

#[actix_web::test]
async fn each_customer_gets_their_own_order() {
    prepare_test_env();
    let gateway = TestGateway::new();
    let api = test_api(gateway.clone());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let mut ids = Vec::with_capacity(2);
    for customer in ["cust-1", "cust-2"] {
        let req = TestRequest::post()
            .uri("/api/orders/corner-shop")
            .cookie(Cookie::new("customer_ref", customer))
            .set_payload(ORDER_CONTENT)
            .to_request();
        let summary: OrderSummary = test::read_body_json(test::call_service(&app, req).await).await;
        ids.push(summary.id);
    }
    assert_ne!(ids[0], ids[1]);
    assert_eq!(gateway.shortlink_count(), 2);
}

#[actix_web::test]
async fn garbage_content_is_rejected() {
    prepare_test_env();
    let api = test_api(TestGateway::new());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let (status, body) = send_post(&app, "/api/orders/corner-shop", "pineapple").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("error"), "Expected an error body, got {body}");
}

#[actix_web::test]
async fn an_empty_basket_is_rejected() {
    prepare_test_env();
    let api = test_api(TestGateway::new());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let (status, body) = send_post(&app, "/api/orders/corner-shop", "[]").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("at least one priced item"), "Unexpected error body: {body}");
}

#[actix_web::test]
async fn orders_for_unknown_shops_are_rejected() {
    prepare_test_env();
    let gateway = TestGateway::new();
    let api = test_api(gateway.clone());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let (status, _) = send_post(&app, "/api/orders/nowhere", ORDER_CONTENT).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(gateway.calls().is_empty(), "No gateway call may be made for a rejected order");
}

#[actix_web::test]
async fn a_gateway_outage_is_reported_as_bad_gateway() {
    prepare_test_env();
    let gateway = TestGateway::new();
    gateway.fail_shortlinks(true);
    let api = test_api(gateway.clone());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let (status, body) = send_post(&app, "/api/orders/corner-shop", ORDER_CONTENT).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("payment gateway"), "Unexpected error body: {body}");
}
