use actix_web::{http::StatusCode, test, App};
use pizza_payment_engine::{
    catalog::{Pizza, SizeOption, Topping},
    test_utils::{prepare_test_env, TestGateway},
};
use ppg_common::Cents;

use super::helpers::{configure_api, send_get, test_api};

#[actix_web::test]
async fn listing_an_unknown_shop_provisions_a_menu() {
    prepare_test_env();
    let api = test_api(TestGateway::new());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let (status, body) = send_get(&app, "/api/products/luigi/pizzas").await;
    assert_eq!(status, StatusCode::OK);
    let pizzas: Vec<Pizza> = serde_json::from_str(&body).expect("The pizza list does not parse");
    assert!((4..=8).contains(&pizzas.len()), "Unexpected menu length: {}", pizzas.len());

    let (status, body) = send_get(&app, "/api/products/luigi/sizes").await;
    assert_eq!(status, StatusCode::OK);
    let sizes: Vec<SizeOption> = serde_json::from_str(&body).expect("The size list does not parse");
    assert_eq!(sizes.len(), 3);

    let (status, body) = send_get(&app, "/api/products/luigi/toppings").await;
    assert_eq!(status, StatusCode::OK);
    let toppings: Vec<Topping> = serde_json::from_str(&body).expect("The topping list does not parse");
    assert_eq!(toppings.len(), 3);
}

#[actix_web::test]
async fn menus_stay_fixed_once_provisioned() {
    prepare_test_env();
    let api = test_api(TestGateway::new());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let (_, first) = send_get(&app, "/api/products/mario/pizzas").await;
    let (_, second) = send_get(&app, "/api/products/mario/pizzas").await;
    assert_eq!(first, second);
}

#[actix_web::test]
async fn single_items_can_be_fetched() {
    prepare_test_env();
    let api = test_api(TestGateway::new());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let (status, body) = send_get(&app, "/api/products/corner-shop/pizzas/1").await;
    assert_eq!(status, StatusCode::OK);
    let pizza: Pizza = serde_json::from_str(&body).expect("The pizza does not parse");
    assert_eq!(pizza.name, "Pizza Roma");
    assert_eq!(pizza.price, Cents::from(45));

    let (status, body) = send_get(&app, "/api/products/corner-shop/toppings/1").await;
    assert_eq!(status, StatusCode::OK);
    let topping: Topping = serde_json::from_str(&body).expect("The topping does not parse");
    assert_eq!(topping, Topping { id: 1, name: "garlic".to_string(), price: Cents::from(1) });
}

#[actix_web::test]
async fn unknown_items_are_not_found() {
    prepare_test_env();
    let api = test_api(TestGateway::new());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    let (status, body) = send_get(&app, "/api/products/corner-shop/toppings/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("error"), "Expected an error body, got {body}");
}

#[actix_web::test]
async fn unknown_categories_do_not_match_a_route() {
    prepare_test_env();
    let api = test_api(TestGateway::new());
    let app = test::init_service(App::new().configure(|cfg| configure_api(cfg, api))).await;

    for path in ["/api/products/corner-shop/drinks", "/api/products/corner-shop/pizzas/abc"] {
        let (status, body) = send_get(&app, path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path} should not match a route");
        assert!(body.is_empty(), "{path} should not reach a handler");
    }
}
