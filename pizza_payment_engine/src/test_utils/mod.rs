//! Fixtures shared by the engine's own tests and by integration tests in dependent crates.
mod prepare_env;
mod test_gateway;

pub use prepare_env::prepare_test_env;
pub use test_gateway::{GatewayCall, TestGateway};

use ppg_common::Cents;

use crate::catalog::{Menu, Pizza, ShopCatalog, SizeOption, Topping};

/// A fixed menu: one 45 pizza, a size that knocks 5 off, and a 1 topping.
pub fn corner_shop_menu() -> Menu {
    Menu {
        pizzas: vec![Pizza {
            id: 1,
            name: "Pizza Roma".to_string(),
            image: "images/corner-shop/roma.jpg".to_string(),
            price: Cents::from(45),
        }],
        sizes: vec![SizeOption { id: 28, name: "28 cm".to_string(), price: Cents::from(-5) }],
        toppings: vec![Topping { id: 1, name: "garlic".to_string(), price: Cents::from(1) }],
    }
}

/// A catalog with [`corner_shop_menu`] registered under `corner-shop`.
pub fn catalog_with_corner_shop() -> ShopCatalog {
    let catalog = ShopCatalog::new();
    catalog.insert_menu("corner-shop", corner_shop_menu());
    catalog
}
