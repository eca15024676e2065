//! Per-shop menus and order pricing.
//!
//! Shops are provisioned lazily: the first product listing against an unknown shop id generates a
//! random menu for it, which then stays fixed for the life of the process. Order pricing only
//! accepts shops that have been provisioned.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use log::*;
use ppg_common::Cents;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("No shop with id {0} has been provisioned")]
    UnknownShop(String),
    #[error("Unknown product id: {0}")]
    UnknownProduct(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pizza {
    pub id: u32,
    pub name: String,
    pub image: String,
    pub price: Cents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeOption {
    /// The diameter in cm doubles as the option id
    pub id: u32,
    pub name: String,
    /// Price delta relative to the base pizza. May be negative.
    pub price: Cents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topping {
    pub id: u32,
    pub name: String,
    pub price: Cents,
}

/// One line of an order: a pizza, an optional size and any number of toppings, all by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub toppings: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub pizzas: Vec<Pizza>,
    pub sizes: Vec<SizeOption>,
    pub toppings: Vec<Topping>,
}

impl Menu {
    pub fn pizza(&self, id: u32) -> Option<&Pizza> {
        self.pizzas.iter().find(|p| p.id == id)
    }

    pub fn size(&self, id: u32) -> Option<&SizeOption> {
        self.sizes.iter().find(|s| s.id == id)
    }

    pub fn topping(&self, id: u32) -> Option<&Topping> {
        self.toppings.iter().find(|t| t.id == id)
    }
}

/// The shared menu registry. Cloning is cheap and clones see the same shops.
#[derive(Debug, Clone, Default)]
pub struct ShopCatalog {
    shops: Arc<RwLock<HashMap<String, Menu>>>,
}

impl ShopCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The menu for `shop_id`, generating and registering one if the shop is new.
    pub fn provision(&self, shop_id: &str) -> Menu {
        let mut shops = self.shops.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(menu) = shops.get(shop_id) {
            return menu.clone();
        }
        let menu = generate_menu(shop_id);
        info!("🏪️ Provisioned shop {shop_id} with {} pizzas on the menu", menu.pizzas.len());
        shops.insert(shop_id.to_string(), menu.clone());
        menu
    }

    pub fn menu(&self, shop_id: &str) -> Option<Menu> {
        let shops = self.shops.read().unwrap_or_else(PoisonError::into_inner);
        shops.get(shop_id).cloned()
    }

    /// Register an explicit menu, replacing any generated one.
    pub fn insert_menu(&self, shop_id: &str, menu: Menu) {
        let mut shops = self.shops.write().unwrap_or_else(PoisonError::into_inner);
        shops.insert(shop_id.to_string(), menu);
    }

    /// Price an order against a shop's menu.
    ///
    /// An unknown pizza id invalidates the whole order. Unknown size or topping references are
    /// logged and skipped; the rest of the line still counts.
    pub fn price_order(&self, shop_id: &str, items: &[LineItem]) -> Result<Cents, CatalogError> {
        let shops = self.shops.read().unwrap_or_else(PoisonError::into_inner);
        let menu = shops.get(shop_id).ok_or_else(|| CatalogError::UnknownShop(shop_id.to_string()))?;
        let mut amount = Cents::default();
        for item in items {
            let pizza = menu.pizza(item.id).ok_or_else(|| {
                info!("Invalid pizza id: {} {shop_id}", item.id);
                CatalogError::UnknownProduct(item.id)
            })?;
            amount = amount + pizza.price;
            if let Some(size) = item.size {
                match menu.size(size) {
                    Some(s) => amount = amount + s.price,
                    None => info!("Invalid size: {size} {shop_id}"),
                }
            }
            for topping in &item.toppings {
                match menu.topping(*topping) {
                    Some(t) => amount = amount + t.price,
                    None => info!("Invalid topping: {topping} {shop_id}"),
                }
            }
        }
        Ok(amount)
    }
}

fn generate_menu(shop_id: &str) -> Menu {
    let mut rng = rand::thread_rng();
    let toppings = ["garlic", "extra cheese", "pepperoni"]
        .iter()
        .enumerate()
        .map(|(i, name)| Topping {
            id: i as u32 + 1,
            name: (*name).to_string(),
            price: Cents::from(rng.gen_range(2..12)),
        })
        .collect();
    let sizes = [28u32, 32, 36]
        .iter()
        .enumerate()
        .map(|(i, d)| SizeOption { id: *d, name: format!("{d} cm"), price: Cents::from(i as i64 * 5) })
        .collect();
    let mut selection = vec![
        "Roma".to_string(),
        "Milan".to_string(),
        "Bologna".to_string(),
        "Parma".to_string(),
        "Venice".to_string(),
        "Pomodoro".to_string(),
        "Quattro Stagioni".to_string(),
        "Vegan".to_string(),
        format!("of {}", capitalize(shop_id)),
    ];
    selection.shuffle(&mut rng);
    let count = rng.gen_range(4..selection.len());
    let pizzas = selection
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(i, name)| {
            let image = format!("images/{shop_id}/{}.jpg", name.to_lowercase().replace(' ', "_"));
            Pizza {
                id: i as u32 + 1,
                name: format!("Pizza {name}"),
                image,
                price: Cents::from(rng.gen_range(35..55)),
            }
        })
        .collect();
    Menu { pizzas, sizes, toppings }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
