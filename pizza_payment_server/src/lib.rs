//! # Pizza payment server
//! This module hosts the HTTP front end of the pizza payment gateway. It is responsible for:
//! Accepting order submissions from storefront pages and handing back payment details.
//! Receiving shortlink-scan and payment-outcome callbacks from the MPay gateway.
//! Suspending storefront status polls until the order settles.
//! Serving the per-shop product catalog.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! All routes except the health check live under the `/api` scope:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/orders/{shop_id}`: Order submission.
//! * `/api/poll/{order_id}`: Long poll for the payment outcome of an order.
//! * `/api/callback/shortlink/{order_id}`: MPay reports a shortlink scan.
//! * `/api/callback/payment/{gateway_transaction_id}`: MPay reports an authorization outcome.
//! * `/api/products/{shop_id}/{category}`: Product listings, with an optional `/{id}` suffix.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod integrations;
pub mod reaper;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
