//! Pizza Payment Engine
//!
//! The Pizza Payment Engine drives the order and payment lifecycle for a storefront that settles
//! through the MPay mobile-payment gateway. This library contains the core logic for the engine.
//! It knows nothing about HTTP; the server crate maps requests and gateway callbacks onto it.
//!
//! The library is divided into three main sections:
//! 1. Storage ([`mod@db`]). Transactions live in a process-local store behind the
//!    [`TransactionStore`] trait. The store serializes status transitions per order, which is what
//!    keeps duplicate gateway callbacks from double-applying. State does not survive a restart.
//! 2. The engine public API ([`OrderFlowApi`]). This is the order lifecycle controller: it prices
//!    and accepts orders, turns shortlink scans into authorization requests, applies payment
//!    verdicts, and suspends status polls until the order settles (or a bounded wait elapses).
//! 3. Events ([`mod@events`]). Every settled order is published to subscribed hooks over a simple
//!    actor-style channel, so side effects like journalling live outside the engine.
mod db;

mod ppe_api;
mod traits;

pub mod catalog;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod notify;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use db::InMemoryStore;
pub use ppe_api::{
    errors::OrderFlowError,
    order_flow_api::{OrderFlowApi, OrderFlowSettings},
    order_objects,
};
pub use traits::{
    AuthorizationRequest,
    GatewayError,
    PaymentGatewayClient,
    TransactionStore,
    TransactionStoreError,
};
