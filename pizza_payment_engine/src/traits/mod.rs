//! # Engine backend contracts
//!
//! This module defines the interface contracts of the payment engine's external seams.
//!
//! * [`TransactionStore`] is the storage contract: idempotent order creation and validated,
//!   forward-only status transitions. Each operation is atomic with respect to concurrent callers
//!   touching the same order, which is the only concurrency discipline the engine relies on.
//! * [`PaymentGatewayClient`] is the outbound payment gateway contract: issuing shortlinks,
//!   requesting authorizations and capturing reserved funds. The production implementation talks
//!   to MPay; tests substitute a scripted double.
mod payment_gateway;
mod transaction_store;

pub use payment_gateway::{AuthorizationRequest, GatewayError, PaymentGatewayClient};
pub use transaction_store::{TransactionStore, TransactionStoreError};
