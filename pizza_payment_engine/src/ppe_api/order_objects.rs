use ppg_common::Cents;
use serde::{Deserialize, Serialize};

use crate::db_types::OrderId;

/// What a customer gets back for a submitted order. The storefront renders the QR code and then
/// long-polls `poll_uri` until the payment settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    /// The total price in minor currency units, fixed for the life of the order
    pub amount: Cents,
    pub poll_uri: String,
    pub qrcode_url: String,
}

/// How a status poll resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The order reached a terminal status. `captured` is true only for a successful capture;
    /// declines and failed captures settle with false.
    Settled { captured: bool },
    /// The order was still in flight when the wait elapsed.
    TimedOut,
}
