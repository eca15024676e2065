use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use ppg_common::Cents;
use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------  TransactionStatus  ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// The order exists and a payment shortlink has been issued, but nobody has scanned it yet.
    Created,
    /// A customer scanned the shortlink and the gateway has been asked to reserve the funds.
    AuthorizationRequested,
    /// The reserved funds were captured. The order is paid. Terminal.
    Captured,
    /// The gateway declined the payment. Terminal.
    Rejected,
    /// The funds were reserved but the capture call failed. Terminal.
    CaptureFailed,
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Captured | Self::Rejected | Self::CaptureFailed)
    }

    /// The forward-only transition table. Everything not listed here, including every transition
    /// out of a terminal state, is illegal.
    pub fn can_transition_to(self, next: Self) -> bool {
        use TransactionStatus::*;
        matches!(
            (self, next),
            (Created, AuthorizationRequested) |
                (Created, Rejected) |
                (AuthorizationRequested, Captured) |
                (AuthorizationRequested, CaptureFailed) |
                (AuthorizationRequested, Rejected)
        )
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Created => write!(f, "Created"),
            TransactionStatus::AuthorizationRequested => write!(f, "AuthorizationRequested"),
            TransactionStatus::Captured => write!(f, "Captured"),
            TransactionStatus::Rejected => write!(f, "Rejected"),
            TransactionStatus::CaptureFailed => write!(f, "CaptureFailed"),
        }
    }
}

impl From<String> for TransactionStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid transaction status: {value}. But this conversion cannot fail. Defaulting to Created");
            TransactionStatus::Created
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

impl FromStr for TransactionStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(Self::Created),
            "AuthorizationRequested" => Ok(Self::AuthorizationRequested),
            "Captured" => Ok(Self::Captured),
            "Rejected" => Ok(Self::Rejected),
            "CaptureFailed" => Ok(Self::CaptureFailed),
            s => Err(ConversionError(format!("Invalid transaction status: {s}"))),
        }
    }
}

//--------------------------------------       OrderId       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     Transaction     ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub order_id: OrderId,
    /// The shop whose catalog priced this order
    pub shop_id: String,
    /// The session token of the ordering customer
    pub customer_ref: String,
    /// The total price, fixed at creation
    pub amount: Cents,
    pub status: TransactionStatus,
    /// Assigned by the gateway once an authorization has been requested
    pub gateway_transaction_id: Option<String>,
    /// The payment shortlink issued for this order
    pub shortlink_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------    NewTransaction   ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// The derived identifier covering the customer, the shop and the order content
    pub order_id: OrderId,
    pub shop_id: String,
    pub customer_ref: String,
    /// The total price of the order
    pub amount: Cents,
}

impl NewTransaction {
    pub fn new(order_id: OrderId, shop_id: String, customer_ref: String, amount: Cents) -> Self {
        Self { order_id, shop_id, customer_ref, amount }
    }

    pub fn is_equivalent(&self, tx: &Transaction) -> bool {
        self.order_id == tx.order_id
            && self.shop_id == tx.shop_id
            && self.customer_ref == tx.customer_ref
            && self.amount == tx.amount
    }
}

impl From<NewTransaction> for Transaction {
    fn from(tx: NewTransaction) -> Self {
        Self {
            order_id: tx.order_id,
            shop_id: tx.shop_id,
            customer_ref: tx.customer_ref,
            amount: tx.amount,
            status: TransactionStatus::Created,
            gateway_transaction_id: None,
            shortlink_id: None,
            created_at: Utc::now(),
        }
    }
}
