use thiserror::Error;

use crate::{
    catalog::CatalogError,
    db_types::OrderId,
    traits::{GatewayError, TransactionStoreError},
};

#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("The order content is invalid. {0}")]
    InvalidContent(String),
    #[error("No shop with id {0} has been provisioned")]
    UnknownShop(String),
    #[error("Order {0} is not known to this server")]
    OrderNotFound(OrderId),
    #[error("No order matches gateway transaction {0}")]
    GatewayTransactionNotFound(String),
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("Storage error: {0}")]
    Store(#[from] TransactionStoreError),
}

impl From<CatalogError> for OrderFlowError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownShop(shop_id) => OrderFlowError::UnknownShop(shop_id),
            e @ CatalogError::UnknownProduct(_) => OrderFlowError::InvalidContent(e.to_string()),
        }
    }
}
