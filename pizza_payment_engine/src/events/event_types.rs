use crate::db_types::Transaction;

/// Fired whenever an order reaches a terminal status, whatever that status is.
///
/// Subscribers get the full transaction record as it stood at settlement, so they can distinguish
/// captures from declines without another store round trip.
#[derive(Debug, Clone)]
pub struct OrderSettledEvent {
    pub transaction: Transaction,
}

impl OrderSettledEvent {
    pub fn new(transaction: Transaction) -> Self {
        Self { transaction }
    }
}
