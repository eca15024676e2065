use chrono::Duration;
use thiserror::Error;

use crate::db_types::{NewTransaction, OrderId, Transaction, TransactionStatus};

/// The storage contract for payment transactions.
///
/// Backends must guarantee that each method is atomic with respect to concurrent calls touching
/// the same order: two tasks racing on one record must behave as if they ran one after the other.
/// That discipline is what makes [`insert_transaction`](TransactionStore::insert_transaction)
/// collapse duplicate submissions and what keeps duplicate gateway callbacks from applying a
/// terminal status twice.
#[allow(async_fn_in_trait)]
pub trait TransactionStore: Clone {
    /// Stores a new transaction, unless one with the same order id already exists.
    ///
    /// This call is idempotent. Exactly one record results no matter how many concurrent callers
    /// derive the same order id. Returns the stored transaction, and true if this call created it.
    async fn insert_transaction(&self, tx: NewTransaction) -> Result<(Transaction, bool), TransactionStoreError>;

    async fn fetch_transaction(&self, order_id: &OrderId) -> Result<Option<Transaction>, TransactionStoreError>;

    /// Reverse lookup for payment callbacks, which only carry the gateway's transaction id.
    async fn fetch_transaction_by_gateway_id(
        &self,
        gateway_id: &str,
    ) -> Result<Option<Transaction>, TransactionStoreError>;

    /// Records the shortlink the gateway issued for this order. The order keeps its status.
    async fn record_shortlink(
        &self,
        order_id: &OrderId,
        shortlink_id: &str,
    ) -> Result<Transaction, TransactionStoreError>;

    /// Moves a `Created` transaction to `AuthorizationRequested` and stores the gateway's
    /// transaction id, indexing it for reverse lookup. Any other starting status fails with
    /// [`TransactionStoreError::IllegalStatusChange`] and leaves the record untouched.
    async fn mark_authorization_requested(
        &self,
        order_id: &OrderId,
        gateway_id: &str,
    ) -> Result<Transaction, TransactionStoreError>;

    /// Applies a terminal status to the transaction carrying `gateway_id`.
    ///
    /// The transition is validated against the status transition table under the same exclusive
    /// access as the lookup, so a duplicate callback or a regression attempt fails with
    /// [`TransactionStoreError::IllegalStatusChange`] and leaves the record untouched.
    async fn finalize_by_gateway_id(
        &self,
        gateway_id: &str,
        status: TransactionStatus,
    ) -> Result<Transaction, TransactionStoreError>;

    /// Removes and returns every transaction created more than `max_age` ago, whatever its status.
    async fn reap_older_than(&self, max_age: Duration) -> Result<Vec<Transaction>, TransactionStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionStoreError {
    #[error("The requested transaction {0} does not exist")]
    TransactionNotFound(OrderId),
    #[error("No transaction carries the gateway transaction id {0}")]
    GatewayIdNotFound(String),
    #[error("Illegal status change. {from} -> {to} is not allowed")]
    IllegalStatusChange { from: TransactionStatus, to: TransactionStatus },
}
