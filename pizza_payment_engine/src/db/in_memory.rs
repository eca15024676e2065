use std::{collections::HashMap, sync::Arc};

use chrono::{Duration, Utc};
use log::*;
use tokio::sync::RwLock;

use crate::{
    db_types::{NewTransaction, OrderId, Transaction, TransactionStatus},
    traits::{TransactionStore, TransactionStoreError},
};

#[derive(Debug, Default)]
struct StoreInner {
    transactions: HashMap<OrderId, Transaction>,
    /// Maps the gateway's transaction id back to ours
    gateway_index: HashMap<String, OrderId>,
}

/// The process-local [`TransactionStore`] backend.
///
/// Every operation takes the lock exactly once and never awaits while holding it. That single
/// acquisition per operation is what serializes transitions on the same order, including the
/// lookup-validate-apply sequence of [`finalize_by_gateway_id`](Self::finalize_by_gateway_id).
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionStore for InMemoryStore {
    async fn insert_transaction(&self, tx: NewTransaction) -> Result<(Transaction, bool), TransactionStoreError> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.transactions.get(&tx.order_id) {
            if !tx.is_equivalent(existing) {
                warn!(
                    "📇️ Resubmission of order {} does not match the stored transaction. Keeping the stored one.",
                    tx.order_id
                );
            }
            return Ok((existing.clone(), false));
        }
        let record = Transaction::from(tx);
        debug!("📇️ Storing new transaction {} for shop {}", record.order_id, record.shop_id);
        inner.transactions.insert(record.order_id.clone(), record.clone());
        Ok((record, true))
    }

    async fn fetch_transaction(&self, order_id: &OrderId) -> Result<Option<Transaction>, TransactionStoreError> {
        let inner = self.inner.read().await;
        Ok(inner.transactions.get(order_id).cloned())
    }

    async fn fetch_transaction_by_gateway_id(
        &self,
        gateway_id: &str,
    ) -> Result<Option<Transaction>, TransactionStoreError> {
        let inner = self.inner.read().await;
        let tx = inner.gateway_index.get(gateway_id).and_then(|id| inner.transactions.get(id)).cloned();
        Ok(tx)
    }

    async fn record_shortlink(
        &self,
        order_id: &OrderId,
        shortlink_id: &str,
    ) -> Result<Transaction, TransactionStoreError> {
        let mut inner = self.inner.write().await;
        let tx = inner
            .transactions
            .get_mut(order_id)
            .ok_or_else(|| TransactionStoreError::TransactionNotFound(order_id.clone()))?;
        tx.shortlink_id = Some(shortlink_id.to_string());
        Ok(tx.clone())
    }

    async fn mark_authorization_requested(
        &self,
        order_id: &OrderId,
        gateway_id: &str,
    ) -> Result<Transaction, TransactionStoreError> {
        let mut inner = self.inner.write().await;
        let tx = inner
            .transactions
            .get_mut(order_id)
            .ok_or_else(|| TransactionStoreError::TransactionNotFound(order_id.clone()))?;
        let next = TransactionStatus::AuthorizationRequested;
        if !tx.status.can_transition_to(next) {
            return Err(TransactionStoreError::IllegalStatusChange { from: tx.status, to: next });
        }
        tx.status = next;
        tx.gateway_transaction_id = Some(gateway_id.to_string());
        let tx = tx.clone();
        inner.gateway_index.insert(gateway_id.to_string(), order_id.clone());
        Ok(tx)
    }

    async fn finalize_by_gateway_id(
        &self,
        gateway_id: &str,
        status: TransactionStatus,
    ) -> Result<Transaction, TransactionStoreError> {
        let mut inner = self.inner.write().await;
        let order_id = inner
            .gateway_index
            .get(gateway_id)
            .cloned()
            .ok_or_else(|| TransactionStoreError::GatewayIdNotFound(gateway_id.to_string()))?;
        let tx = inner
            .transactions
            .get_mut(&order_id)
            .ok_or_else(|| TransactionStoreError::TransactionNotFound(order_id.clone()))?;
        if !status.is_terminal() || !tx.status.can_transition_to(status) {
            return Err(TransactionStoreError::IllegalStatusChange { from: tx.status, to: status });
        }
        debug!("📇️ Transaction for order {order_id} moved from {} to {status}", tx.status);
        tx.status = status;
        Ok(tx.clone())
    }

    async fn reap_older_than(&self, max_age: Duration) -> Result<Vec<Transaction>, TransactionStoreError> {
        let mut inner = self.inner.write().await;
        let cutoff = Utc::now() - max_age;
        let stale: Vec<OrderId> = inner
            .transactions
            .values()
            .filter(|tx| tx.created_at < cutoff)
            .map(|tx| tx.order_id.clone())
            .collect();
        let mut reaped = Vec::with_capacity(stale.len());
        for order_id in stale {
            if let Some(tx) = inner.transactions.remove(&order_id) {
                if let Some(gateway_id) = &tx.gateway_transaction_id {
                    inner.gateway_index.remove(gateway_id);
                }
                reaped.push(tx);
            }
        }
        Ok(reaped)
    }
}
