use chrono::Duration;
use mockall::mock;
use pizza_payment_engine::{
    db_types::{NewTransaction, OrderId, Transaction, TransactionStatus},
    TransactionStore,
    TransactionStoreError,
};

mock! {
    pub TransactionDb {}
    impl TransactionStore for TransactionDb {
        async fn insert_transaction(&self, tx: NewTransaction) -> Result<(Transaction, bool), TransactionStoreError>;
        async fn fetch_transaction(&self, order_id: &OrderId) -> Result<Option<Transaction>, TransactionStoreError>;
        async fn fetch_transaction_by_gateway_id(&self, gateway_id: &str) -> Result<Option<Transaction>, TransactionStoreError>;
        async fn record_shortlink(&self, order_id: &OrderId, shortlink_id: &str) -> Result<Transaction, TransactionStoreError>;
        async fn mark_authorization_requested(&self, order_id: &OrderId, gateway_id: &str) -> Result<Transaction, TransactionStoreError>;
        async fn finalize_by_gateway_id(&self, gateway_id: &str, status: TransactionStatus) -> Result<Transaction, TransactionStoreError>;
        async fn reap_older_than(&self, max_age: Duration) -> Result<Vec<Transaction>, TransactionStoreError>;
    }
    impl Clone for TransactionDb {
        fn clone(&self) -> Self;
    }
}
