use std::{fmt::Debug, time::Duration};

use log::*;
use ppg_common::DEFAULT_CURRENCY_CODE;

use crate::{
    catalog::{LineItem, ShopCatalog},
    db_types::{NewTransaction, OrderId, Transaction, TransactionStatus},
    events::{EventProducers, OrderSettledEvent},
    helpers::derive_order_id,
    notify::NotificationHub,
    ppe_api::{
        errors::OrderFlowError,
        order_objects::{OrderSummary, PollOutcome},
    },
    traits::{AuthorizationRequest, PaymentGatewayClient, TransactionStore, TransactionStoreError},
};

/// Knobs for the order flow that the server layer sets once at startup.
#[derive(Debug, Clone)]
pub struct OrderFlowSettings {
    /// Public base URL of this server, without a trailing slash. Poll and callback URIs are
    /// derived from it.
    pub base_url: String,
    /// ISO 4217 code sent with every authorization request
    pub currency: String,
    pub allow_credit: bool,
    /// How long a status poll may stay suspended before it resolves empty-handed
    pub poll_timeout: Duration,
}

impl Default for OrderFlowSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8888".to_string(),
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            allow_credit: false,
            poll_timeout: Duration::from_secs(30),
        }
    }
}

/// `OrderFlowApi` is the primary API for driving an order from submission through payment
/// settlement in response to storefront requests and gateway callbacks.
pub struct OrderFlowApi<S, G> {
    store: S,
    gateway: G,
    catalog: ShopCatalog,
    hub: NotificationHub,
    producers: EventProducers,
    settings: OrderFlowSettings,
}

impl<S, G> Debug for OrderFlowApi<S, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<S, G> OrderFlowApi<S, G> {
    pub fn new(store: S, gateway: G, catalog: ShopCatalog, settings: OrderFlowSettings, producers: EventProducers) -> Self {
        Self { store, gateway, catalog, hub: NotificationHub::new(), producers, settings }
    }

    pub fn catalog(&self) -> &ShopCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &OrderFlowSettings {
        &self.settings
    }
}

impl<S, G> OrderFlowApi<S, G>
where
    S: TransactionStore,
    G: PaymentGatewayClient,
{
    /// Submit an order for a shop.
    ///
    /// The order id is derived from the customer, the shop and the raw order content, so
    /// resubmitting the same basket returns the existing order rather than creating a second one.
    /// A payment shortlink is issued for the order the first time it is seen; resubmissions reuse
    /// it. The returned summary carries everything the storefront needs to take payment.
    pub async fn submit_order(
        &self,
        shop_id: &str,
        customer_ref: &str,
        content: &[u8],
    ) -> Result<OrderSummary, OrderFlowError> {
        let items: Vec<LineItem> = serde_json::from_slice(content).map_err(|e| {
            info!("🔄️🧾️ Order content for shop {shop_id} does not parse: {e}");
            OrderFlowError::InvalidContent(e.to_string())
        })?;
        let amount = self.catalog.price_order(shop_id, &items)?;
        if !amount.is_positive() {
            info!("🔄️🧾️ Order for shop {shop_id} prices to {amount}. Rejecting it");
            return Err(OrderFlowError::InvalidContent("an order must contain at least one priced item".to_string()));
        }
        let order_id = derive_order_id(customer_ref, shop_id, content);
        let new_tx = NewTransaction::new(order_id.clone(), shop_id.to_string(), customer_ref.to_string(), amount);
        let (tx, created) = self.store.insert_transaction(new_tx).await?;
        if created {
            info!("🔄️🧾️ Created order {order_id} for shop {shop_id} at {amount}");
        } else {
            debug!("🔄️🧾️ Order {order_id} was submitted again. Reusing the existing record");
        }
        let shortlink_id = match &tx.shortlink_id {
            Some(shortlink_id) => shortlink_id.clone(),
            None => {
                let callback_uri = format!("{}/api/callback/shortlink/", self.settings.base_url);
                let shortlink_id = self.gateway.issue_shortlink(&callback_uri).await?;
                self.store.record_shortlink(&order_id, &shortlink_id).await?;
                debug!("🔄️🧾️ Shortlink {shortlink_id} recorded for order {order_id}");
                shortlink_id
            },
        };
        Ok(OrderSummary {
            amount: tx.amount,
            poll_uri: format!("{}/api/poll/{}", self.settings.base_url, order_id.as_str()),
            qrcode_url: self.gateway.shortlink_qr_url(&shortlink_id, &order_id),
            id: order_id,
        })
    }

    /// A customer scanned the order's shortlink.
    ///
    /// Asks the gateway to reserve the funds and moves the order to `AuthorizationRequested`. A
    /// repeated scan of an order that has already left `Created` changes nothing and returns the
    /// current record. If a concurrent scan wins the transition race, the loser's gateway round
    /// trip is discarded and the stored state is returned.
    pub async fn handle_shortlink_scan(
        &self,
        order_id: &OrderId,
        customer_token: &str,
    ) -> Result<Transaction, OrderFlowError> {
        let tx = self.fetch(order_id).await?;
        if tx.status != TransactionStatus::Created {
            debug!("🔄️📱️ Order {order_id} is already {}. Ignoring the repeated scan", tx.status);
            return Ok(tx);
        }
        let request = AuthorizationRequest {
            amount: tx.amount,
            currency: self.settings.currency.clone(),
            customer_token: customer_token.to_string(),
            pos_id: tx.shop_id.clone(),
            pos_tid: order_id.as_str().to_string(),
            callback_uri: format!("{}/api/callback/payment/", self.settings.base_url),
            allow_credit: self.settings.allow_credit,
            receipt_text: tx.shop_id.clone(),
        };
        let gateway_id = self.gateway.request_authorization(request).await?;
        match self.store.mark_authorization_requested(order_id, &gateway_id).await {
            Ok(tx) => {
                info!("🔄️📱️ Authorization requested for order {order_id}. Gateway transaction {gateway_id}");
                Ok(tx)
            },
            Err(TransactionStoreError::IllegalStatusChange { from, to }) => {
                warn!("🔄️📱️ A concurrent scan moved order {order_id} first. {from} -> {to} was refused");
                self.fetch(order_id).await
            },
            Err(e) => Err(e.into()),
        }
    }

    /// The gateway reported the outcome of an authorization.
    ///
    /// A decline settles the order as `Rejected`. A success notice triggers the capture call;
    /// the order settles as `Captured` if it succeeds and `CaptureFailed` if it does not. The
    /// first callback to settle the order wakes its pollers and publishes the settlement event.
    /// Repeats of a callback that has already settled the order change nothing.
    pub async fn handle_payment_result(
        &self,
        gateway_id: &str,
        is_decline: bool,
    ) -> Result<Transaction, OrderFlowError> {
        let tx = self.fetch_by_gateway_id(gateway_id).await?;
        if tx.status.is_terminal() {
            debug!("🔄️💰️ Order {} has already settled as {}. Ignoring the repeated callback", tx.order_id, tx.status);
            return Ok(tx);
        }
        let verdict = if is_decline {
            info!("🔄️💰️ Payment for order {} was declined by the gateway", tx.order_id);
            TransactionStatus::Rejected
        } else {
            match self.gateway.capture_payment(gateway_id).await {
                Ok(()) => {
                    info!("🔄️💰️ Payment captured for order {}. Gateway transaction {gateway_id}", tx.order_id);
                    TransactionStatus::Captured
                },
                Err(e) => {
                    warn!("🔄️💰️ Payment capture failed for order {}: {e}", tx.order_id);
                    TransactionStatus::CaptureFailed
                },
            }
        };
        match self.store.finalize_by_gateway_id(gateway_id, verdict).await {
            Ok(tx) => {
                info!("🔄️💰️ Order {} settled as {}", tx.order_id, tx.status);
                self.hub.notify(&tx.order_id);
                self.call_order_settled_hook(&tx).await;
                Ok(tx)
            },
            Err(TransactionStoreError::IllegalStatusChange { from, to }) => {
                warn!("🔄️💰️ A concurrent callback settled order {} first. {from} -> {to} was refused", tx.order_id);
                self.fetch_by_gateway_id(gateway_id).await
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Reports whether the order's payment has been captured, suspending the caller until the
    /// order settles or the configured wait elapses.
    pub async fn poll_status(&self, order_id: &OrderId) -> Result<PollOutcome, OrderFlowError> {
        let tx = self.fetch(order_id).await?;
        if tx.status.is_terminal() {
            trace!("🔄️⏳️ Order {order_id} has already settled. Answering the poll immediately");
            return Ok(PollOutcome::Settled { captured: tx.status == TransactionStatus::Captured });
        }
        let ticket = self.hub.register(order_id);
        // The order may have settled between the fetch and the registration.
        let tx = self.fetch(order_id).await?;
        if tx.status.is_terminal() {
            return Ok(PollOutcome::Settled { captured: tx.status == TransactionStatus::Captured });
        }
        debug!("🔄️⏳️ Suspending a poll for order {order_id} for up to {:?}", self.settings.poll_timeout);
        match tokio::time::timeout(self.settings.poll_timeout, ticket.wait()).await {
            Ok(()) => {
                let tx = self.fetch(order_id).await?;
                debug!("🔄️⏳️ A poll for order {order_id} woke with status {}", tx.status);
                Ok(PollOutcome::Settled { captured: tx.status == TransactionStatus::Captured })
            },
            Err(_) => {
                debug!("🔄️⏳️ A poll for order {order_id} timed out");
                Ok(PollOutcome::TimedOut)
            },
        }
    }

    async fn call_order_settled_hook(&self, tx: &Transaction) {
        for emitter in &self.producers.order_settled_producer {
            debug!("🔄️📬️ Notifying order settled hook subscribers");
            let event = OrderSettledEvent::new(tx.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn fetch(&self, order_id: &OrderId) -> Result<Transaction, OrderFlowError> {
        self.store
            .fetch_transaction(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))
    }

    async fn fetch_by_gateway_id(&self, gateway_id: &str) -> Result<Transaction, OrderFlowError> {
        self.store
            .fetch_transaction_by_gateway_id(gateway_id)
            .await?
            .ok_or_else(|| OrderFlowError::GatewayTransactionNotFound(gateway_id.to_string()))
    }
}
