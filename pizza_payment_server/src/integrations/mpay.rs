//----------------------------------------------   MPay  ----------------------------------------------------
use futures::future::BoxFuture;
use log::*;
use mpay_tools::{MpayApi, MpayApiError, MpayConfig, PaymentRequest};
use pizza_payment_engine::{
    db_types::{OrderId, TransactionStatus},
    events::{EventHandlers, EventHooks},
    AuthorizationRequest,
    GatewayError,
    PaymentGatewayClient,
};

use crate::errors::ServerError;

pub const SETTLEMENT_EVENT_BUFFER_SIZE: usize = 25;

/// The MPay-backed implementation of the engine's payment gateway contract.
///
/// This is a thin mapping layer: [`MpayApi`] owns the HTTP client, the credentials and the wire
/// formats, and this type translates between the engine's vocabulary and the merchant API's.
#[derive(Clone)]
pub struct MpayGateway {
    api: MpayApi,
}

impl MpayGateway {
    pub fn new(config: MpayConfig) -> Result<Self, ServerError> {
        let api = MpayApi::new(config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { api })
    }
}

impl PaymentGatewayClient for MpayGateway {
    async fn issue_shortlink(&self, callback_uri: &str) -> Result<String, GatewayError> {
        self.api.register_shortlink(callback_uri).await.map_err(into_gateway_error)
    }

    async fn request_authorization(&self, request: AuthorizationRequest) -> Result<String, GatewayError> {
        let request = PaymentRequest::auth(
            request.amount.value(),
            &request.currency,
            &request.customer_token,
            &request.pos_id,
            &request.pos_tid,
            &request.callback_uri,
            request.allow_credit,
            &request.receipt_text,
        );
        self.api.create_payment_request(&request).await.map_err(into_gateway_error)
    }

    async fn capture_payment(&self, gateway_transaction_id: &str) -> Result<(), GatewayError> {
        self.api.capture_payment(gateway_transaction_id).await.map_err(into_gateway_error)
    }

    fn shortlink_qr_url(&self, shortlink_id: &str, order_id: &OrderId) -> String {
        self.api.qr_code_url(shortlink_id, order_id.as_str())
    }
}

fn into_gateway_error(e: MpayApiError) -> GatewayError {
    match e {
        MpayApiError::QueryError { status, message } => GatewayError::Unavailable { code: status, message },
        MpayApiError::JsonError(m) => GatewayError::MalformedResponse(m),
        // No HTTP status was obtained, so the gateway counts as unreachable
        MpayApiError::RestResponseError(m) | MpayApiError::Initialization(m) => {
            GatewayError::Unavailable { code: 503, message: m }
        },
    }
}

/// Creates the event handlers that write the settlement journal.
///
/// The journal is the operator's audit trail: one log line per settled order, whatever the
/// verdict, driven off the engine's settlement event.
pub fn create_settlement_journal_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    // --- On OrderSettled Handler ---
    hooks.on_order_settled(move |ev| {
        let tx = ev.transaction;
        if !tx.status.is_terminal() {
            error!(
                "🧾️ An order settlement event arrived for order {} while it is still {}. This should never happen. \
                 Not journalling it.",
                tx.order_id, tx.status
            );
            return no_op();
        }
        Box::pin(async move {
            match tx.status {
                TransactionStatus::Captured => info!(
                    "🧾️ JOURNAL capture: order {} shop {} customer {} amount {}",
                    tx.order_id, tx.shop_id, tx.customer_ref, tx.amount
                ),
                TransactionStatus::Rejected => info!(
                    "🧾️ JOURNAL decline: order {} shop {} customer {} amount {}",
                    tx.order_id, tx.shop_id, tx.customer_ref, tx.amount
                ),
                TransactionStatus::CaptureFailed => warn!(
                    "🧾️ JOURNAL capture failure: order {} shop {} customer {} amount {}. The funds were reserved but \
                     never captured",
                    tx.order_id, tx.shop_id, tx.customer_ref, tx.amount
                ),
                _ => {},
            }
        })
    });
    EventHandlers::new(SETTLEMENT_EVENT_BUFFER_SIZE, hooks)
}

fn no_op() -> BoxFuture<'static, ()> {
    Box::pin(async {})
}
