use ppg_common::Cents;
use thiserror::Error;

use crate::db_types::OrderId;

/// Everything the gateway needs to reserve the funds for an order.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub amount: Cents,
    pub currency: String,
    /// The token identifying the customer who scanned the shortlink
    pub customer_token: String,
    /// Point-of-sale identifier shown to the customer. We use the shop id.
    pub pos_id: String,
    /// Point-of-sale transaction reference. We use the order id.
    pub pos_tid: String,
    /// Where the gateway reports the authorization outcome
    pub callback_uri: String,
    pub allow_credit: bool,
    /// Free text for the customer's receipt
    pub receipt_text: String,
}

/// The outbound payment gateway contract.
///
/// Implementations perform the three gateway operations of the payment flow. Any non-success
/// answer from the gateway surfaces as [`GatewayError::Unavailable`]; retry policy is the
/// caller's decision, never the client's.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayClient: Clone {
    /// Asks the gateway for a fresh payment shortlink. Scans are reported to `callback_uri` with
    /// the scan argument appended as the final path segment.
    async fn issue_shortlink(&self, callback_uri: &str) -> Result<String, GatewayError>;

    /// Asks the gateway to reserve the funds. Returns the gateway's transaction id; the verdict
    /// arrives later on the request's callback URI.
    async fn request_authorization(&self, request: AuthorizationRequest) -> Result<String, GatewayError>;

    /// Finalizes the transfer of previously reserved funds.
    async fn capture_payment(&self, gateway_transaction_id: &str) -> Result<(), GatewayError>;

    /// The URL of the gateway-hosted QR image for a shortlink, with the order id baked in as the
    /// scan argument.
    fn shortlink_qr_url(&self, shortlink_id: &str, order_id: &OrderId) -> String;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway could not service the request. Code {code}. {message}")]
    Unavailable { code: u16, message: String },
    #[error("The payment gateway sent a response we could not interpret: {0}")]
    MalformedResponse(String),
}
