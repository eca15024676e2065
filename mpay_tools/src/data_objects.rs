use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewShortlink {
    pub callback_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

impl NewShortlink {
    pub fn new<S: Into<String>>(callback_uri: S, serial_number: Option<String>) -> Self {
        Self { callback_uri: callback_uri.into(), serial_number }
    }
}

/// An outbound two-phase payment request. Amounts are integers in minor currency units.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaymentRequest {
    pub amount: i64,
    pub currency: String,
    pub callback_uri: String,
    pub allow_credit: bool,
    pub customer: String,
    pub pos_id: String,
    pub pos_tid: String,
    pub action: String,
    pub text: String,
}

impl PaymentRequest {
    /// A new authorization (reserve) request. The matching capture is issued later with
    /// [`crate::MpayApi::capture_payment`].
    #[allow(clippy::too_many_arguments)]
    pub fn auth(
        amount: i64,
        currency: &str,
        customer: &str,
        pos_id: &str,
        pos_tid: &str,
        callback_uri: &str,
        allow_credit: bool,
        text: &str,
    ) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
            callback_uri: callback_uri.to_string(),
            allow_credit,
            customer: customer.to_string(),
            pos_id: pos_id.to_string(),
            pos_tid: pos_tid.to_string(),
            action: "auth".to_string(),
            text: text.to_string(),
        }
    }
}

/// The JSON body MPay POSTs to a registered callback URI. Scan and payment outcomes arrive wrapped
/// in `object`; housekeeping notices arrive as bare `{event, id}` pairs and carry no `object`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MpayCallback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<CallbackObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl MpayCallback {
    /// The scanning customer's token, present on shortlink-scan callbacks.
    pub fn customer_token(&self) -> Option<&str> {
        self.object.as_ref().and_then(|o| o.id.as_deref())
    }

    pub fn event_notice(&self) -> Option<(&str, &str)> {
        match (self.event.as_deref(), self.id.as_deref()) {
            (Some(event), Some(id)) => Some((event, id)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CallbackObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argstring: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl CallbackObject {
    /// Any status other than `fail` counts as a successful authorization.
    pub fn is_decline(&self) -> bool {
        matches!(self.status.as_deref(), Some("fail"))
    }
}
