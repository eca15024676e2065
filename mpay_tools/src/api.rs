use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    config::MpayConfig,
    data_objects::{NewShortlink, PaymentRequest},
    MpayApiError,
};

#[derive(Clone)]
pub struct MpayApi {
    config: MpayConfig,
    client: Arc<Client>,
}

impl MpayApi {
    pub fn new(config: MpayConfig) -> Result<Self, MpayApiError> {
        let mut headers = HeaderMap::with_capacity(5);
        let merchant = HeaderValue::from_str(config.merchant_id.as_str())
            .map_err(|e| MpayApiError::Initialization(e.to_string()))?;
        headers.insert("X-Mpay-Merchant", merchant);
        let user = HeaderValue::from_str(config.user_id.as_str())
            .map_err(|e| MpayApiError::Initialization(e.to_string()))?;
        headers.insert("X-Mpay-User", user);
        let auth = HeaderValue::from_str(config.secret.reveal().as_str())
            .map_err(|e| MpayApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", auth);
        let token = HeaderValue::from_str(config.testbed_token.reveal().as_str())
            .map_err(|e| MpayApiError::Initialization(e.to_string()))?;
        headers.insert("X-Testbed-Token", token);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| MpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, MpayApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| MpayApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| MpayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| MpayApiError::RestResponseError(e.to_string()))?;
            Err(MpayApiError::QueryError { status, message })
        }
    }

    /// As [`Self::rest_query`], but for endpoints whose success responses carry no body.
    pub async fn rest_send<B: Serialize>(&self, method: Method, path: &str, body: B) -> Result<(), MpayApiError> {
        let url = self.url(path);
        trace!("Sending REST command: {url}");
        let req = self.client.request(method, url).json(&body);
        let response = req.send().await.map_err(|e| MpayApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST command successful. {}", response.status());
            Ok(())
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| MpayApiError::RestResponseError(e.to_string()))?;
            Err(MpayApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.endpoint)
    }

    /// Register a payment shortlink with the gateway. Scans of the shortlink (or of the QR image
    /// that encodes it) are reported to `callback_uri`.
    pub async fn register_shortlink(&self, callback_uri: &str) -> Result<String, MpayApiError> {
        #[derive(Deserialize)]
        struct ShortlinkResponse {
            id: String,
        }
        let link = NewShortlink::new(callback_uri, self.config.serial_number.clone());
        debug!("Registering shortlink reporting to {callback_uri}");
        let result = self.rest_query::<ShortlinkResponse, NewShortlink>(Method::POST, "shortlink/", Some(link)).await?;
        info!("Shortlink generated: {callback_uri} {}", result.id);
        Ok(result.id)
    }

    /// Submit an authorization request and return the gateway's transaction id for it. The gateway
    /// reports the outcome asynchronously to the request's callback URI.
    pub async fn create_payment_request(&self, request: &PaymentRequest) -> Result<String, MpayApiError> {
        #[derive(Deserialize)]
        struct PaymentRequestResponse {
            id: String,
        }
        debug!("Creating authorization request for {}", request.pos_tid);
        let result = self
            .rest_query::<PaymentRequestResponse, &PaymentRequest>(Method::POST, "payment_request/", Some(request))
            .await?;
        info!("Authorization request accepted: {} {}", request.pos_tid, result.id);
        Ok(result.id)
    }

    /// Capture a previously authorized payment request.
    pub async fn capture_payment(&self, transaction_id: &str) -> Result<(), MpayApiError> {
        let path = format!("payment_request/{transaction_id}/");
        debug!("Capturing payment request {transaction_id}");
        self.rest_send(Method::PUT, &path, serde_json::json!({ "action": "capture" })).await?;
        info!("Payment request {transaction_id} captured");
        Ok(())
    }

    /// The gateway-hosted QR image for a shortlink, with the order id baked in as the scan
    /// argument.
    pub fn qr_code_url(&self, shortlink_id: &str, argument: &str) -> String {
        format!("{}/{shortlink_id}/{argument}", self.config.qr_base)
    }
}
