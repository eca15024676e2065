use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    db_types::OrderId,
    traits::{AuthorizationRequest, GatewayError, PaymentGatewayClient},
};

/// One call made against the [`TestGateway`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    IssueShortlink { callback_uri: String },
    RequestAuthorization { customer_token: String, pos_id: String, pos_tid: String, callback_uri: String },
    CapturePayment { gateway_transaction_id: String },
}

#[derive(Debug, Default)]
struct GatewayState {
    calls: Vec<GatewayCall>,
    fail_shortlinks: bool,
    fail_authorizations: bool,
    fail_captures: bool,
    serial: u64,
}

/// A scripted stand-in for the payment gateway.
///
/// Issues predictable ids (`SL-1`, `GWTX-2`, ...), records every call it receives and can be told
/// to fail any of the three operations with a gateway error.
#[derive(Debug, Clone, Default)]
pub struct TestGateway {
    state: Arc<Mutex<GatewayState>>,
}

impl TestGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GatewayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn fail_shortlinks(&self, fail: bool) {
        self.lock().fail_shortlinks = fail;
    }

    pub fn fail_authorizations(&self, fail: bool) {
        self.lock().fail_authorizations = fail;
    }

    pub fn fail_captures(&self, fail: bool) {
        self.lock().fail_captures = fail;
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    pub fn shortlink_count(&self) -> usize {
        self.lock().calls.iter().filter(|c| matches!(c, GatewayCall::IssueShortlink { .. })).count()
    }

    pub fn capture_count(&self) -> usize {
        self.lock().calls.iter().filter(|c| matches!(c, GatewayCall::CapturePayment { .. })).count()
    }

    fn unavailable() -> GatewayError {
        GatewayError::Unavailable { code: 503, message: "the testbed is down for maintenance".to_string() }
    }
}

impl PaymentGatewayClient for TestGateway {
    async fn issue_shortlink(&self, callback_uri: &str) -> Result<String, GatewayError> {
        let mut state = self.lock();
        state.calls.push(GatewayCall::IssueShortlink { callback_uri: callback_uri.to_string() });
        if state.fail_shortlinks {
            return Err(Self::unavailable());
        }
        state.serial += 1;
        Ok(format!("SL-{}", state.serial))
    }

    async fn request_authorization(&self, request: AuthorizationRequest) -> Result<String, GatewayError> {
        let mut state = self.lock();
        state.calls.push(GatewayCall::RequestAuthorization {
            customer_token: request.customer_token,
            pos_id: request.pos_id,
            pos_tid: request.pos_tid,
            callback_uri: request.callback_uri,
        });
        if state.fail_authorizations {
            return Err(Self::unavailable());
        }
        state.serial += 1;
        Ok(format!("GWTX-{}", state.serial))
    }

    async fn capture_payment(&self, gateway_transaction_id: &str) -> Result<(), GatewayError> {
        let mut state = self.lock();
        state
            .calls
            .push(GatewayCall::CapturePayment { gateway_transaction_id: gateway_transaction_id.to_string() });
        if state.fail_captures {
            return Err(Self::unavailable());
        }
        Ok(())
    }

    fn shortlink_qr_url(&self, shortlink_id: &str, order_id: &OrderId) -> String {
        format!("https://qr.test/{shortlink_id}/{}", order_id.as_str())
    }
}
