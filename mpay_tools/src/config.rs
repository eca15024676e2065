use log::*;
use ppg_common::Secret;

#[derive(Debug, Clone, Default)]
pub struct MpayConfig {
    /// Base URL of the merchant API, with a trailing slash.
    pub endpoint: String,
    pub merchant_id: String,
    pub user_id: String,
    pub secret: Secret<String>,
    pub testbed_token: Secret<String>,
    pub serial_number: Option<String>,
    /// Base URL of the gateway-hosted QR image service.
    pub qr_base: String,
}

impl MpayConfig {
    pub fn new_from_env_or_default() -> Self {
        let endpoint = std::env::var("PPG_MPAY_ENDPOINT").unwrap_or_else(|_| {
            warn!("PPG_MPAY_ENDPOINT not set, using the public testbed endpoint");
            "https://mpay-testbed.appspot.com/merchant/v1/".to_string()
        });
        let merchant_id = std::env::var("PPG_MPAY_MERCHANT").unwrap_or_else(|_| {
            warn!("PPG_MPAY_MERCHANT not set, using (probably useless default");
            "demo-merchant".to_string()
        });
        let user_id = std::env::var("PPG_MPAY_USER").unwrap_or_else(|_| {
            warn!("PPG_MPAY_USER not set, using (probably useless default");
            "demo-user".to_string()
        });
        let secret = Secret::new(std::env::var("PPG_MPAY_SECRET").unwrap_or_else(|_| {
            warn!("PPG_MPAY_SECRET not set, using (probably useless default");
            "SECRET_00000000000000".to_string()
        }));
        let testbed_token = Secret::new(std::env::var("PPG_MPAY_TESTBED_TOKEN").unwrap_or_else(|_| {
            warn!("PPG_MPAY_TESTBED_TOKEN not set, using (probably useless default");
            "00000000000000".to_string()
        }));
        let serial_number = std::env::var("PPG_MPAY_SERIAL_NUMBER").ok();
        let qr_base = std::env::var("PPG_MPAY_QR_BASE").unwrap_or_else(|_| {
            warn!("PPG_MPAY_QR_BASE not set, using the public QR image service");
            "https://api.mpay.example/shortlink/v1/qr_image".to_string()
        });
        Self { endpoint, merchant_id, user_id, secret, testbed_token, serial_number, qr_base }
    }
}
