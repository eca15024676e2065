use std::{env, time::Duration};

use chrono::Duration as ChronoDuration;
use log::*;
use mpay_tools::MpayConfig;
use pizza_payment_engine::OrderFlowSettings;
use ppg_common::{parse_boolean_flag, DEFAULT_CURRENCY_CODE};

const DEFAULT_PPG_HOST: &str = "127.0.0.1";
const DEFAULT_PPG_PORT: u16 = 8888;
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_ORDER_TTL: ChronoDuration = ChronoDuration::seconds(600);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// The public base URL of this server, without a trailing slash. Poll URIs handed to
    /// storefronts and callback URIs registered with the gateway are derived from it.
    pub base_url: String,
    /// ISO 4217 currency code sent with every authorization request
    pub currency: String,
    /// If true, customers may settle authorization requests on credit.
    pub allow_credit: bool,
    /// How long a status poll may stay suspended before it returns empty-handed
    pub poll_timeout: Duration,
    /// The time before an order is dropped from the store, whatever its status. Zero disables the
    /// sweep entirely.
    pub order_ttl: ChronoDuration,
    /// MPay merchant API configuration
    pub mpay: MpayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PPG_HOST.to_string(),
            port: DEFAULT_PPG_PORT,
            base_url: format!("http://{DEFAULT_PPG_HOST}:{DEFAULT_PPG_PORT}"),
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            allow_credit: false,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            order_ttl: DEFAULT_ORDER_TTL,
            mpay: MpayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("PPG_HOST").ok().unwrap_or_else(|| DEFAULT_PPG_HOST.into());
        let port = env::var("PPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for PPG_PORT. {e} Using the default, {DEFAULT_PPG_PORT}, instead."
                    );
                    DEFAULT_PPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PPG_PORT);
        let base_url = env::var("PPG_BASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ PPG_BASE_URL is not set. Assuming the server is reached at http://{host}:{port}.");
            format!("http://{host}:{port}")
        });
        let base_url = base_url.trim_end_matches('/').to_string();
        let currency = env::var("PPG_CURRENCY").ok().unwrap_or_else(|| {
            info!("🪛️ PPG_CURRENCY is not set. Using {DEFAULT_CURRENCY_CODE}.");
            DEFAULT_CURRENCY_CODE.to_string()
        });
        let allow_credit = parse_boolean_flag(env::var("PPG_ALLOW_CREDIT").ok(), false);
        let poll_timeout = configure_poll_timeout();
        let order_ttl = configure_order_ttl();
        let mpay = MpayConfig::new_from_env_or_default();
        Self { host, port, base_url, currency, allow_credit, poll_timeout, order_ttl, mpay }
    }

    /// The engine settings implied by this configuration.
    pub fn order_flow_settings(&self) -> OrderFlowSettings {
        OrderFlowSettings {
            base_url: self.base_url.clone(),
            currency: self.currency.clone(),
            allow_credit: self.allow_credit,
            poll_timeout: self.poll_timeout,
        }
    }
}

fn configure_poll_timeout() -> Duration {
    env::var("PPG_POLL_TIMEOUT")
        .map_err(|_| {
            info!("🪛️ PPG_POLL_TIMEOUT is not set. Using the default value of {} s.", DEFAULT_POLL_TIMEOUT.as_secs())
        })
        .and_then(|s| {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| warn!("🪛️ Invalid configuration value for PPG_POLL_TIMEOUT. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_POLL_TIMEOUT)
}

fn configure_order_ttl() -> ChronoDuration {
    env::var("PPG_ORDER_TTL")
        .map_err(|_| {
            info!("🪛️ PPG_ORDER_TTL is not set. Using the default value of {} s.", DEFAULT_ORDER_TTL.num_seconds())
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map(ChronoDuration::seconds)
                .map_err(|e| warn!("🪛️ Invalid configuration value for PPG_ORDER_TTL. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_ORDER_TTL)
}
