mod api;
mod config;
mod error;

mod data_objects;

pub use api::MpayApi;
pub use config::MpayConfig;
pub use data_objects::{CallbackObject, MpayCallback, NewShortlink, PaymentRequest};
pub use error::MpayApiError;
