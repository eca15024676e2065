use thiserror::Error;

#[derive(Debug, Error)]
pub enum MpayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}
