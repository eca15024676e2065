use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use pizza_payment_engine::OrderFlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read the order content. {0}")]
    InvalidOrderContent(String),
    #[error("Could not read the callback body. {0}")]
    MalformedCallback(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The payment gateway could not service the request. {0}")]
    GatewayUnavailable(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidOrderContent(_) => StatusCode::BAD_REQUEST,
            Self::MalformedCallback(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::InvalidContent(_) => Self::InvalidOrderContent(e.to_string()),
            OrderFlowError::UnknownShop(_) |
            OrderFlowError::OrderNotFound(_) |
            OrderFlowError::GatewayTransactionNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderFlowError::Gateway(_) => Self::GatewayUnavailable(e.to_string()),
            OrderFlowError::Store(_) => Self::BackendError(e.to_string()),
        }
    }
}
