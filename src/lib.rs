//! Marketplace Payout Service
//!
//! Computes fee/payout breakdowns for marketplace orders and records
//! payment distributions to producers.
//!
//! ## Features
//! - Pure cost/payout calculator (platform fee, gateway fee, net payout)
//! - Payment distribution with a one-record-per-order guarantee
//! - Breakdown presentation lines for dashboard display

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use thiserror::Error;

pub mod distribution;
pub mod domain;
pub mod store;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum PayoutError {
    #[error("Order not found")]
    OrderNotFound,

    #[error("Producer not found")]
    ProducerNotFound,

    #[error("Payment not found")]
    PaymentNotFound,

    #[error("Payment already distributed for this order")]
    AlreadyDistributed,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for PayoutError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl IntoResponse for PayoutError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::OrderNotFound | Self::ProducerNotFound | Self::PaymentNotFound => StatusCode::NOT_FOUND,
            Self::AlreadyDistributed => StatusCode::CONFLICT,
            Self::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, PayoutError>;
