//! Redemption error taxonomy.
//!
//! Validation, payment and replay failures are shown to the caller verbatim
//! with a 400. Infrastructure failures are logged with full detail and
//! collapse to one opaque 500 message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use soapbox_types::api::ErrorResponse;

#[derive(Debug, Error)]
pub enum RedeemError {
    #[error("Invalid request body")]
    InvalidBody,

    #[error("Message and session ID are required")]
    MissingFields,

    #[error("Message must be 280 characters or less")]
    TooLong,

    #[error("Message contains inappropriate content")]
    Inappropriate,

    /// Unknown session, or one that was never paid.
    #[error("Payment not completed")]
    PaymentIncomplete,

    /// The session already bought a message; permanent until its marker expires.
    #[error("This payment session has already been used")]
    AlreadyUsed,

    /// Store or payment processor failure. The source is never sent to clients.
    #[error("Error updating message")]
    Internal(#[from] anyhow::Error),
}

impl RedeemError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RedeemError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RedeemError {
    fn into_response(self) -> Response {
        if let RedeemError::Internal(e) = &self {
            error!(error = ?e, "Error updating message");
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
