use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::header,
    response::IntoResponse,
};
use tracing::warn;

use soapbox_types::api::{HealthResponse, RedeemRequest, RedeemResponse};

use crate::AppState;
use crate::error::RedeemError;

/// GET / — the current message as plain text.
pub async fn current_message(State(state): State<AppState>) -> impl IntoResponse {
    let message = state.reader.read().await;
    let cache_control = format!("public, max-age={}", state.reader.fresh_for().as_secs());

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CACHE_CONTROL, cache_control),
        ],
        message,
    )
}

/// POST /api/update-message — redeem a paid session for a new message.
///
/// The body is parsed as JSON whatever its `Content-Type`, so plain form
/// posts such as `curl -d '{...}'` are accepted.
pub async fn update_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RedeemResponse>, RedeemError> {
    let req: RedeemRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected update-message body: {}", e);
        RedeemError::InvalidBody
    })?;

    let message = req.message.unwrap_or_default();
    let session_id = req.session_id.unwrap_or_default();

    state.redemption.redeem(&message, &session_id).await?;
    state.reader.invalidate();

    Ok(Json(RedeemResponse { success: true }))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
