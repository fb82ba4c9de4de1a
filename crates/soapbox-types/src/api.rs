use serde::{Deserialize, Serialize};

// -- Redemption --

/// Body of `POST /api/update-message`.
///
/// Both fields are optional on the wire so a missing field is reported as a
/// validation error by the redemption service instead of a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RedeemRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RedeemResponse {
    pub success: bool,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// -- Health --

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
