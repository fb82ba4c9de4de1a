/// Store key holding the one shared message.
pub const CURRENT_MESSAGE_KEY: &str = "current_message";

/// Prefix for redeemed-session markers: `used_session:<session_id>`.
pub const USED_SESSION_PREFIX: &str = "used_session:";

/// Value written under a marker key.
pub const MARKER_VALUE: &str = "true";

/// Markers expire after 30 days, after which the session could redeem again.
pub const MARKER_TTL_SECS: u64 = 60 * 60 * 24 * 30;

/// Maximum message length, counted in characters (not bytes).
pub const MAX_MESSAGE_CHARS: usize = 280;

pub const NO_MESSAGE_FALLBACK: &str = "No message has been set yet. Be the first to leave your mark!";
pub const LOAD_ERROR_FALLBACK: &str = "Error loading message. Please try again later.";

pub fn used_session_key(session_id: &str) -> String {
    format!("{}{}", USED_SESSION_PREFIX, session_id)
}

/// Payment state of an externally owned checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    /// The payment processor has no session with that id.
    NotFound,
}

impl PaymentStatus {
    pub fn is_paid(self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}
