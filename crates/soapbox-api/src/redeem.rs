use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use soapbox_db::{Batch, Store};
use soapbox_types::models::{
    CURRENT_MESSAGE_KEY, MARKER_TTL_SECS, MARKER_VALUE, MAX_MESSAGE_CHARS, used_session_key,
};

use crate::error::RedeemError;
use crate::filter::ContentFilter;
use crate::payment::PaymentVerifier;
use crate::run_blocking;

/// Spends one paid checkout session to replace the shared message.
pub struct RedemptionService {
    store: Arc<dyn Store>,
    verifier: Arc<dyn PaymentVerifier>,
    filter: ContentFilter,
}

impl RedemptionService {
    pub fn new(store: Arc<dyn Store>, verifier: Arc<dyn PaymentVerifier>, filter: ContentFilter) -> Self {
        Self {
            store,
            verifier,
            filter,
        }
    }

    /// Checks run in a fixed order and the first failure wins: required
    /// fields, length, content, payment, then replay. Nothing is written
    /// unless every check passes.
    ///
    /// The message and the session marker are committed in one transaction
    /// that also claims the marker key, so of two concurrent redemptions of
    /// the same session exactly one succeeds.
    pub async fn redeem(&self, message: &str, session_id: &str) -> Result<(), RedeemError> {
        if message.is_empty() || session_id.is_empty() {
            return Err(RedeemError::MissingFields);
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(RedeemError::TooLong);
        }
        if self.filter.contains_banned(message) {
            info!(session_id, "Rejected message with banned content");
            return Err(RedeemError::Inappropriate);
        }

        let status = self.verifier.status(session_id).await?;
        if !status.is_paid() {
            info!(session_id, ?status, "Rejected redemption of unpaid session");
            return Err(RedeemError::PaymentIncomplete);
        }

        let marker_key = used_session_key(session_id);

        let key = marker_key.clone();
        if run_blocking(&self.store, move |store| store.exists(&key)).await? {
            info!(session_id, "Rejected replay of redeemed session");
            return Err(RedeemError::AlreadyUsed);
        }

        let batch = Batch::new()
            .claim(&marker_key)
            .set(CURRENT_MESSAGE_KEY, message, None)
            .set(marker_key, MARKER_VALUE, Some(Duration::from_secs(MARKER_TTL_SECS)));

        if !run_blocking(&self.store, move |store| store.write_batch(&batch)).await? {
            warn!(session_id, "Session was redeemed concurrently, dropping this write");
            return Err(RedeemError::AlreadyUsed);
        }

        info!(session_id, chars = message.chars().count(), "Message updated");
        Ok(())
    }
}
