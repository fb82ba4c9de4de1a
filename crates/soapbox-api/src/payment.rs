use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use soapbox_types::models::PaymentStatus;

/// Looks up whether a checkout session has been paid.
pub trait PaymentVerifier: Send + Sync {
    fn status<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, Result<PaymentStatus>>;
}

/// Stripe API version the session payload is parsed against.
pub const STRIPE_API_VERSION: &str = "2025-05-28.basil";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Checkout-session lookups against the Stripe REST API.
pub struct StripeVerifier {
    client: reqwest::Client,
    api_base: Url,
    secret_key: String,
}

/// The one field of a Checkout Session we care about.
#[derive(Debug, Deserialize)]
struct CheckoutSession {
    payment_status: String,
}

impl StripeVerifier {
    pub fn new(secret_key: impl Into<String>, api_base: &str) -> Result<Self> {
        let api_base = Url::parse(api_base).with_context(|| format!("Invalid Stripe API base '{}'", api_base))?;
        if api_base.cannot_be_a_base() {
            bail!("Stripe API base '{}' cannot hold a path", api_base);
        }

        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            api_base,
            secret_key: secret_key.into(),
        })
    }

    /// `{base}/v1/checkout/sessions/{id}`, with the id escaped as one segment.
    fn session_url(&self, session_id: &str) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Stripe API base cannot hold a path"))?
            .pop_if_empty()
            .extend(["v1", "checkout", "sessions", session_id]);
        Ok(url)
    }

    async fn fetch_status(&self, session_id: &str) -> Result<PaymentStatus> {
        let url = self.session_url(session_id)?;

        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.secret_key)
            .header("Stripe-Version", STRIPE_API_VERSION)
            .send()
            .await
            .context("Stripe session lookup failed")?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            warn!(session_id, "Stripe has no checkout session with this id");
            return Ok(PaymentStatus::NotFound);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Stripe returned {} for session lookup: {}", status, body);
        }

        let session: CheckoutSession = resp
            .json()
            .await
            .context("Malformed Stripe checkout session")?;
        debug!(session_id, payment_status = %session.payment_status, "Fetched checkout session");

        Ok(parse_payment_status(&session.payment_status))
    }
}

impl PaymentVerifier for StripeVerifier {
    fn status<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, Result<PaymentStatus>> {
        self.fetch_status(session_id).boxed()
    }
}

/// Only `paid` counts; `unpaid` and `no_payment_required` do not.
fn parse_payment_status(raw: &str) -> PaymentStatus {
    match raw {
        "paid" => PaymentStatus::Paid,
        _ => PaymentStatus::Unpaid,
    }
}
