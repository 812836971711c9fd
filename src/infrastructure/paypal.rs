//! PayPal Payouts client.
//!
//! One disbursement attempt is an OAuth2 client-credentials token (cached) plus
//! a single-item `POST /v1/payments/payouts`. The batch id PayPal returns is the
//! withdrawal's provider reference.
//!
//! The withdrawal key is sent as both `sender_batch_id` and `sender_item_id`.
//! PayPal refuses a batch whose `sender_batch_id` it has already accepted, so a
//! retry after an attempt that timed out but went through cannot pay twice.
//! Such a withdrawal stays unsettled until someone reconciles it by hand.

use crate::domain::amount::Amount;
use crate::domain::ports::PayoutGateway;
use crate::error::{PayoutError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const SANDBOX_BASE_URL: &str = "https://api-m.sandbox.paypal.com";
pub const LIVE_BASE_URL: &str = "https://api-m.paypal.com";

// Refresh the token this long before PayPal says it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const EMAIL_SUBJECT: &str = "You have received a payout!";
const EMAIL_MESSAGE: &str = "Thanks for using our app. Here are your earnings.";
const ITEM_NOTE: &str = "Earnings withdrawal";

#[derive(Debug, Clone)]
pub struct PayPalCredentials {
    pub client_id: String,
    pub secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct PayoutResponse {
    batch_header: BatchHeader,
}

#[derive(Deserialize)]
struct BatchHeader {
    payout_batch_id: String,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

pub struct PayPalGateway {
    http: reqwest::Client,
    base_url: String,
    credentials: PayPalCredentials,
    currency: String,
    token: Mutex<Option<CachedToken>>,
}

impl PayPalGateway {
    /// Creates a client against `base_url` (see [`SANDBOX_BASE_URL`] and
    /// [`LIVE_BASE_URL`]) paying out in `currency`.
    pub fn new(
        base_url: impl Into<String>,
        credentials: PayPalCredentials,
        currency: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PayoutError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            currency: currency.into(),
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.value.clone());
        }

        debug!("requesting PayPal access token");
        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(attempt_failed)?;

        let response = ensure_success(response, "token request").await?;
        let token: TokenResponse = response.json().await.map_err(attempt_failed)?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    fn payout_body(&self, key: &str, recipient: &str, amount: Amount) -> Value {
        json!({
            "sender_batch_header": {
                "sender_batch_id": key,
                "email_subject": EMAIL_SUBJECT,
                "email_message": EMAIL_MESSAGE,
            },
            "items": [{
                "recipient_type": "EMAIL",
                "amount": {
                    "value": amount.to_string(),
                    "currency": self.currency,
                },
                "note": ITEM_NOTE,
                "receiver": recipient,
                "sender_item_id": key,
            }]
        })
    }
}

fn attempt_failed(err: reqwest::Error) -> PayoutError {
    PayoutError::PayoutAttemptFailed(err.to_string())
}

async fn ensure_success(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(%status, %body, "PayPal {} rejected", what);
    Err(PayoutError::PayoutAttemptFailed(format!(
        "PayPal {what} returned {status}"
    )))
}

#[async_trait]
impl PayoutGateway for PayPalGateway {
    async fn disburse(&self, key: &str, recipient: &str, amount: Amount) -> Result<String> {
        let token = self.access_token().await?;
        let body = self.payout_body(key, recipient, amount);

        let response = self
            .http
            .post(format!("{}/v1/payments/payouts", self.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(attempt_failed)?;

        let response = ensure_success(response, "payout").await?;
        let payout: PayoutResponse = response.json().await.map_err(attempt_failed)?;

        info!(
            %key,
            %recipient,
            %amount,
            batch_id = %payout.batch_header.payout_batch_id,
            "PayPal payout accepted"
        );
        Ok(payout.batch_header.payout_batch_id)
    }
}
