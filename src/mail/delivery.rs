//! Outbound delivery of mails to remote mailboxes.
//!
//! A delivered copy is POSTed as a form to the recipient's mail address,
//! authenticated with the sending user's HTTP Basic credentials.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::types::MailStatus;
use crate::auth::Credentials;
use crate::config::DeliveryConfig;
use crate::{MailroomError, Result};

/// Content of a delivered mail copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    /// URL of the sending mailbox.
    pub sender_address: String,
    /// Sender display name.
    pub sender_name: String,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub message: String,
    /// When the send attempt began.
    pub sending_date: DateTime<Utc>,
    /// Every recipient as an `address$name` entry.
    pub recipients: Vec<String>,
}

impl DeliveryRequest {
    /// Form fields of the request body. `recipient` repeats once per entry.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("status", MailStatus::Receiving.as_str().to_string()),
            ("senderAddress", self.sender_address.clone()),
            ("senderName", self.sender_name.clone()),
            ("subject", self.subject.clone()),
            ("message", self.message.clone()),
            (
                "sendingDate",
                self.sending_date.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        ];
        fields.extend(self.recipients.iter().map(|r| ("recipient", r.clone())));
        fields
    }
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The remote accepted the copy.
    Delivered(StatusCode),
    /// The remote answered with a non-success status.
    Rejected(StatusCode),
    /// No response was obtained.
    Unreachable(String),
}

impl DeliveryOutcome {
    /// Classify a response status.
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_success() {
            DeliveryOutcome::Delivered(status)
        } else {
            DeliveryOutcome::Rejected(status)
        }
    }

    /// Whether the copy was accepted.
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered(_))
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryOutcome::Delivered(status) | DeliveryOutcome::Rejected(status) => {
                write!(f, "{status}")
            }
            DeliveryOutcome::Unreachable(reason) => write!(f, "unreachable: {reason}"),
        }
    }
}

/// Transport carrying mail copies to remote mailboxes.
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    /// Deliver `request` to `address`, authenticating with `credentials`.
    async fn deliver(
        &self,
        address: &str,
        request: &DeliveryRequest,
        credentials: &Credentials,
    ) -> DeliveryOutcome;
}

/// HTTP delivery over reqwest.
#[derive(Debug, Clone)]
pub struct HttpDelivery {
    client: Client,
}

impl HttpDelivery {
    /// Build a client with the configured timeouts and user agent.
    pub fn new(config: &DeliveryConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| MailroomError::Delivery(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DeliveryTransport for HttpDelivery {
    async fn deliver(
        &self,
        address: &str,
        request: &DeliveryRequest,
        credentials: &Credentials,
    ) -> DeliveryOutcome {
        debug!("Delivering mail to {}", address);

        let response = self
            .client
            .post(address)
            .basic_auth(&credentials.login, Some(&credentials.password))
            .form(&request.form_fields())
            .send()
            .await;

        match response {
            Ok(response) => {
                let outcome = DeliveryOutcome::from_status(response.status());
                if !outcome.is_success() {
                    warn!("Delivery to {} rejected: {}", address, outcome);
                }
                outcome
            }
            Err(e) => {
                warn!("Delivery to {} failed: {}", address, e);
                let reason = if e.is_timeout() {
                    "timed out".to_string()
                } else if e.is_connect() {
                    "connection failed".to_string()
                } else if e.is_builder() {
                    "invalid address".to_string()
                } else {
                    e.to_string()
                };
                DeliveryOutcome::Unreachable(reason)
            }
        }
    }
}
