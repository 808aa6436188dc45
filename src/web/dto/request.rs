//! Request DTOs.
//!
//! HTML forms post `application/x-www-form-urlencoded` bodies with repeated
//! keys, so these are extracted with `axum_extra::extract::Form`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::mail::{Contact, MailEdit, MailStatus, ReceivedMail};
use crate::web::error::ApiError;

/// User registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// Login name.
    pub login: String,
    /// Password.
    pub password: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Mailbox creation form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxForm {
    /// Sender display name, defaults to the user's name.
    #[serde(default)]
    pub sender_name: String,
}

/// Contact creation form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    /// Display name, defaults to the address.
    #[serde(default)]
    pub name: String,
    /// Remote mail collection URL.
    pub mail_address: String,
}

/// `?method=` override for clients that can only POST.
#[derive(Debug, Default, Deserialize)]
pub struct MethodOverride {
    /// Tunnelled method name.
    pub method: Option<String>,
}

impl MethodOverride {
    /// Whether the request asks for a delete.
    pub fn is_delete(&self) -> bool {
        self.method
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("delete"))
    }
}

/// Mail update form.
///
/// Absent fields leave the mail unchanged. Any `recipients` key, even an
/// empty one, replaces the recipient list.
#[derive(Debug, Default, Deserialize)]
pub struct MailForm {
    /// New status.
    pub status: Option<String>,
    /// New subject.
    pub subject: Option<String>,
    /// New body.
    pub message: Option<String>,
    /// Recipient addresses, one key per address.
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Space separated tags.
    pub tags: Option<String>,
}

impl MailForm {
    /// Convert into an edit, rejecting an unknown status.
    pub fn into_edit(self) -> Result<MailEdit, ApiError> {
        let mut edit = MailEdit::new();
        if let Some(status) = self.status {
            edit = edit.status(status.parse::<MailStatus>()?);
        }
        if let Some(subject) = self.subject {
            edit = edit.subject(subject);
        }
        if let Some(message) = self.message {
            edit = edit.message(message);
        }
        if !self.recipients.is_empty() {
            edit = edit.recipients(self.recipients);
        }
        if let Some(tags) = self.tags {
            edit = edit.tags(tags);
        }
        Ok(edit)
    }
}

/// What a POST to a mail collection asks for.
#[derive(Debug)]
pub enum NewMail {
    /// The owner starts a draft.
    Draft {
        /// Subject line.
        subject: String,
        /// Body text.
        message: String,
    },
    /// A remote mailbox delivers a copy.
    Received(ReceivedMail),
}

/// Mail collection form: either a new draft or a delivered copy.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailCollectionForm {
    /// `receiving` for a delivered copy, absent or `draft` otherwise.
    pub status: Option<String>,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// Body text.
    #[serde(default)]
    pub message: String,
    /// Sender mailbox URL.
    pub sender_address: Option<String>,
    /// Sender display name.
    pub sender_name: Option<String>,
    /// RFC 3339 sending timestamp.
    pub sending_date: Option<String>,
    /// `address$name` entries, one key per recipient.
    #[serde(default)]
    pub recipient: Vec<String>,
}

impl MailCollectionForm {
    /// Decide between a draft and a delivered copy and validate the fields.
    pub fn into_new_mail(self) -> Result<NewMail, ApiError> {
        let status = match self.status.as_deref() {
            None | Some("") => MailStatus::Draft,
            Some(s) => s.parse::<MailStatus>()?,
        };

        match status {
            MailStatus::Draft => Ok(NewMail::Draft {
                subject: self.subject,
                message: self.message,
            }),
            MailStatus::Receiving => {
                let sender_address = self
                    .sender_address
                    .filter(|a| !a.trim().is_empty())
                    .ok_or_else(|| ApiError::unprocessable("senderAddress is required"))?;
                let sending_date = self
                    .sending_date
                    .filter(|d| !d.is_empty())
                    .map(|d| parse_sending_date(&d))
                    .transpose()?;

                Ok(NewMail::Received(ReceivedMail {
                    sender_name: self
                        .sender_name
                        .unwrap_or_else(|| sender_address.clone()),
                    sender_address,
                    subject: self.subject,
                    message: self.message,
                    sending_date,
                    recipients: self
                        .recipient
                        .iter()
                        .filter(|e| !e.is_empty())
                        .map(|e| Contact::from_delivery_entry(e))
                        .collect(),
                }))
            }
            other => Err(ApiError::unprocessable(format!(
                "cannot create a mail with status {other}"
            ))),
        }
    }
}

fn parse_sending_date(value: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| ApiError::unprocessable(format!("invalid sendingDate: {e}")))
}
