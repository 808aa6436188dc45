//! Mail types for Mailroom.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::MailroomError;

/// Lifecycle state of a mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MailStatus {
    /// Being composed by its owner.
    #[default]
    Draft,
    /// A send attempt began and has not fully succeeded.
    Sending,
    /// Delivered to every recipient.
    Sent,
    /// A copy delivered from a remote sender.
    Receiving,
}

impl MailStatus {
    /// Status as stored and submitted (`draft`, `sending`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            MailStatus::Draft => "draft",
            MailStatus::Sending => "sending",
            MailStatus::Sent => "sent",
            MailStatus::Receiving => "receiving",
        }
    }

    /// Name of the page template that represents a mail in this status.
    pub fn template_name(&self) -> String {
        format!("mail_{}.html", self.as_str())
    }
}

impl fmt::Display for MailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MailStatus {
    type Err = MailroomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(MailStatus::Draft),
            "sending" => Ok(MailStatus::Sending),
            "sent" => Ok(MailStatus::Sent),
            "receiving" => Ok(MailStatus::Receiving),
            _ => Err(MailroomError::Validation(format!("unknown mail status: {s}"))),
        }
    }
}

/// A mailbox owned by a user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Mailbox {
    /// Unique mailbox ID.
    pub id: i64,
    /// Owning user ID.
    pub owner_id: i64,
    /// Name shown to recipients of mails sent from this mailbox.
    pub sender_name: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A known or ad-hoc correspondent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Contact ID, `None` for a recipient not saved in the mailbox.
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
    /// URL of the contact's remote mail collection.
    pub mail_address: String,
}

impl Contact {
    /// Create an ad-hoc contact named after its address.
    pub fn ad_hoc(mail_address: impl Into<String>) -> Self {
        let mail_address = mail_address.into();
        Self {
            id: None,
            name: mail_address.clone(),
            mail_address,
        }
    }

    /// Parse a delivered `address$name` recipient entry.
    ///
    /// An entry without a `$` is treated as a bare address.
    pub fn from_delivery_entry(entry: &str) -> Self {
        match entry.split_once('$') {
            Some((address, name)) if !name.is_empty() => Self {
                id: None,
                name: name.to_string(),
                mail_address: address.to_string(),
            },
            Some((address, _)) => Self::ad_hoc(address),
            None => Self::ad_hoc(entry),
        }
    }

    /// Format as an `address$name` recipient entry.
    pub fn delivery_entry(&self) -> String {
        format!("{}${}", self.mail_address, self.name)
    }
}

/// A mail stored in a mailbox.
#[derive(Debug, Clone)]
pub struct Mail {
    /// Unique mail ID.
    pub id: i64,
    /// Parent mailbox ID.
    pub mailbox_id: i64,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub message: String,
    /// Lifecycle status.
    pub status: MailStatus,
    /// When the last send attempt began.
    pub sending_date: Option<DateTime<Utc>>,
    /// Ordered recipients.
    pub recipients: Vec<Contact>,
    /// Free-text tags.
    pub tags: Vec<String>,
    /// Remote sender mailbox, for received copies.
    pub sender_address: Option<String>,
    /// Remote sender name, for received copies.
    pub sender_name: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

impl Mail {
    /// Recipients that are not saved contacts of the mailbox.
    pub fn ad_hoc_recipients(&self) -> impl Iterator<Item = &Contact> {
        self.recipients.iter().filter(|c| c.id.is_none())
    }
}

/// Field edits submitted for a mail. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailEdit {
    /// New status.
    pub status: Option<MailStatus>,
    /// New subject.
    pub subject: Option<String>,
    /// New body.
    pub message: Option<String>,
    /// New recipient addresses, in order.
    pub recipients: Option<Vec<String>>,
    /// New space-separated tag string.
    pub tags: Option<String>,
}

impl MailEdit {
    /// Create an empty edit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status.
    pub fn status(mut self, status: MailStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the recipient addresses.
    pub fn recipients<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recipients = Some(addresses.into_iter().map(Into::into).collect());
        self
    }

    /// Set the tag string.
    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Apply the edits to a mail, resolving recipient addresses against
    /// the mailbox's contacts.
    pub fn apply_to(&self, mail: &mut Mail, contacts: &[Contact]) {
        if let Some(status) = self.status {
            mail.status = status;
        }
        if let Some(subject) = &self.subject {
            mail.subject = subject.clone();
        }
        if let Some(message) = &self.message {
            mail.message = message.clone();
        }
        if let Some(addresses) = &self.recipients {
            mail.recipients = resolve_recipients(addresses, contacts);
        }
        if let Some(tags) = &self.tags {
            mail.tags = split_tags(tags);
        }
    }
}

/// A copy of a mail delivered from a remote mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMail {
    /// Sender mailbox URL.
    pub sender_address: String,
    /// Sender display name.
    pub sender_name: String,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub message: String,
    /// When the sender began sending.
    pub sending_date: Option<DateTime<Utc>>,
    /// All recipients of the original mail.
    pub recipients: Vec<Contact>,
}

/// Split a tag string on spaces, dropping empty fragments.
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turn submitted addresses into recipients.
///
/// Known addresses take the saved contact; unknown ones become ad-hoc
/// contacts. Submission order is kept and repeated addresses appear once.
pub fn resolve_recipients(addresses: &[String], contacts: &[Contact]) -> Vec<Contact> {
    let mut recipients: Vec<Contact> = Vec::with_capacity(addresses.len());

    for address in addresses.iter().map(|a| a.trim()).filter(|a| !a.is_empty()) {
        if recipients.iter().any(|r| r.mail_address == address) {
            continue;
        }
        let recipient = contacts
            .iter()
            .find(|c| c.mail_address == address)
            .cloned()
            .unwrap_or_else(|| Contact::ad_hoc(address));
        recipients.push(recipient);
    }

    recipients
}
