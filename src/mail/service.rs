//! Mail service for Mailroom.
//!
//! High-level mailbox and mail operations with access control and the
//! send flow: a mail moved to `sending` is delivered to every recipient
//! and failures are collected into a report.

use std::fmt;

use chrono::Utc;
use tracing::{info, warn};

use super::delivery::{DeliveryRequest, DeliveryTransport};
use super::repository::MailRepository;
use super::types::{Contact, Mail, MailEdit, MailStatus, Mailbox, ReceivedMail};
use crate::auth::AuthSession;
use crate::db::Database;
use crate::{MailroomError, Result};

/// A recipient whose delivery failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientFailure {
    /// Recipient display name.
    pub name: String,
    /// Failure status as reported by the transport.
    pub status: String,
}

/// Failed deliveries of one send attempt, in recipient order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureReport {
    failures: Vec<RecipientFailure>,
}

impl FailureReport {
    /// Record a failed recipient.
    pub fn push(&mut self, name: impl Into<String>, status: impl Into<String>) {
        self.failures.push(RecipientFailure {
            name: name.into(),
            status: status.into(),
        });
    }

    /// Whether no failure was recorded.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Recorded failures.
    pub fn failures(&self) -> &[RecipientFailure] {
        &self.failures
    }
}

/// One `name<TAB>status` line per failed recipient.
impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}\t{}", failure.name, failure.status)?;
        }
        Ok(())
    }
}

/// What an update did after the edits were persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Status is not `sending`; edits saved.
    Saved,
    /// Every recipient accepted the mail; status is `sent`.
    Sent,
    /// `sending` was requested with no recipients; status is back to `draft`.
    ReturnedToDraft,
    /// At least one delivery failed; status stays `sending`.
    PartiallyFailed(FailureReport),
}

/// A mail with everything needed to represent it.
#[derive(Debug, Clone)]
pub struct MailView {
    /// Parent mailbox.
    pub mailbox: Mailbox,
    /// The mail.
    pub mail: Mail,
    /// Mailbox contacts followed by the mail's ad-hoc recipients.
    pub contacts: Vec<Contact>,
}

/// Service for mailbox and mail operations.
pub struct MailService<'a> {
    db: &'a Database,
    transport: &'a dyn DeliveryTransport,
    root_url: &'a str,
}

impl<'a> MailService<'a> {
    /// Create a new MailService.
    ///
    /// `root_url` is the public base URL used to build sender addresses.
    pub fn new(db: &'a Database, transport: &'a dyn DeliveryTransport, root_url: &'a str) -> Self {
        Self {
            db,
            transport,
            root_url: root_url.trim_end_matches('/'),
        }
    }

    fn repo(&self) -> MailRepository<'_> {
        MailRepository::new(self.db.pool())
    }

    /// Public URL of a mailbox, used as sender address.
    pub fn mailbox_address(&self, mailbox_id: i64) -> String {
        format!("{}/mailboxes/{}", self.root_url, mailbox_id)
    }

    /// Public URL of a mailbox's mail collection, the address others
    /// deliver to.
    pub fn mail_collection_address(&self, mailbox_id: i64) -> String {
        format!("{}/mails", self.mailbox_address(mailbox_id))
    }

    // ------------------------------------------------------------------
    // Mailboxes
    // ------------------------------------------------------------------

    /// Create a mailbox owned by the session user.
    pub async fn create_mailbox(&self, session: &AuthSession, sender_name: &str) -> Result<Mailbox> {
        let sender_name = sender_name.trim();
        let sender_name = if sender_name.is_empty() {
            session.name.as_str()
        } else {
            sender_name
        };

        let mailbox = self.repo().create_mailbox(session.user_id, sender_name).await?;
        info!("User {} created mailbox {}", session.login(), mailbox.id);
        Ok(mailbox)
    }

    /// Mailboxes owned by the session user.
    pub async fn list_mailboxes(&self, session: &AuthSession) -> Result<Vec<Mailbox>> {
        self.repo().list_mailboxes(session.user_id).await
    }

    /// Get a mailbox the session user owns.
    pub async fn owned_mailbox(&self, session: &AuthSession, mailbox_id: i64) -> Result<Mailbox> {
        let mailbox = self
            .repo()
            .get_mailbox_by_id(mailbox_id)
            .await?
            .ok_or_else(|| MailroomError::NotFound("mailbox".to_string()))?;

        if mailbox.owner_id != session.user_id {
            return Err(MailroomError::Permission(
                "mailbox belongs to another user".to_string(),
            ));
        }
        Ok(mailbox)
    }

    /// Add a contact to a mailbox the session user owns.
    pub async fn add_contact(
        &self,
        session: &AuthSession,
        mailbox_id: i64,
        name: &str,
        mail_address: &str,
    ) -> Result<Contact> {
        let mailbox = self.owned_mailbox(session, mailbox_id).await?;

        let mail_address = mail_address.trim();
        let parsed = url::Url::parse(mail_address)
            .map_err(|e| MailroomError::Validation(format!("invalid mail address: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MailroomError::Validation(
                "mail address must be an http(s) URL".to_string(),
            ));
        }

        let name = name.trim();
        let name = if name.is_empty() { mail_address } else { name };
        self.repo().add_contact(mailbox.id, name, mail_address).await
    }

    // ------------------------------------------------------------------
    // Mails
    // ------------------------------------------------------------------

    /// List the mails of a mailbox the session user owns.
    pub async fn list_mails(&self, session: &AuthSession, mailbox_id: i64) -> Result<(Mailbox, Vec<Mail>)> {
        let mailbox = self.owned_mailbox(session, mailbox_id).await?;
        let mails = self.repo().list_mails(mailbox.id).await?;
        Ok((mailbox, mails))
    }

    /// Create a new draft in a mailbox the session user owns.
    pub async fn create_draft(
        &self,
        session: &AuthSession,
        mailbox_id: i64,
        subject: &str,
        message: &str,
    ) -> Result<Mail> {
        let mailbox = self.owned_mailbox(session, mailbox_id).await?;
        self.repo().create_draft(mailbox.id, subject, message).await
    }

    /// Accept a copy delivered by a remote sender.
    ///
    /// Any authenticated user may deliver to any mailbox.
    pub async fn receive(&self, session: &AuthSession, mailbox_id: i64, received: &ReceivedMail) -> Result<Mail> {
        let mailbox = self
            .repo()
            .get_mailbox_by_id(mailbox_id)
            .await?
            .ok_or_else(|| MailroomError::NotFound("mailbox".to_string()))?;

        let mail = self.repo().receive_mail(mailbox.id, received).await?;
        info!(
            "Mailbox {} received mail {} from {} (delivered by {})",
            mailbox.id,
            mail.id,
            received.sender_address,
            session.login()
        );
        Ok(mail)
    }

    /// Load a mail for representation.
    pub async fn represent(&self, session: &AuthSession, mailbox_id: i64, mail_id: i64) -> Result<MailView> {
        let mailbox = self.owned_mailbox(session, mailbox_id).await?;
        let mail = self.find_mail(mailbox.id, mail_id).await?;
        self.view(mailbox, mail).await
    }

    /// Apply edits to a mail and run the send flow when its status
    /// becomes `sending`.
    ///
    /// The edits and the sending date are persisted before any delivery.
    /// On partial failure nothing further is persisted.
    pub async fn store(
        &self,
        session: &AuthSession,
        mailbox_id: i64,
        mail_id: i64,
        edit: &MailEdit,
    ) -> Result<(MailView, UpdateOutcome)> {
        let mailbox = self.owned_mailbox(session, mailbox_id).await?;
        let mut mail = self.find_mail(mailbox.id, mail_id).await?;
        let contacts = self.repo().list_contacts(mailbox.id).await?;

        self.repo()
            .update_mail_fields(&mut mail, edit, &contacts)
            .await?;

        if mail.status != MailStatus::Sending {
            let view = self.view(mailbox, mail).await?;
            return Ok((view, UpdateOutcome::Saved));
        }

        let sending_date = Utc::now();
        mail.sending_date = Some(sending_date);
        self.repo().update_mail(&mail).await?;

        if mail.recipients.is_empty() {
            mail.status = MailStatus::Draft;
            self.repo().update_mail(&mail).await?;
            info!("Mail {} has no recipients, kept as draft", mail.id);
            let view = self.view(mailbox, mail).await?;
            return Ok((view, UpdateOutcome::ReturnedToDraft));
        }

        let request = DeliveryRequest {
            sender_address: self.mailbox_address(mailbox.id),
            sender_name: mailbox.sender_name.clone(),
            subject: mail.subject.clone(),
            message: mail.message.clone(),
            sending_date,
            recipients: mail.recipients.iter().map(Contact::delivery_entry).collect(),
        };

        let mut report = FailureReport::default();
        for recipient in &mail.recipients {
            let outcome = self
                .transport
                .deliver(&recipient.mail_address, &request, &session.credentials)
                .await;
            if !outcome.is_success() {
                report.push(&recipient.name, outcome.to_string());
            }
        }

        if report.is_empty() {
            mail.status = MailStatus::Sent;
            self.repo().update_mail(&mail).await?;
            info!(
                "Mail {} sent to {} recipient(s)",
                mail.id,
                mail.recipients.len()
            );
            let view = self.view(mailbox, mail).await?;
            Ok((view, UpdateOutcome::Sent))
        } else {
            warn!(
                "Mail {}: {} of {} deliveries failed",
                mail.id,
                report.failures().len(),
                mail.recipients.len()
            );
            let view = self.view(mailbox, mail).await?;
            Ok((view, UpdateOutcome::PartiallyFailed(report)))
        }
    }

    /// Delete a mail from a mailbox the session user owns.
    pub async fn delete(&self, session: &AuthSession, mailbox_id: i64, mail_id: i64) -> Result<()> {
        let mailbox = self.owned_mailbox(session, mailbox_id).await?;
        if !self.repo().delete_mail(mailbox.id, mail_id).await? {
            return Err(MailroomError::NotFound("mail".to_string()));
        }
        info!("Deleted mail {} from mailbox {}", mail_id, mailbox.id);
        Ok(())
    }

    async fn find_mail(&self, mailbox_id: i64, mail_id: i64) -> Result<Mail> {
        self.repo()
            .get_mail_by_id(mailbox_id, mail_id)
            .await?
            .ok_or_else(|| MailroomError::NotFound("mail".to_string()))
    }

    async fn view(&self, mailbox: Mailbox, mail: Mail) -> Result<MailView> {
        let mut contacts = self.repo().list_contacts(mailbox.id).await?;
        contacts.extend(mail.ad_hoc_recipients().cloned());
        Ok(MailView {
            mailbox,
            mail,
            contacts,
        })
    }
}
