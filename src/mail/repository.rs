//! Mail repository for Mailroom.
//!
//! Storage for mailboxes, contacts, mails, recipients and tags.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::types::{Contact, Mail, MailEdit, MailStatus, Mailbox, ReceivedMail};
use crate::{MailroomError, Result};

/// Internal struct for mapping database rows to Mail.
#[derive(sqlx::FromRow)]
struct MailRow {
    id: i64,
    mailbox_id: i64,
    subject: String,
    message: String,
    status: String,
    sending_date: Option<DateTime<Utc>>,
    sender_address: Option<String>,
    sender_name: Option<String>,
    created_at: String,
}

impl MailRow {
    fn into_mail(self, recipients: Vec<Contact>, tags: Vec<String>) -> Result<Mail> {
        let status: MailStatus = self
            .status
            .parse()
            .map_err(|_| MailroomError::Database(format!("invalid mail status: {}", self.status)))?;

        Ok(Mail {
            id: self.id,
            mailbox_id: self.mailbox_id,
            subject: self.subject,
            message: self.message,
            status,
            sending_date: self.sending_date,
            recipients,
            tags,
            sender_address: self.sender_address,
            sender_name: self.sender_name,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: Option<i64>,
    name: String,
    mail_address: String,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id,
            name: row.name,
            mail_address: row.mail_address,
        }
    }
}

const MAIL_COLUMNS: &str = "id, mailbox_id, subject, message, status, sending_date, \
                            sender_address, sender_name, created_at";

/// Repository for mailbox and mail operations.
pub struct MailRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MailRepository<'a> {
    /// Create a new MailRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Mailboxes and contacts
    // ------------------------------------------------------------------

    /// Create a mailbox owned by a user.
    pub async fn create_mailbox(&self, owner_id: i64, sender_name: &str) -> Result<Mailbox> {
        let result = sqlx::query("INSERT INTO mailboxes (owner_id, sender_name) VALUES (?, ?)")
            .bind(owner_id)
            .bind(sender_name)
            .execute(self.pool)
            .await?;

        self.get_mailbox_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| MailroomError::NotFound("mailbox".to_string()))
    }

    /// Get a mailbox by ID.
    pub async fn get_mailbox_by_id(&self, id: i64) -> Result<Option<Mailbox>> {
        let mailbox = sqlx::query_as::<_, Mailbox>(
            "SELECT id, owner_id, sender_name, created_at FROM mailboxes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(mailbox)
    }

    /// List the mailboxes a user owns.
    pub async fn list_mailboxes(&self, owner_id: i64) -> Result<Vec<Mailbox>> {
        let mailboxes = sqlx::query_as::<_, Mailbox>(
            "SELECT id, owner_id, sender_name, created_at FROM mailboxes WHERE owner_id = ? ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;

        Ok(mailboxes)
    }

    /// Add a contact to a mailbox.
    pub async fn add_contact(
        &self,
        mailbox_id: i64,
        name: &str,
        mail_address: &str,
    ) -> Result<Contact> {
        let result =
            sqlx::query("INSERT INTO contacts (mailbox_id, name, mail_address) VALUES (?, ?, ?)")
                .bind(mailbox_id)
                .bind(name)
                .bind(mail_address)
                .execute(self.pool)
                .await?;

        Ok(Contact {
            id: Some(result.last_insert_rowid()),
            name: name.to_string(),
            mail_address: mail_address.to_string(),
        })
    }

    /// List a mailbox's contacts in creation order.
    pub async fn list_contacts(&self, mailbox_id: i64) -> Result<Vec<Contact>> {
        let rows = sqlx::query_as::<_, ContactRow>(
            "SELECT id, name, mail_address FROM contacts WHERE mailbox_id = ? ORDER BY id",
        )
        .bind(mailbox_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Contact::from).collect())
    }

    // ------------------------------------------------------------------
    // Mails
    // ------------------------------------------------------------------

    /// Create an empty-recipient draft in a mailbox.
    pub async fn create_draft(&self, mailbox_id: i64, subject: &str, message: &str) -> Result<Mail> {
        let result = sqlx::query(
            "INSERT INTO mails (mailbox_id, subject, message, status) VALUES (?, ?, ?, ?)",
        )
        .bind(mailbox_id)
        .bind(subject)
        .bind(message)
        .bind(MailStatus::Draft.as_str())
        .execute(self.pool)
        .await?;

        self.get_mail_by_id(mailbox_id, result.last_insert_rowid())
            .await?
            .ok_or_else(|| MailroomError::NotFound("mail".to_string()))
    }

    /// Store a copy delivered from a remote sender with status `receiving`.
    pub async fn receive_mail(&self, mailbox_id: i64, received: &ReceivedMail) -> Result<Mail> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO mails (mailbox_id, subject, message, status, sending_date,
                               sender_address, sender_name)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(mailbox_id)
        .bind(&received.subject)
        .bind(&received.message)
        .bind(MailStatus::Receiving.as_str())
        .bind(received.sending_date)
        .bind(&received.sender_address)
        .bind(&received.sender_name)
        .execute(&mut *tx)
        .await?;

        let mail_id = result.last_insert_rowid();
        replace_recipients(&mut tx, mail_id, &received.recipients).await?;
        tx.commit().await?;

        self.get_mail_by_id(mailbox_id, mail_id)
            .await?
            .ok_or_else(|| MailroomError::NotFound("mail".to_string()))
    }

    /// Get a mail by ID within a mailbox.
    pub async fn get_mail_by_id(&self, mailbox_id: i64, mail_id: i64) -> Result<Option<Mail>> {
        let row = sqlx::query_as::<_, MailRow>(&format!(
            "SELECT {MAIL_COLUMNS} FROM mails WHERE id = ? AND mailbox_id = ?"
        ))
        .bind(mail_id)
        .bind(mailbox_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// List a mailbox's mails, newest first.
    pub async fn list_mails(&self, mailbox_id: i64) -> Result<Vec<Mail>> {
        let rows = sqlx::query_as::<_, MailRow>(&format!(
            "SELECT {MAIL_COLUMNS} FROM mails WHERE mailbox_id = ? ORDER BY id DESC"
        ))
        .bind(mailbox_id)
        .fetch_all(self.pool)
        .await?;

        let mut mails = Vec::with_capacity(rows.len());
        for row in rows {
            mails.push(self.hydrate(row).await?);
        }
        Ok(mails)
    }

    /// Apply field edits to a mail and persist the result.
    ///
    /// Recipient addresses are resolved against `contacts`.
    pub async fn update_mail_fields(
        &self,
        mail: &mut Mail,
        edit: &MailEdit,
        contacts: &[Contact],
    ) -> Result<()> {
        edit.apply_to(mail, contacts);
        self.update_mail(mail).await
    }

    /// Persist the in-memory state of a mail.
    pub async fn update_mail(&self, mail: &Mail) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE mails
            SET subject = ?, message = ?, status = ?, sending_date = ?
            WHERE id = ? AND mailbox_id = ?
            "#,
        )
        .bind(&mail.subject)
        .bind(&mail.message)
        .bind(mail.status.as_str())
        .bind(mail.sending_date)
        .bind(mail.id)
        .bind(mail.mailbox_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MailroomError::NotFound("mail".to_string()));
        }

        replace_recipients(&mut tx, mail.id, &mail.recipients).await?;

        sqlx::query("DELETE FROM mail_tags WHERE mail_id = ?")
            .bind(mail.id)
            .execute(&mut *tx)
            .await?;
        for (position, tag) in mail.tags.iter().enumerate() {
            sqlx::query("INSERT INTO mail_tags (mail_id, position, tag) VALUES (?, ?, ?)")
                .bind(mail.id)
                .bind(position as i64)
                .bind(tag)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a mail from its mailbox.
    ///
    /// Returns `false` if no such mail existed.
    pub async fn delete_mail(&self, mailbox_id: i64, mail_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM mails WHERE id = ? AND mailbox_id = ?")
            .bind(mail_id)
            .bind(mailbox_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn hydrate(&self, row: MailRow) -> Result<Mail> {
        let recipients = sqlx::query_as::<_, ContactRow>(
            r#"
            SELECT contact_id AS id, name, mail_address
            FROM mail_recipients
            WHERE mail_id = ?
            ORDER BY position
            "#,
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Contact::from)
        .collect();

        let tags: Vec<String> =
            sqlx::query_scalar("SELECT tag FROM mail_tags WHERE mail_id = ? ORDER BY position")
                .bind(row.id)
                .fetch_all(self.pool)
                .await?;

        row.into_mail(recipients, tags)
    }
}

async fn replace_recipients(
    tx: &mut Transaction<'_, Sqlite>,
    mail_id: i64,
    recipients: &[Contact],
) -> Result<()> {
    sqlx::query("DELETE FROM mail_recipients WHERE mail_id = ?")
        .bind(mail_id)
        .execute(&mut **tx)
        .await?;

    for (position, contact) in recipients.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO mail_recipients (mail_id, position, contact_id, name, mail_address)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(mail_id)
        .bind(position as i64)
        .bind(contact.id)
        .bind(&contact.name)
        .bind(&contact.mail_address)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
