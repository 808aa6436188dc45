//! Database schema and migrations for Mailroom.
//!
//! Migrations are applied in order when the database is opened.
//! The schema_version table tracks which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    login       TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password    TEXT NOT NULL,           -- Argon2 hash
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v2: mailboxes and their contacts
    r#"
CREATE TABLE mailboxes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    sender_name TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_mailboxes_owner ON mailboxes(owner_id);

CREATE TABLE contacts (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    mailbox_id    INTEGER NOT NULL REFERENCES mailboxes(id) ON DELETE CASCADE,
    name          TEXT NOT NULL,
    mail_address  TEXT NOT NULL
);

CREATE INDEX idx_contacts_mailbox ON contacts(mailbox_id);
"#,
    // v3: mails, recipients and tags
    r#"
CREATE TABLE mails (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    mailbox_id      INTEGER NOT NULL REFERENCES mailboxes(id) ON DELETE CASCADE,
    subject         TEXT NOT NULL DEFAULT '',
    message         TEXT NOT NULL DEFAULT '',
    status          TEXT NOT NULL DEFAULT 'draft',  -- 'draft', 'sending', 'sent', 'receiving'
    sending_date    TEXT,
    sender_address  TEXT,
    sender_name     TEXT,
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_mails_mailbox ON mails(mailbox_id);

CREATE TABLE mail_recipients (
    mail_id       INTEGER NOT NULL REFERENCES mails(id) ON DELETE CASCADE,
    position      INTEGER NOT NULL,
    contact_id    INTEGER REFERENCES contacts(id) ON DELETE SET NULL,
    name          TEXT NOT NULL,
    mail_address  TEXT NOT NULL,
    PRIMARY KEY (mail_id, position)
);

CREATE TABLE mail_tags (
    mail_id   INTEGER NOT NULL REFERENCES mails(id) ON DELETE CASCADE,
    position  INTEGER NOT NULL,
    tag       TEXT NOT NULL,
    PRIMARY KEY (mail_id, position)
);
"#,
];
