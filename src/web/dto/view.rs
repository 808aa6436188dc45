//! Template data model.
//!
//! Field names are camelCase because templates are shared with the
//! delivery form vocabulary (`senderAddress`, `sendingDate`).

use chrono::SecondsFormat;

use crate::auth::AuthSession;
use crate::mail::{Contact, Mail, Mailbox};
use crate::template::{TemplateContext, Value};
use crate::web::resources::ResourceMap;

/// The signed-in user.
pub fn user_value(session: &AuthSession) -> Value {
    Value::object([
        ("id", Value::from(session.user_id)),
        ("login", Value::from(session.login())),
        ("name", Value::from(&session.name)),
    ])
}

/// A mailbox with links to its collections.
pub fn mailbox_value(mailbox: &Mailbox, resources: &ResourceMap) -> Value {
    Value::object([
        ("id", Value::from(mailbox.id)),
        ("senderName", Value::from(&mailbox.sender_name)),
        ("createdAt", Value::from(&mailbox.created_at)),
        ("href", Value::from(resources.href(resources.mailbox, &[mailbox.id]))),
        ("mailsHref", Value::from(resources.href(resources.mails, &[mailbox.id]))),
        (
            "contactsHref",
            Value::from(resources.href(resources.contacts, &[mailbox.id])),
        ),
    ])
}

/// A contact, flagged when it is among `recipients`.
pub fn contact_value(contact: &Contact, recipients: &[Contact]) -> Value {
    let selected = recipients
        .iter()
        .any(|r| r.mail_address == contact.mail_address);
    Value::object([
        ("id", Value::from(contact.id)),
        ("name", Value::from(&contact.name)),
        ("mailAddress", Value::from(&contact.mail_address)),
        ("selected", Value::from(selected)),
    ])
}

/// A mail and its recipients.
pub fn mail_value(mail: &Mail, resources: &ResourceMap) -> Value {
    let recipients: Vec<Value> = mail
        .recipients
        .iter()
        .map(|c| contact_value(c, &mail.recipients))
        .collect();
    let sending_date = mail
        .sending_date
        .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true));

    Value::object([
        ("id", Value::from(mail.id)),
        ("subject", Value::from(&mail.subject)),
        ("message", Value::from(&mail.message)),
        ("status", Value::from(mail.status.as_str())),
        ("sendingDate", Value::from(sending_date)),
        ("recipients", Value::from(recipients)),
        ("tags", Value::from(mail.tags.join(" "))),
        ("tagList", Value::from(mail.tags.clone())),
        ("senderAddress", Value::from(mail.sender_address.clone())),
        ("senderName", Value::from(mail.sender_name.clone())),
        ("createdAt", Value::from(&mail.created_at)),
        (
            "href",
            Value::from(resources.href(resources.mail, &[mail.mailbox_id, mail.id])),
        ),
    ])
}

/// Context shared by every page: `currentUser`, `resourceRef`, `rootRef`.
pub fn page_context(session: &AuthSession, resource_ref: &str, root_ref: &str) -> TemplateContext {
    let mut ctx = TemplateContext::new();
    ctx.set("currentUser", user_value(session));
    ctx.set("resourceRef", resource_ref);
    ctx.set("rootRef", root_ref);
    ctx
}
