//! Mailbox and contact handlers.

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
};
use axum_extra::extract::Form;
use std::sync::Arc;

use crate::template::Value;
use crate::web::dto::{mailbox_value, page_context, ContactForm, MailboxForm};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentUser;

/// GET /mailboxes - Mailboxes of the current user.
pub async fn list_mailboxes(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
) -> Result<Html<String>, ApiError> {
    let mailboxes = state.mail_service().list_mailboxes(&session).await?;

    let resources = &state.resources;
    let resource_ref = resources
        .href(resources.mailboxes, &[])
        .unwrap_or_default();
    let mut ctx = page_context(&session, &resource_ref, &state.root_url);
    let items: Vec<Value> = mailboxes
        .iter()
        .map(|m| mailbox_value(m, resources))
        .collect();
    ctx.set("mailboxes", items);

    state.render("mailboxes.html", &ctx)
}

/// POST /mailboxes - Create a mailbox and go to its mails.
pub async fn create_mailbox(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
    Form(form): Form<MailboxForm>,
) -> Result<Redirect, ApiError> {
    let mailbox = state
        .mail_service()
        .create_mailbox(&session, &form.sender_name)
        .await?;

    let resources = &state.resources;
    let target = resources
        .href(resources.mails, &[mailbox.id])
        .ok_or_else(|| ApiError::internal("Unresolvable mailbox link"))?;
    Ok(Redirect::to(&target))
}

/// POST /mailboxes/:mailbox_id/contacts - Add a contact.
pub async fn add_contact(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
    Path(mailbox_id): Path<i64>,
    Form(form): Form<ContactForm>,
) -> Result<Redirect, ApiError> {
    let contact = state
        .mail_service()
        .add_contact(&session, mailbox_id, &form.name, &form.mail_address)
        .await?;
    tracing::debug!("Mailbox {} added contact {}", mailbox_id, contact.mail_address);

    let resources = &state.resources;
    let target = resources
        .href(resources.mails, &[mailbox_id])
        .ok_or_else(|| ApiError::internal("Unresolvable mailbox link"))?;
    Ok(Redirect::to(&target))
}
