//! Mail handlers.
//!
//! A mail is represented by the template named after its status. Updates
//! redirect back to the mail, except a partially failed send which renders
//! the failure report in place.

use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use std::sync::Arc;

use crate::auth::AuthSession;
use crate::mail::{MailView, UpdateOutcome};
use crate::template::Value;
use crate::web::dto::{
    contact_value, mail_value, mailbox_value, page_context, MailCollectionForm, MailForm,
    MethodOverride, NewMail,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentUser;

fn mail_href(state: &AppState, mailbox_id: i64, mail_id: i64) -> Result<String, ApiError> {
    let resources = &state.resources;
    resources
        .href(resources.mail, &[mailbox_id, mail_id])
        .ok_or_else(|| ApiError::internal("Unresolvable mail link"))
}

/// Render a mail through `mail_<status>.html`.
fn render_mail(
    state: &AppState,
    session: &AuthSession,
    view: &MailView,
    message: Option<String>,
) -> Result<Html<String>, ApiError> {
    let resources = &state.resources;
    let resource_ref = mail_href(state, view.mailbox.id, view.mail.id)?;

    let mut ctx = page_context(session, &resource_ref, &state.root_url);
    ctx.set("mailbox", mailbox_value(&view.mailbox, resources));
    ctx.set("mail", mail_value(&view.mail, resources));
    let contacts: Vec<Value> = view
        .contacts
        .iter()
        .map(|c| contact_value(c, &view.mail.recipients))
        .collect();
    ctx.set("contacts", contacts);
    ctx.set("message", message);

    state.render(&view.mail.status.template_name(), &ctx)
}

/// GET /mailboxes/:mailbox_id/mails/:mail_id - Show a mail.
pub async fn get_mail(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
    Path((mailbox_id, mail_id)): Path<(i64, i64)>,
) -> Result<Html<String>, ApiError> {
    let view = state
        .mail_service()
        .represent(&session, mailbox_id, mail_id)
        .await?;
    render_mail(&state, &session, &view, None)
}

/// PUT|POST /mailboxes/:mailbox_id/mails/:mail_id - Update a mail.
///
/// Moving the status to `sending` delivers the mail. `POST ?method=delete`
/// deletes it instead.
pub async fn update_mail(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
    Path((mailbox_id, mail_id)): Path<(i64, i64)>,
    Query(method): Query<MethodOverride>,
    Form(form): Form<MailForm>,
) -> Result<Response, ApiError> {
    if method.is_delete() {
        return remove_mail(&state, &session, mailbox_id, mail_id)
            .await
            .map(IntoResponse::into_response);
    }

    let edit = form.into_edit()?;
    let (view, outcome) = state
        .mail_service()
        .store(&session, mailbox_id, mail_id, &edit)
        .await?;

    match outcome {
        UpdateOutcome::PartiallyFailed(report) => {
            let page = render_mail(&state, &session, &view, Some(report.to_string()))?;
            Ok(page.into_response())
        }
        UpdateOutcome::Saved | UpdateOutcome::Sent | UpdateOutcome::ReturnedToDraft => {
            let target = mail_href(&state, mailbox_id, mail_id)?;
            Ok(Redirect::to(&target).into_response())
        }
    }
}

/// DELETE /mailboxes/:mailbox_id/mails/:mail_id - Delete a mail.
pub async fn delete_mail(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
    Path((mailbox_id, mail_id)): Path<(i64, i64)>,
) -> Result<Redirect, ApiError> {
    remove_mail(&state, &session, mailbox_id, mail_id).await
}

async fn remove_mail(
    state: &AppState,
    session: &AuthSession,
    mailbox_id: i64,
    mail_id: i64,
) -> Result<Redirect, ApiError> {
    state
        .mail_service()
        .delete(session, mailbox_id, mail_id)
        .await?;

    let resources = &state.resources;
    let target = resources
        .parent_collection_href(resources.mail, &[mailbox_id, mail_id])
        .ok_or_else(|| ApiError::internal("Unresolvable mail collection link"))?;
    Ok(Redirect::to(&target))
}

/// GET /mailboxes/:mailbox_id/mails - List the mails of a mailbox.
pub async fn list_mails(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
    Path(mailbox_id): Path<i64>,
) -> Result<Html<String>, ApiError> {
    let service = state.mail_service();
    let (mailbox, mails) = service.list_mails(&session, mailbox_id).await?;

    let resources = &state.resources;
    let resource_ref = resources
        .href(resources.mails, &[mailbox.id])
        .unwrap_or_default();
    let mut ctx = page_context(&session, &resource_ref, &state.root_url);
    ctx.set("mailbox", mailbox_value(&mailbox, resources));
    ctx.set("address", service.mail_collection_address(mailbox.id));
    let items: Vec<Value> = mails.iter().map(|m| mail_value(m, resources)).collect();
    ctx.set("mails", items);

    state.render("mails.html", &ctx)
}

/// POST /mailboxes/:mailbox_id/mails - Create a draft or accept a delivery.
pub async fn post_mail(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
    Path(mailbox_id): Path<i64>,
    Form(form): Form<MailCollectionForm>,
) -> Result<Response, ApiError> {
    let service = state.mail_service();

    match form.into_new_mail()? {
        NewMail::Draft { subject, message } => {
            let mail = service
                .create_draft(&session, mailbox_id, &subject, &message)
                .await?;
            let target = mail_href(&state, mailbox_id, mail.id)?;
            Ok(Redirect::to(&target).into_response())
        }
        NewMail::Received(received) => {
            let mail = service.receive(&session, mailbox_id, &received).await?;
            let location = mail_href(&state, mailbox_id, mail.id)?;
            Ok((StatusCode::CREATED, [(LOCATION, location)]).into_response())
        }
    }
}
