//! Router configuration.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    add_contact, create_mailbox, delete_mail, get_mail, list_mailboxes, list_mails, me,
    post_mail, register_user, update_mail, AppState,
};
use super::middleware::create_cors_layer;

/// Create the main router.
///
/// Paths come from the application's resource tree.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let r = &app_state.resources;

    // Registration is the only route without credentials
    let user_routes = Router::new()
        .route(&r.pattern(r.users), post(register_user))
        .route(&format!("{}/me", r.pattern(r.users)), get(me));

    let mailbox_routes = Router::new()
        .route(
            &r.pattern(r.mailboxes),
            get(list_mailboxes).post(create_mailbox),
        )
        .route(&r.pattern(r.contacts), post(add_contact))
        .route(&r.pattern(r.mails), get(list_mails).post(post_mail))
        .route(
            &r.pattern(r.mail),
            get(get_mail)
                .put(update_mail)
                .post(update_mail)
                .delete(delete_mail),
        );

    Router::new()
        .merge(user_routes)
        .merge(mailbox_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
