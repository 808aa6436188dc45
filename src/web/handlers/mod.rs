//! HTTP handlers.

pub mod mail;
pub mod mailbox;
pub mod user;

pub use mail::*;
pub use mailbox::*;
pub use user::*;

use std::sync::Arc;

use axum::response::Html;

use crate::db::Database;
use crate::mail::{DeliveryTransport, MailService};
use crate::template::{TemplateContext, TemplateLoader};
use crate::web::error::ApiError;
use crate::web::resources::ResourceMap;
use crate::MailroomError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Database,
    /// Page templates.
    pub templates: TemplateLoader,
    /// Outbound delivery of sent mails.
    pub transport: Arc<dyn DeliveryTransport>,
    /// Public base URL, without trailing slash.
    pub root_url: String,
    /// Resource tree used for routes and links.
    pub resources: ResourceMap,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Database,
        templates: TemplateLoader,
        transport: Arc<dyn DeliveryTransport>,
        root_url: impl Into<String>,
    ) -> Self {
        let root_url: String = root_url.into();
        Self {
            db,
            templates,
            transport,
            root_url: root_url.trim_end_matches('/').to_string(),
            resources: ResourceMap::new(),
        }
    }

    /// Mail service bound to this state.
    pub fn mail_service(&self) -> MailService<'_> {
        MailService::new(&self.db, self.transport.as_ref(), &self.root_url)
    }

    /// Render a page template.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<Html<String>, ApiError> {
        self.templates
            .render(name, context)
            .map(Html)
            .map_err(|e| ApiError::from(MailroomError::from(e)))
    }
}

/// State over an in-memory database with the bundled templates.
#[cfg(test)]
pub(crate) async fn test_state() -> Arc<AppState> {
    use crate::config::DeliveryConfig;
    use crate::mail::HttpDelivery;

    let db = Database::open_in_memory().await.unwrap();
    let templates = TemplateLoader::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"));
    let transport = HttpDelivery::new(&DeliveryConfig::default()).unwrap();
    Arc::new(AppState::new(
        db,
        templates,
        Arc::new(transport),
        "http://localhost:8080",
    ))
}
