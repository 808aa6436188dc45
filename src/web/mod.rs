//! Web layer for Mailroom.
//!
//! HTML pages for mailboxes and mails, form-based updates, and the
//! delivery endpoint remote mailboxes post to.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod resources;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use resources::ResourceMap;
pub use router::create_router;
pub use server::WebServer;
