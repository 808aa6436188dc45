//! Middleware and extractors for the web layer.

pub mod auth;
pub mod cors;

pub use auth::CurrentUser;
pub use cors::create_cors_layer;
