//! Data transfer objects for the web layer.
//!
//! Request forms, JSON responses and the template data model.

pub mod request;
pub mod response;
pub mod view;

pub use request::*;
pub use response::*;
pub use view::*;
