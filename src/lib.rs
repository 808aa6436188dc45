//! Mailroom - a small mail web service.
//!
//! Users own mailboxes holding contacts and mails. A mail is composed as a
//! draft and sent by moving its status to `sending`, which delivers a copy
//! to every recipient's mailbox over HTTP.

pub mod auth;
pub mod builder;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mail;
pub mod template;
pub mod web;

pub use auth::{
    authenticate, hash_password, register, validate_password, verify_password, AuthSession,
    Credentials, PasswordError, RegistrationError, RegistrationRequest,
};
pub use builder::{BuilderTree, NodeId};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{MailroomError, Result};
pub use mail::{
    DeliveryOutcome, DeliveryRequest, DeliveryTransport, FailureReport, HttpDelivery, Mail,
    MailEdit, MailService, MailStatus, Mailbox, UpdateOutcome,
};
pub use web::WebServer;
