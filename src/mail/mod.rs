//! Mail module for Mailroom.
//!
//! This module provides:
//! - Mailboxes with contacts
//! - Mail drafts, edits and the send flow
//! - HTTP delivery of copies to remote mailboxes
//! - Reception of copies delivered by remote senders

mod delivery;
mod repository;
mod service;
mod types;

pub use delivery::{DeliveryOutcome, DeliveryRequest, DeliveryTransport, HttpDelivery};
pub use repository::MailRepository;
pub use service::{FailureReport, MailService, MailView, RecipientFailure, UpdateOutcome};
pub use types::{
    resolve_recipients, split_tags, Contact, Mail, MailEdit, MailStatus, Mailbox, ReceivedMail,
};
