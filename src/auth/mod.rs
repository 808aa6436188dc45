//! Authentication module for Mailroom.
//!
//! Password hashing, user registration and per-request sessions.

mod password;
mod registration;
mod session;

pub use password::{hash_password, validate_password, verify_password, PasswordError};
pub use registration::{register, RegistrationError, RegistrationRequest};
pub use session::{authenticate, AuthSession, Credentials};
