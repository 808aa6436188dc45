//! User registration for Mailroom.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::auth::{hash_password, PasswordError};
use crate::db::{NewUser, User, UserRepository};
use crate::MailroomError;

/// Maximum length of a login name.
pub const MAX_LOGIN_LENGTH: usize = 32;

/// Maximum length of a display name.
pub const MAX_NAME_LENGTH: usize = 64;

/// Registration-specific errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// The login name is malformed.
    #[error("login must be 1-{MAX_LOGIN_LENGTH} letters, digits, '.', '_' or '-'")]
    InvalidLogin,

    /// The display name is empty or too long.
    #[error("name must be 1-{MAX_NAME_LENGTH} characters")]
    InvalidName,

    /// Login already exists.
    #[error("login already exists")]
    LoginExists,

    /// Password rejected or hashing failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Storage error.
    #[error(transparent)]
    Storage(#[from] MailroomError),
}

impl From<RegistrationError> for MailroomError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Storage(inner) => inner,
            RegistrationError::Password(PasswordError::HashError(msg)) => {
                MailroomError::Auth(format!("password hashing failed: {msg}"))
            }
            other => MailroomError::Validation(other.to_string()),
        }
    }
}

/// Registration request data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Desired login name.
    pub login: String,
    /// Password (8-128 characters).
    pub password: String,
    /// Display name.
    pub name: String,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(
        login: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            name: name.into(),
        }
    }
}

fn validate_login(login: &str) -> Result<(), RegistrationError> {
    let valid = !login.is_empty()
        && login.chars().count() <= MAX_LOGIN_LENGTH
        && login
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(RegistrationError::InvalidLogin)
    }
}

fn validate_name(name: &str) -> Result<(), RegistrationError> {
    let len = name.trim().chars().count();
    if len == 0 || len > MAX_NAME_LENGTH {
        return Err(RegistrationError::InvalidName);
    }
    Ok(())
}

/// Register a new user.
///
/// Validates the request, rejects taken logins, hashes the password and
/// stores the user.
pub async fn register(
    pool: &SqlitePool,
    request: &RegistrationRequest,
) -> Result<User, RegistrationError> {
    validate_login(&request.login)?;
    validate_name(&request.name)?;

    let repo = UserRepository::new(pool);
    if repo.login_exists(&request.login).await? {
        return Err(RegistrationError::LoginExists);
    }

    let hash = hash_password(&request.password)?;
    let user = repo
        .create(&NewUser::new(&request.login, hash, request.name.trim()))
        .await?;

    info!("Registered user {} (id {})", user.login, user.id);
    Ok(user)
}
