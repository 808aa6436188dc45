//! Authenticated sessions for Mailroom.
//!
//! A session is built per request from HTTP Basic credentials and passed
//! explicitly to every operation that acts on behalf of the user.

use std::fmt;

use sqlx::SqlitePool;
use tracing::debug;

use crate::auth::verify_password;
use crate::db::UserRepository;
use crate::{MailroomError, Result};

/// Login and password presented by the user.
///
/// The password is kept so outbound deliveries can authenticate as the
/// same user at the recipient's server.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login name.
    pub login: String,
    /// Plain-text password.
    pub password: String,
}

impl Credentials {
    /// Create a new credentials pair.
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The authenticated user for the current request.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// User ID.
    pub user_id: i64,
    /// Display name.
    pub name: String,
    /// Credentials the user authenticated with.
    pub credentials: Credentials,
}

impl AuthSession {
    /// Login name of the session user.
    pub fn login(&self) -> &str {
        &self.credentials.login
    }
}

/// Verify credentials against the user table and open a session.
///
/// Unknown logins and wrong passwords produce the same error.
pub async fn authenticate(pool: &SqlitePool, credentials: Credentials) -> Result<AuthSession> {
    let repo = UserRepository::new(pool);
    let user = repo
        .get_by_login(&credentials.login)
        .await?
        .ok_or_else(|| MailroomError::Auth("invalid login or password".to_string()))?;

    verify_password(&credentials.password, &user.password).map_err(|e| {
        debug!("Password verification failed for {}: {}", credentials.login, e);
        MailroomError::Auth("invalid login or password".to_string())
    })?;

    Ok(AuthSession {
        user_id: user.id,
        name: user.name,
        credentials,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::db::{Database, NewUser};

    async fn setup() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        let hash = hash_password("password123").unwrap();
        UserRepository::new(db.pool())
            .create(&NewUser::new("alice", hash, "Alice"))
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let db = setup().await;
        let session = authenticate(db.pool(), Credentials::new("alice", "password123"))
            .await
            .unwrap();

        assert_eq!(session.name, "Alice");
        assert_eq!(session.login(), "alice");
        assert_eq!(session.credentials.password, "password123");
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let db = setup().await;
        let result = authenticate(db.pool(), Credentials::new("alice", "wrongpass")).await;
        assert!(matches!(result, Err(MailroomError::Auth(_))));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let db = setup().await;
        let result = authenticate(db.pool(), Credentials::new("nobody", "password123")).await;
        assert!(matches!(result, Err(MailroomError::Auth(_))));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("alice", "secret-password");
        let debug = format!("{creds:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret-password"));
    }
}
