//! User model for Mailroom.

/// User entity representing a registered user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login name (unique, case-insensitive).
    pub login: String,
    /// Password hash (Argon2).
    pub password: String,
    /// Display name.
    pub name: String,
    /// Account creation timestamp.
    pub created_at: String,
}

/// New user for registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login name.
    pub login: String,
    /// Password hash (should already be hashed).
    pub password: String,
    /// Display name.
    pub name: String,
}

impl NewUser {
    /// Create a new user.
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
