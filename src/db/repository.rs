//! User repository for Mailroom.

use sqlx::SqlitePool;

use super::user::{NewUser, User};
use crate::{MailroomError, Result};

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query("INSERT INTO users (login, password, name) VALUES (?, ?, ?)")
            .bind(&new_user.login)
            .bind(&new_user.password)
            .bind(&new_user.name)
            .execute(self.pool)
            .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| MailroomError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, login, password, name, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by login (case-insensitive).
    pub async fn get_by_login(&self, login: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, login, password, name, created_at FROM users WHERE login = ? COLLATE NOCASE",
        )
        .bind(login)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Check if a login is already taken.
    pub async fn login_exists(&self, login: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE login = ? COLLATE NOCASE)",
        )
        .bind(login)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("alice", "hash", "Alice"))
            .await
            .unwrap();
        assert!(user.id > 0);
        assert_eq!(user.login, "alice");
        assert_eq!(user.name, "Alice");

        let fetched = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.login, "alice");
    }

    #[tokio::test]
    async fn test_get_by_login_case_insensitive() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("Alice", "hash", "Alice"))
            .await
            .unwrap();

        let user = repo.get_by_login("ALICE").await.unwrap();
        assert!(user.is_some());
        assert!(repo.login_exists("alice").await.unwrap());
        assert!(!repo.login_exists("bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_login_rejected() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("alice", "hash", "Alice"))
            .await
            .unwrap();

        let result = repo.create(&NewUser::new("ALICE", "hash", "Other")).await;
        assert!(matches!(result, Err(MailroomError::Database(_))));
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        assert!(repo.get_by_id(42).await.unwrap().is_none());
    }
}
