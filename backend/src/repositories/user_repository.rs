//! Database repository for user accounts.
//!
//! `AccountStore` is the persistence boundary used by the identity flows and
//! the profile service. `UserRepository` implements it on SQLite.
//!
//! Token consumption is done with conditional updates keyed on the token the
//! caller observed, so two requests racing on the same token cannot both win.

use crate::database::models::{CreateUser, User};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;

const USER_COLUMNS: &str = "id, username, email, password_hash, verification_token, \
     is_verified, is_seller, is_admin, location, created_at";

/// Failure modes of inserting a user.
#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("username already taken")]
    UsernameTaken,
    #[error("email already registered")]
    EmailTaken,
    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

/// Persistence operations on user accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Inserts a new, unverified user.
    async fn create(&self, user: CreateUser) -> Result<User, CreateUserError>;

    /// Overwrites the outstanding token, superseding any previous one.
    async fn set_verification_token(&self, id: i64, token: &str) -> Result<bool>;

    /// Replaces the outstanding token of a still-unverified user. `false`
    /// means the account was verified in the meantime and nothing changed.
    async fn reissue_verification_token(&self, id: i64, token: &str) -> Result<bool>;

    /// Clears the token and marks the user verified, but only while
    /// `expected_token` is still the stored token.
    async fn mark_verified(&self, id: i64, expected_token: &str) -> Result<bool>;

    /// Replaces the password hash and clears the token, but only while
    /// `expected_token` is still the stored token.
    async fn reset_password(&self, id: i64, expected_token: &str, password_hash: &str)
    -> Result<bool>;

    /// Grants the seller role. This is the only writer of `is_seller`.
    async fn set_seller(&self, id: i64) -> Result<bool>;
}

/// SQLite-backed account store.
#[derive(Clone)]
pub struct UserRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool (cheap to clone)
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}

#[async_trait]
impl AccountStore for UserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_one("email", email).await
    }

    async fn create(&self, user: CreateUser) -> Result<User, CreateUserError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, verification_token, location, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.verification_token)
            .bind(&user.location)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let error_msg = e.to_string();
                if error_msg.contains("UNIQUE constraint failed: users.username") {
                    CreateUserError::UsernameTaken
                } else if error_msg.contains("UNIQUE constraint failed: users.email") {
                    CreateUserError::EmailTaken
                } else {
                    CreateUserError::Database(e.into())
                }
            })
    }

    async fn set_verification_token(&self, id: i64, token: &str) -> Result<bool> {
        let rows_affected = sqlx::query("UPDATE users SET verification_token = ? WHERE id = ?")
            .bind(token)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn reissue_verification_token(&self, id: i64, token: &str) -> Result<bool> {
        let rows_affected = sqlx::query(
            "UPDATE users SET verification_token = ? WHERE id = ? AND is_verified = 0",
        )
        .bind(token)
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn mark_verified(&self, id: i64, expected_token: &str) -> Result<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET verification_token = NULL,
                is_verified = 1
            WHERE id = ? AND verification_token = ?
            "#,
        )
        .bind(id)
        .bind(expected_token)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn reset_password(
        &self,
        id: i64,
        expected_token: &str,
        password_hash: &str,
    ) -> Result<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = ?,
                verification_token = NULL
            WHERE id = ? AND verification_token = ?
            "#,
        )
        .bind(password_hash)
        .bind(id)
        .bind(expected_token)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn set_seller(&self, id: i64) -> Result<bool> {
        let rows_affected = sqlx::query("UPDATE users SET is_seller = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;

    fn new_user(username: &str, email: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            verification_token: "token-1".to_string(),
            location: None,
        }
    }

    #[tokio::test]
    async fn create_and_find() {
        let repo = UserRepository::new(test_pool().await);

        let created = repo.create(new_user("alice", "alice@x.com")).await.unwrap();
        assert!(created.id > 0);
        assert!(!created.is_verified);
        assert!(!created.is_seller);
        assert!(!created.is_admin);
        assert_eq!(created.verification_token.as_deref(), Some("token-1"));

        let by_email = repo.find_by_email("alice@x.com").await.unwrap().unwrap();
        let by_name = repo.find_by_username("alice").await.unwrap().unwrap();
        let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_name.id, created.id);
        assert_eq!(by_id.created_at, created.created_at);

        assert!(repo.find_by_email("bob@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_and_email_are_distinguished() {
        let repo = UserRepository::new(test_pool().await);
        repo.create(new_user("alice", "alice@x.com")).await.unwrap();

        let err = repo.create(new_user("alice", "other@x.com")).await.unwrap_err();
        assert!(matches!(err, CreateUserError::UsernameTaken));

        let err = repo.create(new_user("bob", "alice@x.com")).await.unwrap_err();
        assert!(matches!(err, CreateUserError::EmailTaken));
    }

    #[tokio::test]
    async fn mark_verified_requires_current_token() {
        let repo = UserRepository::new(test_pool().await);
        let user = repo.create(new_user("alice", "alice@x.com")).await.unwrap();

        assert!(repo.set_verification_token(user.id, "token-2").await.unwrap());
        assert!(!repo.mark_verified(user.id, "token-1").await.unwrap());
        assert!(repo.mark_verified(user.id, "token-2").await.unwrap());
        // consumed
        assert!(!repo.mark_verified(user.id, "token-2").await.unwrap());

        let user = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert!(user.is_verified);
        assert!(user.verification_token.is_none());
    }

    #[tokio::test]
    async fn reissue_only_touches_unverified_users() {
        let repo = UserRepository::new(test_pool().await);
        let user = repo.create(new_user("alice", "alice@x.com")).await.unwrap();

        assert!(repo.reissue_verification_token(user.id, "token-2").await.unwrap());
        assert!(repo.mark_verified(user.id, "token-2").await.unwrap());
        assert!(!repo.reissue_verification_token(user.id, "token-3").await.unwrap());

        let user = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert!(user.is_verified);
        assert!(user.verification_token.is_none());
    }

    #[tokio::test]
    async fn reset_password_requires_current_token() {
        let repo = UserRepository::new(test_pool().await);
        let user = repo.create(new_user("alice", "alice@x.com")).await.unwrap();

        assert!(!repo.reset_password(user.id, "stale", "new-hash").await.unwrap());
        assert!(repo.reset_password(user.id, "token-1", "new-hash").await.unwrap());

        let user = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(user.password_hash, "new-hash");
        assert!(user.verification_token.is_none());
    }

    #[tokio::test]
    async fn set_seller_flags_only_that_user() {
        let repo = UserRepository::new(test_pool().await);
        let alice = repo.create(new_user("alice", "alice@x.com")).await.unwrap();
        let bob = repo.create(new_user("bob", "bob@x.com")).await.unwrap();

        assert!(repo.set_seller(alice.id).await.unwrap());
        assert!(!repo.set_seller(9999).await.unwrap());

        assert!(repo.find_by_id(alice.id).await.unwrap().unwrap().is_seller);
        assert!(!repo.find_by_id(bob.id).await.unwrap().unwrap().is_seller);
    }
}
