//! # User Repository
//!
//! Account storage. Password hashes are produced and checked by the API
//! layer; this module only stores the PHC strings.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use wheels_core::User;

const USER_COLUMNS: &str = "id, name, email, is_admin, created_at";

/// A user row including the stored password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub password_hash: String,
}

impl UserCredentials {
    /// Drops the hash.
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            is_admin: self.is_admin,
            created_at: self.created_at,
        }
    }
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user.
    ///
    /// ## Errors
    /// `UniqueViolation` on `users.email` when the address is taken.
    pub async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> DbResult<User> {
        debug!(email = %email, is_admin, "Inserting user");

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, is_admin, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(is_admin)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: email.to_string(),
            },
            other => other,
        })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::Internal(format!("user {id} vanished after insert")))
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Gets a user and password hash by (already normalized) email.
    pub async fn get_credentials_by_email(&self, email: &str) -> DbResult<Option<UserCredentials>> {
        let creds = sqlx::query_as::<_, UserCredentials>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(creds)
    }

    /// Gets a user and password hash by ID.
    pub async fn get_credentials_by_id(&self, id: i64) -> DbResult<Option<UserCredentials>> {
        let creds = sqlx::query_as::<_, UserCredentials>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(creds)
    }

    /// Updates the display name and, when given, the password hash.
    pub async fn update_profile(
        &self,
        id: i64,
        name: &str,
        password_hash: Option<&str>,
    ) -> DbResult<User> {
        debug!(id, password_changed = password_hash.is_some(), "Updating profile");

        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = ?2,
                password_hash = COALESCE(?3, password_hash)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        let user = users.insert("Ann", "ann@example.com", "hash-1", false).await.unwrap();
        assert!(!user.is_admin);

        let creds = users
            .get_credentials_by_email("ann@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.password_hash, "hash-1");
        assert_eq!(creds.clone().into_user(), user);

        assert!(users.get_credentials_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        users.insert("Ann", "ann@example.com", "h", false).await.unwrap();
        let err = users.insert("Ann 2", "ann@example.com", "h", false).await.unwrap_err();
        match err {
            DbError::UniqueViolation { field, value } => {
                assert!(field.contains("email"));
                assert_eq!(value, "ann@example.com");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_profile_keeps_hash_when_absent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();
        let user = users.insert("Ann", "ann@example.com", "old", false).await.unwrap();

        let renamed = users.update_profile(user.id, "Ann Lee", None).await.unwrap();
        assert_eq!(renamed.name, "Ann Lee");
        let creds = users.get_credentials_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(creds.password_hash, "old");

        users.update_profile(user.id, "Ann Lee", Some("new")).await.unwrap();
        let creds = users.get_credentials_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(creds.password_hash, "new");

        assert!(matches!(
            users.update_profile(404, "x", None).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
