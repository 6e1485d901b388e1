//! # Admin Repository
//!
//! Storage for dashboard administrator accounts. Hashing and token issuance
//! happen in the server; this layer only stores the PHC hash string.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// A stored administrator account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Admin {
    pub id: String,
    pub username: String,
    /// Argon2 PHC string. Never serialized.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Repository for admin accounts.
#[derive(Debug, Clone)]
pub struct AdminRepository {
    pool: SqlitePool,
}

impl AdminRepository {
    /// Creates a new AdminRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AdminRepository { pool }
    }

    /// Stores a new admin.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the username is taken.
    pub async fn create(&self, username: &str, password_hash: &str) -> DbResult<Admin> {
        let admin = Admin {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };

        debug!(id = %admin.id, username = %admin.username, "Creating admin");

        sqlx::query(
            r#"
            INSERT INTO admins (id, username, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&admin.id)
        .bind(&admin.username)
        .bind(&admin.password_hash)
        .bind(admin.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("username", username),
            other => other,
        })?;

        Ok(admin)
    }

    /// Finds an admin by username.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM admins
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};

    #[tokio::test]
    async fn test_create_and_find() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let admins = db.admins();

        let created = admins.create("admin", "$argon2id$stub").await.unwrap();
        let found = admins.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.password_hash, "$argon2id$stub");

        assert!(admins.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let admins = db.admins();

        admins.create("admin", "h1").await.unwrap();
        let err = admins.create("admin", "h2").await.unwrap_err();
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "username");
                assert_eq!(value, "admin");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
