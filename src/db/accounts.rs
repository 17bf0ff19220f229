use sqlx::{Pool, Sqlite};

use crate::db::models::Account;
use crate::error::AppError;

pub struct AccountRepository;

impl AccountRepository {
    /// Insert a new account. A duplicate signature surfaces as `Conflict`.
    pub async fn create(
        pool: &Pool<Sqlite>,
        password_signature: &str,
        password_hash: &[u8; 32],
        password_salt: &[u8; 32],
    ) -> Result<Account, AppError> {
        let created_at = chrono::Utc::now().timestamp_millis();

        let account = sqlx::query_as::<_, Account>(
            r#"
INSERT INTO accounts (password_signature, password_hash, password_salt, created_at)
VALUES (?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(password_signature)
        .bind(password_hash.as_slice())
        .bind(password_salt.as_slice())
        .bind(created_at)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("An account with this password already exists".to_string())
            }
            other => AppError::from(other),
        })?;

        Ok(account)
    }

    pub async fn get_by_signature(
        pool: &Pool<Sqlite>,
        password_signature: &str,
    ) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE password_signature = ?"
        )
        .bind(password_signature)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    pub async fn get_by_id(
        pool: &Pool<Sqlite>,
        id: i64,
    ) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }
}
