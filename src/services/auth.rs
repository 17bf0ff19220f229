//! Account registration, login and bearer-token validation.
//!
//! Accounts have no username: an account is identified by the fingerprint of
//! its password, so one password maps to exactly one identity.

use std::sync::Arc;

use serde::Serialize;
use sqlx::{Pool, Sqlite};

use crate::config::Config;
use crate::crypto::{generate_salt, hash_password, issue_token, password_signature, verify_password, verify_token};
use crate::db::{Account, AccountRepository};
use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 4;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user_id: i64,
    pub token: String,
}

#[derive(Clone)]
pub struct AuthService {
    db: Pool<Sqlite>,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(db: Pool<Sqlite>, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    pub async fn register(&self, password: &str) -> Result<AuthSession, AppError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let signature = password_signature(password);
        if AccountRepository::get_by_signature(&self.db, &signature).await?.is_some() {
            return Err(AppError::Conflict(
                "An account with this password already exists".to_string(),
            ));
        }

        let salt = generate_salt();
        let hash = hash_password(password, &salt)?;

        // A concurrent registration that wins the race still trips the unique index
        let account = AccountRepository::create(&self.db, &signature, &hash, &salt).await?;
        tracing::info!(account_id = account.id, "account registered");

        self.session_for(account.id)
    }

    pub async fn login(&self, password: Option<&str>) -> Result<AuthSession, AppError> {
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation("Password is required".to_string()))?;

        let account = AccountRepository::get_by_signature(&self.db, &password_signature(password))
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(password, &account.password_hash, &account.password_salt)? {
            return Err(invalid_credentials());
        }

        tracing::debug!(account_id = account.id, "login succeeded");
        self.session_for(account.id)
    }

    /// Resolve a bearer token to its account.
    ///
    /// A missing, malformed or expired token, or one for an unknown account,
    /// yields `Ok(None)`. Store faults are returned as errors.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Option<Account>, AppError> {
        let Some(token) = token else {
            return Ok(None);
        };

        let account_id = match verify_token(token, &self.config.jwt_secret) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!("rejected bearer token: {}", e);
                return Ok(None);
            }
        };

        AccountRepository::get_by_id(&self.db, account_id).await
    }

    fn session_for(&self, account_id: i64) -> Result<AuthSession, AppError> {
        let token = issue_token(account_id, &self.config.jwt_secret, self.config.token_expiry_days)?;
        Ok(AuthSession {
            user_id: account_id,
            token,
        })
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthenticated("Invalid credentials".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{test_config, test_pool};

    async fn service() -> (AuthService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let pool = test_pool(&config).await;
        (AuthService::new(pool, Arc::new(config)), dir)
    }

    #[tokio::test]
    async fn test_register_then_duplicate_conflicts() {
        let (auth, _dir) = service().await;

        for password in ["abcd", "longer password", "ünïcødé"] {
            auth.register(password).await.unwrap();
            let err = auth.register(password).await.unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)), "{password}");
        }
    }

    #[tokio::test]
    async fn test_register_short_password() {
        let (auth, _dir) = service().await;

        for password in ["", "a", "abc"] {
            let err = auth.register(password).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let (auth, _dir) = service().await;

        let registered = auth.register("abcd").await.unwrap();
        let session = auth.login(Some("abcd")).await.unwrap();
        assert_eq!(session.user_id, registered.user_id);
        assert_eq!(
            verify_token(&session.token, "test-secret").unwrap(),
            registered.user_id
        );

        let account = auth.authenticate(Some(&session.token)).await.unwrap().unwrap();
        assert_eq!(account.id, registered.user_id);
    }

    #[tokio::test]
    async fn test_login_failures() {
        let (auth, _dir) = service().await;
        auth.register("abcd").await.unwrap();

        assert!(matches!(auth.login(None).await.unwrap_err(), AppError::Validation(_)));
        assert!(matches!(auth.login(Some("")).await.unwrap_err(), AppError::Validation(_)));
        assert!(matches!(
            auth.login(Some("abcde")).await.unwrap_err(),
            AppError::Unauthenticated(_)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_bad_tokens() {
        let (auth, _dir) = service().await;

        assert!(auth.authenticate(None).await.unwrap().is_none());
        assert!(auth.authenticate(Some("garbage")).await.unwrap().is_none());

        let foreign = issue_token(1, "other-secret", 30).unwrap();
        assert!(auth.authenticate(Some(&foreign)).await.unwrap().is_none());

        let expired = issue_token(1, "test-secret", -2).unwrap();
        assert!(auth.authenticate(Some(&expired)).await.unwrap().is_none());

        // Well-signed but for an account that does not exist
        let unknown = issue_token(9999, "test-secret", 30).unwrap();
        assert!(auth.authenticate(Some(&unknown)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_authenticate_surfaces_store_faults() {
        let (auth, _dir) = service().await;
        let session = auth.register("abcd").await.unwrap();

        auth.db.close().await;

        let err = auth.authenticate(Some(&session.token)).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_) | AppError::StorageBusy(_)));

        // Token problems are still decided without touching the store
        assert!(auth.authenticate(Some("garbage")).await.unwrap().is_none());
    }
}
