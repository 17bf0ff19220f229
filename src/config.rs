use std::path::PathBuf;

use crate::error::AppError;

const DEV_JWT_SECRET: &str = "dev-only-classifieds-secret";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_expiry_days: i64,
    pub upload_dir: PathBuf,
    pub production: bool,
    pub db_busy_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub keepalive_url: Option<String>,
    pub keepalive_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let production = std::env::var("APP_ENV")
            .map(|env| env.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if production => {
                return Err(AppError::Config(
                    "JWT_SECRET must be set in production".to_string(),
                ))
            }
            _ => {
                tracing::warn!("JWT_SECRET not set, using development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        Ok(Config {
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parse_var("SERVER_PORT", 4000)?,
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://classifieds.db".to_string()),
            jwt_secret,
            token_expiry_days: parse_var("TOKEN_EXPIRY_DAYS", 30)?,
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "./uploads".to_string())
                .into(),
            production,
            db_busy_timeout_secs: parse_var("DB_BUSY_TIMEOUT_SECS", 5)?,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", 30)?,
            keepalive_url: std::env::var("KEEPALIVE_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            keepalive_interval_secs: parse_var("KEEPALIVE_INTERVAL_SECS", 840)?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
