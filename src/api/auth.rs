use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::api::state::AppState;
use crate::error::AppError;
use crate::services::AuthSession;

#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub password: Option<String>,
}

fn credentials(
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<CredentialsRequest, AppError> {
    payload
        .map(|Json(req)| req)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e.body_text())))
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthSession>), AppError> {
    let req = credentials(payload)?;
    let session = state
        .auth
        .register(req.password.as_deref().unwrap_or_default())
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<AuthSession>, AppError> {
    let req = credentials(payload)?;
    let session = state.auth.login(req.password.as_deref()).await?;

    Ok(Json(session))
}
