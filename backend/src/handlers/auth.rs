//! Authentication handlers

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::AppError;
use crate::services::auth::{AuthTokens, LoginInput};
use crate::services::AuthService;
use crate::AppState;

/// Request body for token refresh
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Log in with employee code and password
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<AuthTokens>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.login(input).await?;

    Ok(Json(tokens))
}

/// Exchange a refresh token for a new token pair
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AuthTokens>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.refresh_token(&request.refresh_token).await?;

    Ok(Json(tokens))
}
