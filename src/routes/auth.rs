//! Authentication routes: login, refresh, logout, user creation, profile.

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireAdmin;
use crate::models::user::{CreateUser, UserResponse};
use crate::services::auth as auth_service;
use crate::services::auth::TokenPair;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    body.validate()?;
    let tokens = auth_service::login(
        &state.db,
        &body.email,
        &body.password,
        &state.config.jwt_secret,
        state.config.jwt_access_token_expiry_secs,
        state.config.jwt_refresh_token_expiry_secs,
    )
    .await?;

    Ok(ApiResponse::success(tokens))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    let tokens = auth_service::refresh_token(
        &state.db,
        &body.refresh_token,
        &state.config.jwt_secret,
        state.config.jwt_access_token_expiry_secs,
        state.config.jwt_refresh_token_expiry_secs,
    )
    .await?;

    Ok(ApiResponse::success(tokens))
}

/// POST /api/v1/auth/logout. Tokens are stateless; the client discards them.
pub async fn logout(current_user: CurrentUser) -> Json<ApiResponse<&'static str>> {
    tracing::info!(user_id = %current_user.id, email = %current_user.email, "User logged out");
    ApiResponse::success("Logged out")
}

/// POST /api/v1/auth/users (admin)
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CreateUser>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = auth_service::create_user(&state.db, &body).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = auth_service::find_user_by_id(&state.db, current_user.id).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}
