//! JWT authentication extractor for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRole;
use crate::services::auth as auth_service;
use crate::AppState;

/// Authenticated user extracted from the `Authorization: Bearer` access token.
///
/// Use as an Axum extractor in handlers that require authentication:
/// ```ignore
/// async fn handler(current_user: CurrentUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;

        let claims = auth_service::validate_access_token(bearer.token(), &state.config.jwt_secret)?;

        let id: Uuid = claims
            .user_id
            .parse()
            .map_err(|_| AppError::Unauthorized)?;

        Ok(CurrentUser {
            id,
            email: claims.sub,
            role: claims.role,
        })
    }
}
