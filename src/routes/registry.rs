//! Registry routes: technicians, servers and security controls.
//!
//! Reads are open to any authenticated user; writes require an admin.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireAdmin;
use crate::models::security_control::{
    CreateSecurityControl, SecurityControl, UpdateSecurityControl,
};
use crate::models::server::{CreateServer, Server, UpdateServer};
use crate::models::technician::{CreateTechnician, Technician, UpdateTechnician};
use crate::services::registry;
use crate::AppState;

/// GET /api/v1/technicians
pub async fn list_technicians(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<Technician>>>, AppError> {
    Ok(ApiResponse::success(registry::list_technicians(&state.db).await?))
}

/// GET /api/v1/technicians/{id}
pub async fn get_technician(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Technician>>, AppError> {
    Ok(ApiResponse::success(registry::find_technician(&state.db, id).await?))
}

/// POST /api/v1/technicians (admin)
pub async fn create_technician(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CreateTechnician>,
) -> Result<Json<ApiResponse<Technician>>, AppError> {
    Ok(ApiResponse::success(registry::create_technician(&state.db, &body).await?))
}

/// PUT /api/v1/technicians/{id} (admin)
pub async fn update_technician(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTechnician>,
) -> Result<Json<ApiResponse<Technician>>, AppError> {
    Ok(ApiResponse::success(registry::update_technician(&state.db, id, &body).await?))
}

/// DELETE /api/v1/technicians/{id} (admin)
pub async fn delete_technician(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    registry::delete_technician(&state.db, id).await?;
    Ok(ApiResponse::success(id))
}

/// GET /api/v1/servers
pub async fn list_servers(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<Server>>>, AppError> {
    Ok(ApiResponse::success(registry::list_servers(&state.db).await?))
}

/// GET /api/v1/servers/{id}
pub async fn get_server(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Server>>, AppError> {
    Ok(ApiResponse::success(registry::find_server(&state.db, id).await?))
}

/// POST /api/v1/servers (admin)
pub async fn create_server(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CreateServer>,
) -> Result<Json<ApiResponse<Server>>, AppError> {
    Ok(ApiResponse::success(registry::create_server(&state.db, &body).await?))
}

/// PUT /api/v1/servers/{id} (admin)
pub async fn update_server(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateServer>,
) -> Result<Json<ApiResponse<Server>>, AppError> {
    Ok(ApiResponse::success(registry::update_server(&state.db, id, &body).await?))
}

/// DELETE /api/v1/servers/{id} (admin)
pub async fn delete_server(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    registry::delete_server(&state.db, id).await?;
    Ok(ApiResponse::success(id))
}

/// GET /api/v1/security-controls
pub async fn list_controls(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<SecurityControl>>>, AppError> {
    Ok(ApiResponse::success(registry::list_controls(&state.db).await?))
}

/// GET /api/v1/security-controls/{id}
pub async fn get_control(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SecurityControl>>, AppError> {
    Ok(ApiResponse::success(registry::find_control(&state.db, id).await?))
}

/// POST /api/v1/security-controls (admin)
pub async fn create_control(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CreateSecurityControl>,
) -> Result<Json<ApiResponse<SecurityControl>>, AppError> {
    Ok(ApiResponse::success(registry::create_control(&state.db, &body).await?))
}

/// PUT /api/v1/security-controls/{id} (admin)
pub async fn update_control(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSecurityControl>,
) -> Result<Json<ApiResponse<SecurityControl>>, AppError> {
    Ok(ApiResponse::success(registry::update_control(&state.db, id, &body).await?))
}

/// DELETE /api/v1/security-controls/{id} (admin)
pub async fn delete_control(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    registry::delete_control(&state.db, id).await?;
    Ok(ApiResponse::success(id))
}
