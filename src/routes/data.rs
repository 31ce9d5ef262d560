//! Monthly data routes: list records for a period and upsert single records.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireAdmin;
use crate::models::metrics::{
    CyberSecurityRecord, EndpointRecord, HelpdeskRecord, ServerSecurityRecord,
    TechIncidentRecord, UpsertCyberSecurity, UpsertEndpoint, UpsertHelpdesk,
    UpsertServerSecurity, UpsertTechIncident,
};
use crate::services::metrics::{self, ListOrder, MetricFilters};
use crate::services::period::PeriodFilter;
use crate::AppState;

/// GET /api/v1/data/helpdesk?year=&month=&quarter=&technician_id=
pub async fn list_helpdesk(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(period): Query<PeriodFilter>,
    Query(filters): Query<MetricFilters>,
) -> Result<Json<ApiResponse<Vec<HelpdeskRecord>>>, AppError> {
    let window = period.resolve()?;
    let rows = metrics::list_helpdesk(
        &state.db,
        &window,
        filters.technician_id,
        ListOrder::NewestFirst,
    )
    .await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/v1/data/helpdesk (admin)
pub async fn upsert_helpdesk(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<UpsertHelpdesk>,
) -> Result<Json<ApiResponse<HelpdeskRecord>>, AppError> {
    Ok(ApiResponse::success(metrics::upsert_helpdesk(&state.db, &body).await?))
}

/// GET /api/v1/data/endpoints?year=&month=&quarter=
pub async fn list_endpoints(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(period): Query<PeriodFilter>,
) -> Result<Json<ApiResponse<Vec<EndpointRecord>>>, AppError> {
    let window = period.resolve()?;
    let rows = metrics::list_endpoints(&state.db, &window, ListOrder::NewestFirst).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/v1/data/endpoints (admin)
pub async fn upsert_endpoint(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<UpsertEndpoint>,
) -> Result<Json<ApiResponse<EndpointRecord>>, AppError> {
    Ok(ApiResponse::success(metrics::upsert_endpoint(&state.db, &body).await?))
}

/// GET /api/v1/data/server-security?year=&month=&quarter=&server_id=
pub async fn list_server_security(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(period): Query<PeriodFilter>,
    Query(filters): Query<MetricFilters>,
) -> Result<Json<ApiResponse<Vec<ServerSecurityRecord>>>, AppError> {
    let window = period.resolve()?;
    let rows = metrics::list_server_security(
        &state.db,
        &window,
        filters.server_id,
        ListOrder::NewestFirst,
    )
    .await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/v1/data/server-security (admin)
pub async fn upsert_server_security(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<UpsertServerSecurity>,
) -> Result<Json<ApiResponse<ServerSecurityRecord>>, AppError> {
    Ok(ApiResponse::success(metrics::upsert_server_security(&state.db, &body).await?))
}

/// GET /api/v1/data/cybersecurity?year=&month=&quarter=
pub async fn list_cyber_security(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(period): Query<PeriodFilter>,
) -> Result<Json<ApiResponse<Vec<CyberSecurityRecord>>>, AppError> {
    let window = period.resolve()?;
    let rows = metrics::list_cyber_security(&state.db, &window, ListOrder::NewestFirst).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/v1/data/cybersecurity (admin)
pub async fn upsert_cyber_security(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<UpsertCyberSecurity>,
) -> Result<Json<ApiResponse<CyberSecurityRecord>>, AppError> {
    Ok(ApiResponse::success(metrics::upsert_cyber_security(&state.db, &body).await?))
}

/// GET /api/v1/data/tech-incidents?year=&month=&quarter=
pub async fn list_tech_incidents(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(period): Query<PeriodFilter>,
) -> Result<Json<ApiResponse<Vec<TechIncidentRecord>>>, AppError> {
    let window = period.resolve()?;
    let rows = metrics::list_tech_incidents(&state.db, &window, ListOrder::NewestFirst).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/v1/data/tech-incidents (admin)
pub async fn upsert_tech_incident(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<UpsertTechIncident>,
) -> Result<Json<ApiResponse<TechIncidentRecord>>, AppError> {
    Ok(ApiResponse::success(metrics::upsert_tech_incident(&state.db, &body).await?))
}
