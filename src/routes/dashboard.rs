//! Dashboard routes: aggregated statistics for the overview page.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::services::aggregation::{AggregationOptions, DashboardStats};
use crate::services::dashboard::{self, DashboardComparison};
use crate::services::period::PeriodFilter;
use crate::AppState;

fn options(state: &AppState) -> AggregationOptions {
    AggregationOptions {
        compliance_averaging: state.config.compliance_averaging,
    }
}

/// GET /api/v1/dashboard/stats?year=&month=&quarter=
pub async fn stats(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filter): Query<PeriodFilter>,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let stats = dashboard::get_stats(&state.db, &filter, options(&state)).await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/v1/dashboard/comparison?year=&month=&quarter=
pub async fn comparison(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filter): Query<PeriodFilter>,
) -> Result<Json<ApiResponse<DashboardComparison>>, AppError> {
    let comparison = dashboard::compare(&state.db, &filter, options(&state)).await?;
    Ok(ApiResponse::success(comparison))
}
