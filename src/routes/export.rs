//! CSV export route.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::services::export::{self, Dataset};
use crate::services::period::PeriodFilter;
use crate::AppState;

/// GET /api/v1/export/{dataset}?year=&month=&quarter=
pub async fn export_dataset(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(dataset): Path<Dataset>,
    Query(filter): Query<PeriodFilter>,
) -> Result<impl IntoResponse, AppError> {
    let body = export::export_csv(&state.db, dataset, &filter).await?;
    let disposition = format!("attachment; filename=\"{}\"", dataset.file_name(&filter));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
