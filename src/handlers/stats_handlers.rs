use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::{
    auth::{rbac, UserContext},
    error::ApiResult,
    models::DashboardData,
    repositories::InspectionRepository,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// GET /api/stats/dashboard
///
/// Defaults to the last 30 days. Inspectors only see their own figures;
/// supervisors and admins see everything.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<DashboardData>> {
    let date_to = query.date_to.unwrap_or_else(Utc::now);
    let date_from = query.date_from.unwrap_or(date_to - Duration::days(30));

    let data = state
        .inspection_repository
        .dashboard(date_from, date_to, rbac::inspector_scope(&ctx))
        .await?;
    Ok(Json(data))
}
