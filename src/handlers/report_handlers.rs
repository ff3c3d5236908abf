use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{rbac, UserContext},
    error::{ApiError, ApiResult},
    models::{Report, ReportSummary, StatusCounts, VerificationResponse},
    repositories::{InspectionRepository, ReportRepository},
    AppState,
};

/// POST /api/inspections/:id/report
pub async fn generate_report(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<i64>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    // Visibility follows the inspection access rule
    state.inspection_service.get_detail(&ctx, id).await?;

    let report = state.report_service.generate(id).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// GET /api/inspections/:id/reports
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Report>>> {
    state.inspection_service.get_detail(&ctx, id).await?;

    let reports = state.report_repository.list_by_inspection(id).await?;
    Ok(Json(reports))
}

async fn pdf_attachment(report: &Report) -> ApiResult<Response> {
    let bytes = tokio::fs::read(&report.file_path).await.map_err(|_| {
        ApiError::not_found(format!("Report file for {} is missing", report.report_uuid))
    })?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"report_{}.pdf\"", report.report_uuid),
        )
        .body(Body::from(bytes))
        .map_err(|err| ApiError::internal(format!("Could not build response: {err}")))?;

    Ok(response)
}

/// GET /api/reports/:id/download
pub async fn download_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let report = state
        .report_repository
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Report {id} not found")))?;

    pdf_attachment(&report).await
}

/// GET /api/reports/by-reference/:report_uuid/download
///
/// Lookup by the external report reference printed on the document, so a
/// holder of the PDF does not need the internal row id.
pub async fn download_report_by_reference(
    State(state): State<AppState>,
    Path(report_uuid): Path<Uuid>,
) -> ApiResult<Response> {
    let report = state
        .report_repository
        .get_by_uuid(&report_uuid)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Report {report_uuid} not found")))?;

    pdf_attachment(&report).await
}

/// GET /api/reports/:id/custody (admin)
pub async fn custody_report(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    rbac::require_admin(&ctx)?;

    let bytes = state.report_service.custody_pdf(id).await?;
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"custody_{id}.pdf\""),
        )
        .body(Body::from(bytes))
        .map_err(|err| ApiError::internal(format!("Could not build response: {err}")))?;

    Ok(response)
}

/// GET /api/verify/:inspection_id/:claimed_hash (public, no auth)
pub async fn verify_report(
    State(state): State<AppState>,
    Path((inspection_id, claimed_hash)): Path<(i64, String)>,
) -> ApiResult<Json<VerificationResponse>> {
    let outcome = state
        .report_service
        .verify(inspection_id, &claimed_hash)
        .await?;
    Ok(Json(outcome))
}

/// GET /api/reports/status-counts
///
/// Inspector callers get counts over their own inspections only.
pub async fn status_counts(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
) -> ApiResult<Json<StatusCounts>> {
    let counts = state
        .inspection_repository
        .status_counts(rbac::inspector_scope(&ctx))
        .await?;
    Ok(Json(counts))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// GET /api/reports/summary
pub async fn summary(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<ReportSummary>> {
    let summary = state
        .inspection_repository
        .summary(query.date_from, query.date_to, rbac::inspector_scope(&ctx))
        .await?;
    Ok(Json(summary))
}
