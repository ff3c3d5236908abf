use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    auth::UserContext,
    error::{ApiError, ApiResult},
    models::{
        Inspection, InspectionCreate, InspectionDetailResponse, InspectionFilters,
        InspectionListResponse, InspectionUpdate, Photo, StatusChange,
    },
    AppState,
};

/// GET /api/inspections
pub async fn list_inspections(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Query(filters): Query<InspectionFilters>,
) -> ApiResult<Json<InspectionListResponse>> {
    let page = state.inspection_service.list(&ctx, &filters).await?;
    Ok(Json(page))
}

/// POST /api/inspections
pub async fn create_inspection(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Json(payload): Json<InspectionCreate>,
) -> ApiResult<(StatusCode, Json<Inspection>)> {
    let inspection = state.inspection_service.create(&ctx, &payload).await?;
    Ok((StatusCode::CREATED, Json(inspection)))
}

/// GET /api/inspections/:id
pub async fn get_inspection(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<InspectionDetailResponse>> {
    let detail = state.inspection_service.get_detail(&ctx, id).await?;
    Ok(Json(detail))
}

/// PUT /api/inspections/:id
pub async fn update_inspection(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<i64>,
    Json(payload): Json<InspectionUpdate>,
) -> ApiResult<Json<Inspection>> {
    let inspection = state.inspection_service.update(&ctx, id, &payload).await?;
    Ok(Json(inspection))
}

/// DELETE /api/inspections/:id
pub async fn delete_inspection(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.inspection_service.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/inspections/:id/status
pub async fn change_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusChange>,
) -> ApiResult<Json<Inspection>> {
    let inspection = state
        .inspection_service
        .change_status(&ctx, id, &payload)
        .await?;
    Ok(Json(inspection))
}

/// POST /api/inspections/:id/photos (multipart, one or more image parts)
pub async fn upload_photos(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Vec<Photo>>)> {
    let mut stored = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::validation(format!("Invalid multipart payload: {err}")))?
    {
        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::validation(format!("Could not read upload: {err}")))?;

        let photo = state
            .inspection_service
            .add_photo(&ctx, id, &mime_type, &bytes)
            .await?;
        stored.push(photo);
    }

    if stored.is_empty() {
        return Err(ApiError::validation("No files in upload"));
    }

    Ok((StatusCode::CREATED, Json(stored)))
}

/// DELETE /api/inspections/:id/photos/:photo_id
pub async fn delete_photo(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path((id, photo_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state
        .inspection_service
        .delete_photo(&ctx, id, photo_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/inspections/:id/signature (multipart, single image part)
pub async fn upload_signature(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let field = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::validation(format!("Invalid multipart payload: {err}")))?
        .ok_or_else(|| ApiError::validation("No file in upload"))?;

    let mime_type = field
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let bytes = field
        .bytes()
        .await
        .map_err(|err| ApiError::validation(format!("Could not read upload: {err}")))?;

    let signature_path = state
        .inspection_service
        .set_signature(&ctx, id, &mime_type, &bytes)
        .await?;

    Ok(Json(json!({"signature_path": signature_path})))
}
