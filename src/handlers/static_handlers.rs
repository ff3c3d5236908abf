use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};

use crate::{
    error::{ApiError, ApiResult},
    AppState,
};

/// GET /api/static/captures/*file
///
/// Serves stored photos and signatures. Paths are confined to the captures
/// directory; any traversal attempt is rejected before touching the disk.
pub async fn serve_capture(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> ApiResult<Response> {
    if file.contains("..") || file.starts_with('/') {
        return Err(ApiError::validation("Invalid file path"));
    }

    let path = state.config.captures_dir().join(&file);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::not_found(format!("File {file} not found")))?;

    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(Body::from(bytes))
        .map_err(|err| ApiError::internal(format!("Could not build response: {err}")))?;

    Ok(response)
}
