use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::{auth::UserContext, error::ApiResult, models::Notification, AppState};

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = state
        .notification_service
        .list_for_user(ctx.user_id, ctx.role)
        .await?;
    Ok(Json(notifications))
}

/// POST /api/notifications/:id/read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .notification_service
        .mark_read(&id, ctx.user_id, ctx.role)
        .await?;
    Ok(Json(serde_json::json!({"read": true})))
}
