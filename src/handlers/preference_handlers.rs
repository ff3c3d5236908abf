use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::{
    auth::UserContext,
    error::{ApiError, ApiResult},
    models::{PreferencesUpdate, UserPreferences},
    repositories::PreferenceRepository,
    AppState,
};

fn ensure_own_or_admin(ctx: &UserContext, user_id: i64) -> Result<(), ApiError> {
    if ctx.user_id == user_id || ctx.is_admin() {
        Ok(())
    } else {
        Err(ApiError::authorization(
            "Preferences are only accessible to their owner",
        ))
    }
}

/// GET /api/users/:id/preferences
///
/// First read materializes the default row for the user.
pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserPreferences>> {
    ensure_own_or_admin(&ctx, user_id)?;
    let preferences = state.preference_repository.get_or_create(user_id).await?;
    Ok(Json(preferences))
}

/// PUT /api/users/:id/preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(user_id): Path<i64>,
    Json(payload): Json<PreferencesUpdate>,
) -> ApiResult<Json<UserPreferences>> {
    ensure_own_or_admin(&ctx, user_id)?;
    let preferences = state
        .preference_repository
        .update(user_id, &payload)
        .await?;
    Ok(Json(preferences))
}
