use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::{
    auth::{rbac, UserContext},
    error::ApiResult,
    models::{UserCreate, UserResponse},
    repositories::UserRepository,
    utils::crypto,
    AppState,
};

/// GET /api/users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    rbac::require_admin(&ctx)?;
    let users = state.user_repository.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /api/users (admin)
pub async fn create_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Json(payload): Json<UserCreate>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    rbac::require_admin(&ctx)?;

    let password_hash = crypto::hash_password(&payload.password)?;
    let user = state
        .user_repository
        .create(&payload.name, &payload.email, &password_hash, payload.role)
        .await?;

    tracing::info!(user_id = user.id, created_by = ctx.user_id, "user created");
    Ok((StatusCode::CREATED, Json(user.into())))
}
