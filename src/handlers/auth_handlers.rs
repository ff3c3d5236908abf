use axum::{extract::State, Extension, Json};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use serde::Deserialize;

use crate::{
    auth::{UserContext, UserSession},
    error::{ApiError, ApiResult},
    middleware::auth::SESSION_COOKIE,
    models::UserResponse,
    repositories::UserRepository,
    utils::crypto,
    AppState,
};

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<(PrivateCookieJar, Json<UserResponse>)> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let user = state
        .auth_service
        .authenticate(&payload.email, &payload.password)
        .await?;

    let session = UserSession::new(&user, state.config.session_ttl_minutes);
    let cookie = Cookie::build((SESSION_COOKIE, serde_json::to_string(&session)?))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Json(user.into())))
}

/// POST /api/auth/logout
pub async fn logout(jar: PrivateCookieJar) -> (PrivateCookieJar, Json<serde_json::Value>) {
    (
        jar.remove(Cookie::from(SESSION_COOKIE)),
        Json(serde_json::json!({"logged_out": true})),
    )
}

/// GET /api/auth/me
pub async fn me(Extension(ctx): Extension<UserContext>) -> Json<UserContext> {
    Json(ctx)
}

#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

/// POST /api/auth/change-password
///
/// Self service; the current password is required as proof of identity.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Json(payload): Json<PasswordChangeRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if payload.new_password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::validation(format!(
            "New password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let user = state
        .user_repository
        .get_by_id(ctx.user_id)
        .await?
        .ok_or_else(|| ApiError::authentication("Session user no longer exists"))?;

    let stored_hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::validation("Current password is incorrect"))?;
    if !crypto::verify_password(&payload.current_password, stored_hash)? {
        return Err(ApiError::validation("Current password is incorrect"));
    }

    let password_hash = crypto::hash_password(&payload.new_password)?;
    state
        .user_repository
        .update_password(ctx.user_id, &password_hash)
        .await?;

    tracing::info!(user_id = ctx.user_id, "password changed");
    Ok(Json(serde_json::json!({"password_changed": true})))
}
