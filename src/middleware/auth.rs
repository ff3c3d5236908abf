use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::PrivateCookieJar;

use crate::auth::{UserContext, UserSession};
use crate::repositories::UserRepository;
use crate::AppState;

pub const SESSION_COOKIE: &str = "session";

/// Session authentication middleware for the protected routes.
///
/// Decrypts the session cookie, rejects expired sessions, and inserts a
/// `UserContext` into request extensions for handlers to read.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        tracing::debug!("request without session cookie rejected");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let Ok(session) = serde_json::from_str::<UserSession>(cookie.value()) else {
        tracing::warn!("undecodable session payload rejected");
        return Err(StatusCode::UNAUTHORIZED);
    };

    if session.is_expired() {
        tracing::debug!(user_id = session.user_id, "expired session rejected");
        return Err(StatusCode::UNAUTHORIZED);
    }

    // The role is re-read from the database so a role change or deactivation
    // takes effect before the cookie expires.
    let user = state
        .user_repository
        .get_by_id(session.user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let Some(user) = user.filter(|u| u.status == crate::models::UserStatus::Active) else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(UserContext {
        user_id: user.id,
        email: user.email,
        role: user.role,
    });

    Ok(next.run(request).await)
}
