use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use std::path::Path;
use tower::ServiceExt;

use inspection_backend::config::Settings;
use inspection_backend::models::UserRole;
use inspection_backend::repositories::UserRepository;
use inspection_backend::utils::crypto;
use inspection_backend::{build_router, database, AppState};

/// Settings pointing at the test database and a scratch storage directory.
pub fn test_settings(database_url: &str, storage_root: &Path) -> Settings {
    Settings {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: database_url.to_string(),
        database_max_connections: 5,
        cors_allow_origins: vec!["http://localhost:5173".to_string()],
        auth_secret: "0123456789abcdef".repeat(4),
        session_ttl_minutes: 60,
        login_rate_limit_per_minute: 1000,
        log_level: "warn".to_string(),
        log_format: "plain".to_string(),
        storage_root: storage_root.to_path_buf(),
        max_upload_bytes: 5 * 1024 * 1024,
        public_base_url: "http://localhost:8000".to_string(),
        notifications_file: storage_root.join("notifications.json"),
    }
}

/// Build app state against DATABASE_URL, or None so the caller can skip.
/// Schema is migrated and data tables truncated for isolation.
pub async fn try_create_state(storage_root: &Path) -> Option<AppState> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("skipping: DATABASE_URL not set");
        return None;
    };

    let settings = test_settings(&database_url, storage_root);
    let pool = database::create_pool(&settings.database_url, settings.database_max_connections)
        .await
        .expect("test database must be reachable");
    database::run_migrations(&pool).await.expect("migrations");

    sqlx::query("TRUNCATE TABLE reports, inspection_photos, inspections, carriers, facilities, user_preferences, users RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .expect("truncate");

    Some(AppState::new(settings, pool))
}

pub fn create_test_router(state: AppState) -> Router {
    build_router(state)
}

/// Create a user directly through the repository and return its id.
pub async fn seed_user(state: &AppState, email: &str, password: &str, role: UserRole) -> i64 {
    let hash = crypto::hash_password(password).unwrap();
    let user = state
        .user_repository
        .create("Test User", email, &hash, role)
        .await
        .unwrap();
    user.id
}

/// Log in through the HTTP surface and return the session cookie value.
pub async fn login_cookie(app: &Router, email: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(format!(
            "{{\"email\":\"{email}\",\"password\":\"{password}\"}}"
        )))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "login must succeed");

    response
        .headers()
        .get("set-cookie")
        .expect("login sets session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

pub async fn extract_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}
