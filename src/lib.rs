pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{delete, get, patch, post, put},
    Router,
};
use axum_extra::extract::cookie::Key;
use std::sync::Arc;

use crate::config::Settings;
use crate::database::DatabasePool;
use crate::middleware::IpRateLimiter;
use crate::repositories::{
    CarrierRepository, FacilityRepository, InspectionRepository, PhotoRepository,
    PreferenceRepository, ReportRepository, SqlxCarrierRepository, SqlxFacilityRepository,
    SqlxInspectionRepository, SqlxPhotoRepository, SqlxPreferenceRepository,
    SqlxReportRepository, SqlxUserRepository, UserRepository,
};
use crate::services::{AuthService, InspectionService, NotificationService, ReportService};

/// Shared application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db_pool: DatabasePool,
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub facility_repository: Arc<dyn FacilityRepository + Send + Sync>,
    pub carrier_repository: Arc<dyn CarrierRepository + Send + Sync>,
    pub inspection_repository: Arc<dyn InspectionRepository + Send + Sync>,
    pub photo_repository: Arc<dyn PhotoRepository + Send + Sync>,
    pub preference_repository: Arc<dyn PreferenceRepository + Send + Sync>,
    pub report_repository: Arc<dyn ReportRepository + Send + Sync>,
    pub auth_service: Arc<AuthService>,
    pub inspection_service: Arc<InspectionService>,
    pub report_service: Arc<ReportService>,
    pub notification_service: Arc<NotificationService>,
    pub login_limiter: Arc<IpRateLimiter>,
    pub key: Key,
}

// Needed for the PrivateCookieJar extractor
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

impl AppState {
    pub fn new(settings: Settings, db_pool: DatabasePool) -> Self {
        let config = Arc::new(settings);
        let key = Key::from(config.auth_secret.as_bytes());

        let user_repository: Arc<dyn UserRepository + Send + Sync> =
            Arc::new(SqlxUserRepository::new(db_pool.clone()));
        let facility_repository: Arc<dyn FacilityRepository + Send + Sync> =
            Arc::new(SqlxFacilityRepository::new(db_pool.clone()));
        let carrier_repository: Arc<dyn CarrierRepository + Send + Sync> =
            Arc::new(SqlxCarrierRepository::new(db_pool.clone()));
        let inspection_repository: Arc<dyn InspectionRepository + Send + Sync> =
            Arc::new(SqlxInspectionRepository::new(db_pool.clone()));
        let photo_repository: Arc<dyn PhotoRepository + Send + Sync> =
            Arc::new(SqlxPhotoRepository::new(db_pool.clone()));
        let preference_repository: Arc<dyn PreferenceRepository + Send + Sync> =
            Arc::new(SqlxPreferenceRepository::new(db_pool.clone()));
        let report_repository: Arc<dyn ReportRepository + Send + Sync> =
            Arc::new(SqlxReportRepository::new(db_pool.clone()));

        let notification_service =
            Arc::new(NotificationService::new(config.notifications_file.clone()));
        let auth_service = Arc::new(AuthService::new(user_repository.clone()));
        let inspection_service = Arc::new(InspectionService::new(
            config.clone(),
            inspection_repository.clone(),
            photo_repository.clone(),
            report_repository.clone(),
            notification_service.clone(),
        ));
        let report_service = Arc::new(ReportService::new(
            config.clone(),
            inspection_repository.clone(),
            photo_repository.clone(),
            report_repository.clone(),
            facility_repository.clone(),
            carrier_repository.clone(),
            user_repository.clone(),
        ));

        let login_limiter = Arc::new(IpRateLimiter::new(config.login_rate_limit_per_minute));

        Self {
            config,
            db_pool,
            user_repository,
            facility_repository,
            carrier_repository,
            inspection_repository,
            photo_repository,
            preference_repository,
            report_repository,
            auth_service,
            inspection_service,
            report_service,
            notification_service,
            login_limiter,
            key,
        }
    }
}

/// Assemble the application router: public routes, session-protected routes,
/// and the cross-cutting middleware stack.
pub fn build_router(state: AppState) -> Router {
    let login_route = Router::new()
        .route("/api/auth/login", post(handlers::auth_handlers::login))
        .route_layer(axum::middleware::from_fn_with_state(
            state.login_limiter.clone(),
            middleware::ip_rate_limit_middleware,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(handlers::health_handlers::health_check))
        .route("/api/auth/logout", post(handlers::auth_handlers::logout))
        .route(
            "/api/verify/:inspection_id/:claimed_hash",
            get(handlers::report_handlers::verify_report),
        )
        .merge(login_route);

    let protected_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth_handlers::me))
        .route(
            "/api/auth/change-password",
            post(handlers::auth_handlers::change_password),
        )
        .route(
            "/api/users",
            get(handlers::user_handlers::list_users).post(handlers::user_handlers::create_user),
        )
        .route(
            "/api/users/:id/preferences",
            get(handlers::preference_handlers::get_preferences)
                .put(handlers::preference_handlers::update_preferences),
        )
        .route(
            "/api/facilities",
            get(handlers::facility_handlers::list_facilities)
                .post(handlers::facility_handlers::create_facility),
        )
        .route(
            "/api/carriers",
            get(handlers::carrier_handlers::list_carriers)
                .post(handlers::carrier_handlers::create_carrier),
        )
        .route(
            "/api/inspections",
            get(handlers::inspection_handlers::list_inspections)
                .post(handlers::inspection_handlers::create_inspection),
        )
        .route(
            "/api/inspections/:id",
            get(handlers::inspection_handlers::get_inspection),
        )
        .route(
            "/api/inspections/:id",
            put(handlers::inspection_handlers::update_inspection),
        )
        .route(
            "/api/inspections/:id",
            delete(handlers::inspection_handlers::delete_inspection),
        )
        .route(
            "/api/inspections/:id/status",
            patch(handlers::inspection_handlers::change_status),
        )
        .route(
            "/api/inspections/:id/photos",
            post(handlers::inspection_handlers::upload_photos),
        )
        .route(
            "/api/inspections/:id/photos/:photo_id",
            delete(handlers::inspection_handlers::delete_photo),
        )
        .route(
            "/api/inspections/:id/signature",
            post(handlers::inspection_handlers::upload_signature),
        )
        .route(
            "/api/inspections/:id/report",
            post(handlers::report_handlers::generate_report),
        )
        .route(
            "/api/inspections/:id/reports",
            get(handlers::report_handlers::list_reports),
        )
        .route(
            "/api/reports/:id/download",
            get(handlers::report_handlers::download_report),
        )
        .route(
            "/api/reports/by-reference/:report_uuid/download",
            get(handlers::report_handlers::download_report_by_reference),
        )
        .route(
            "/api/reports/:id/custody",
            get(handlers::report_handlers::custody_report),
        )
        .route(
            "/api/reports/status-counts",
            get(handlers::report_handlers::status_counts),
        )
        .route(
            "/api/reports/summary",
            get(handlers::report_handlers::summary),
        )
        .route(
            "/api/stats/dashboard",
            get(handlers::stats_handlers::dashboard),
        )
        .route(
            "/api/notifications",
            get(handlers::notification_handlers::list_notifications),
        )
        .route(
            "/api/notifications/:id/read",
            post(handlers::notification_handlers::mark_notification_read),
        )
        .route(
            "/api/static/captures/*file",
            get(handlers::static_handlers::serve_capture),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(
            middleware::request_logging_middleware,
        ))
        .layer(middleware::create_logging_layer())
        .layer(middleware::create_cors_layer(
            state.config.cors_allow_origins.clone(),
        ))
        .with_state(state)
}
