pub mod auth_handlers;
pub mod carrier_handlers;
pub mod facility_handlers;
pub mod health_handlers;
pub mod inspection_handlers;
pub mod notification_handlers;
pub mod preference_handlers;
pub mod report_handlers;
pub mod static_handlers;
pub mod stats_handlers;
pub mod user_handlers;
