pub mod auth_service;
pub mod inspection_service;
pub mod notification_service;
pub mod pdf;
pub mod report_hash;
pub mod report_service;

pub use auth_service::AuthService;
pub use inspection_service::InspectionService;
pub use notification_service::NotificationService;
pub use report_service::ReportService;
