pub mod carrier;
pub mod facility;
pub mod inspection;
pub mod notification;
pub mod photo;
pub mod preference;
pub mod report;
pub mod stats;
pub mod user;

pub use carrier::{Carrier, CarrierCreate};
pub use facility::{Facility, FacilityCreate};
pub use inspection::{
    Inspection, InspectionCreate, InspectionDetailResponse, InspectionFilters, InspectionListResponse,
    InspectionListRow, InspectionStatus, InspectionUpdate, StatusChange,
};
pub use notification::{Notification, Recipient};
pub use photo::{Photo, PhotoCreate};
pub use preference::{PreferencesUpdate, UserPreferences};
pub use report::{
    Report, ReportCreate, ReportSummary, StatusCounts, VerificationResponse, VerificationStatus,
};
pub use stats::{
    DailyCount, DashboardData, DashboardTotals, FacilityCount, InspectorBreakdown, StatusSlice,
};
pub use user::{User, UserCreate, UserResponse, UserRole, UserStatus};
