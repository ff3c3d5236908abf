pub mod carrier_repo;
pub mod facility_repo;
pub mod inspection_repo;
pub mod photo_repo;
pub mod preference_repo;
pub mod report_repo;
pub mod user_repo;

pub use carrier_repo::{CarrierRepository, SqlxCarrierRepository};
pub use facility_repo::{FacilityRepository, SqlxFacilityRepository};
pub use inspection_repo::{InspectionRepository, NewInspection, SqlxInspectionRepository};
pub use photo_repo::{PhotoRepository, SqlxPhotoRepository};
pub use preference_repo::{PreferenceRepository, SqlxPreferenceRepository};
pub use report_repo::{ReportRepository, SqlxReportRepository};
pub use user_repo::{SqlxUserRepository, UserRepository};
