use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::Photo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "inspection_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InspectionStatus {
    Pending,
    Approved,
    Rejected,
}

impl InspectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Inspection {
    pub id: i64,
    pub code: String,
    pub container_number: String,
    pub facility_id: i64,
    pub carrier_id: i64,
    pub inspector_id: i64,
    pub temperature_c: Option<f64>,
    pub observations: Option<String>,
    pub signature_path: Option<String>,
    pub status: InspectionStatus,
    pub inspected_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InspectionCreate {
    pub container_number: String,
    pub facility_id: i64,
    pub carrier_id: i64,
    /// Ignored for inspector callers, who always create as themselves
    pub inspector_id: Option<i64>,
    pub temperature_c: Option<f64>,
    pub observations: Option<String>,
    pub inspected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InspectionUpdate {
    pub container_number: Option<String>,
    pub facility_id: Option<i64>,
    pub carrier_id: Option<i64>,
    pub temperature_c: Option<f64>,
    pub observations: Option<String>,
    pub inspected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub status: InspectionStatus,
    pub comment: Option<String>,
}

/// Query-string filters for the inspection list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InspectionFilters {
    /// Substring match against code or container number
    pub q: Option<String>,
    pub facility_id: Option<i64>,
    pub carrier_id: Option<i64>,
    pub status: Option<InspectionStatus>,
    pub inspector_id: Option<i64>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// List row with the joined display names the UI needs
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InspectionListRow {
    pub id: i64,
    pub code: String,
    pub container_number: String,
    pub facility_name: String,
    pub carrier_name: String,
    pub inspector_name: String,
    pub status: InspectionStatus,
    pub inspected_at: DateTime<Utc>,
    pub photo_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectionListResponse {
    pub items: Vec<InspectionListRow>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectionDetailResponse {
    #[serde(flatten)]
    pub inspection: Inspection,
    pub photos: Vec<Photo>,
}
