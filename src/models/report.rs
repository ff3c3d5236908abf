use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Persisted record of a rendered inspection report.
///
/// `hash_global` is the order-independent SHA-256 digest over the inspection
/// and its evidence at generation time; the row is written only after the PDF
/// exists on disk.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub report_uuid: Uuid,
    pub inspection_id: i64,
    pub file_path: String,
    pub hash_global: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReportCreate {
    pub report_uuid: Uuid,
    pub inspection_id: i64,
    pub file_path: String,
    pub hash_global: String,
}

/// Outcome of the public verification endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Valid,
    Altered,
    NotFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationResponse {
    pub status: VerificationStatus,
    pub inspection_id: i64,
    pub claimed_hash: String,
    pub recomputed_hash: Option<String>,
}

/// Inspections per workflow status
#[derive(Debug, Clone, Serialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total: i64,
    pub approved: i64,
    pub rejected: i64,
    pub pending: i64,
    pub approval_rate: f64,
}
