use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Photographic evidence attached to an inspection.
///
/// Rows are immutable after insert; the content hash is computed once at
/// upload time and participates in the report digest.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub inspection_id: i64,
    pub file_path: String,
    pub mime_type: String,
    pub content_hash: Option<String>,
    pub seq: i32,
    pub taken_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PhotoCreate {
    pub inspection_id: i64,
    pub file_path: String,
    pub mime_type: String,
    pub content_hash: Option<String>,
    pub seq: i32,
    pub taken_at: Option<DateTime<Utc>>,
}
