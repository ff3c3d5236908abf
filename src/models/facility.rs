use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Packing plant where containers are inspected
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Facility {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacilityCreate {
    pub code: String,
    pub name: String,
    pub location: Option<String>,
}
