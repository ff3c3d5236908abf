use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Shipping line the container travels with
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Carrier {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CarrierCreate {
    pub code: String,
    pub name: String,
}
