use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Client preferences for one user. A row exists only after the user first
/// reads or writes their preferences; reads materialize the defaults.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserPreferences {
    pub user_id: i64,
    pub auto_sync: bool,
    pub notifications: bool,
    pub geolocation: bool,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub auto_sync: Option<bool>,
    pub notifications: Option<bool>,
    pub geolocation: Option<bool>,
}
