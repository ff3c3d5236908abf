use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::InspectionStatus;

/// Headline figures for the dashboard window.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardTotals {
    pub inspections: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub users: i64,
    pub facilities: i64,
    pub carriers: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSlice {
    pub status: InspectionStatus,
    pub count: i64,
    /// Share of the windowed total, rounded to two decimals
    pub percentage: f64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FacilityCount {
    pub facility: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InspectorBreakdown {
    pub inspector: String,
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

/// Date-windowed dashboard aggregates. Inspector callers only see their own
/// inspections reflected here.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub totals: DashboardTotals,
    pub by_status: Vec<StatusSlice>,
    pub by_day: Vec<DailyCount>,
    pub by_facility: Vec<FacilityCount>,
    pub by_inspector: Vec<InspectorBreakdown>,
}
