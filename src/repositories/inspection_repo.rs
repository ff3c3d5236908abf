use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use crate::{
    database::DatabasePool,
    error::ApiError,
    models::{
        DailyCount, DashboardData, DashboardTotals, FacilityCount, Inspection, InspectionFilters,
        InspectionListRow, InspectionStatus, InspectionUpdate, InspectorBreakdown, ReportSummary,
        StatusCounts, StatusSlice,
    },
};

const DEFAULT_PAGE_SIZE: i64 = 25;
const MAX_PAGE_SIZE: i64 = 200;

/// Fields the list endpoint may order by; anything else falls back to date.
const SORTABLE_COLUMNS: &[(&str, &str)] = &[
    ("code", "i.code"),
    ("container_number", "i.container_number"),
    ("status", "i.status"),
    ("inspected_at", "i.inspected_at"),
    ("facility_name", "f.name"),
];

pub struct NewInspection<'a> {
    pub code: &'a str,
    pub container_number: &'a str,
    pub facility_id: i64,
    pub carrier_id: i64,
    pub inspector_id: i64,
    pub temperature_c: Option<f64>,
    pub observations: Option<&'a str>,
    /// Stored at second precision; the report manifest hashes seconds.
    pub inspected_at: DateTime<Utc>,
}

#[async_trait]
pub trait InspectionRepository {
    async fn create(&self, inspection: &NewInspection<'_>) -> Result<Inspection, ApiError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Inspection>, ApiError>;
    /// Filtered list; `visible_to_inspector` restricts rows to that inspector.
    async fn list(
        &self,
        filters: &InspectionFilters,
        visible_to_inspector: Option<i64>,
    ) -> Result<(Vec<InspectionListRow>, i64), ApiError>;
    async fn update(&self, id: i64, update: &InspectionUpdate) -> Result<Inspection, ApiError>;
    async fn set_status(
        &self,
        id: i64,
        status: InspectionStatus,
        observations: Option<&str>,
    ) -> Result<Inspection, ApiError>;
    async fn set_signature_path(&self, id: i64, path: &str) -> Result<(), ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
    /// Counts per workflow status; `visible_to_inspector` restricts the
    /// figures to that inspector's own rows.
    async fn status_counts(
        &self,
        visible_to_inspector: Option<i64>,
    ) -> Result<StatusCounts, ApiError>;
    async fn summary(
        &self,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
        visible_to_inspector: Option<i64>,
    ) -> Result<ReportSummary, ApiError>;
    /// Date-windowed dashboard aggregates with the same inspector scoping.
    async fn dashboard(
        &self,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
        visible_to_inspector: Option<i64>,
    ) -> Result<DashboardData, ApiError>;
}

pub struct SqlxInspectionRepository {
    pool: DatabasePool,
}

impl SqlxInspectionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn push_filters<'a>(
        builder: &mut QueryBuilder<'a, Postgres>,
        filters: &'a InspectionFilters,
        visible_to_inspector: Option<i64>,
    ) {
        if let Some(q) = filters.q.as_deref().filter(|q| !q.trim().is_empty()) {
            let pattern = format!("%{}%", q.trim());
            builder
                .push(" AND (i.code ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR i.container_number ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(facility_id) = filters.facility_id {
            builder.push(" AND i.facility_id = ").push_bind(facility_id);
        }
        if let Some(carrier_id) = filters.carrier_id {
            builder.push(" AND i.carrier_id = ").push_bind(carrier_id);
        }
        if let Some(status) = filters.status {
            builder.push(" AND i.status = ").push_bind(status);
        }
        if let Some(date_from) = filters.date_from {
            builder.push(" AND i.inspected_at >= ").push_bind(date_from);
        }
        if let Some(date_to) = filters.date_to {
            builder.push(" AND i.inspected_at <= ").push_bind(date_to);
        }
        let inspector_id = visible_to_inspector.or(filters.inspector_id);
        if let Some(inspector_id) = inspector_id {
            builder.push(" AND i.inspector_id = ").push_bind(inspector_id);
        }
    }
}

fn order_clause(filters: &InspectionFilters) -> String {
    let column = filters
        .order_by
        .as_deref()
        .and_then(|name| {
            SORTABLE_COLUMNS
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, col)| *col)
        })
        .unwrap_or("i.inspected_at");
    let direction = match filters.order_dir.as_deref() {
        Some("asc") => "ASC",
        _ => "DESC",
    };
    format!(" ORDER BY {column} {direction}, i.id DESC")
}

fn page_bounds(filters: &InspectionFilters) -> (i64, i64) {
    let page = filters.page.unwrap_or(1).max(1);
    let page_size = filters
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    (page, page_size)
}

#[async_trait]
impl InspectionRepository for SqlxInspectionRepository {
    async fn create(&self, inspection: &NewInspection<'_>) -> Result<Inspection, ApiError> {
        if inspection.container_number.trim().is_empty() {
            return Err(ApiError::Validation(
                "Container number cannot be empty".to_string(),
            ));
        }

        let result = sqlx::query_as::<_, Inspection>(
            r#"
            INSERT INTO inspections
                (code, container_number, facility_id, carrier_id, inspector_id,
                 temperature_c, observations, inspected_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, date_trunc('second', $8::timestamptz))
            RETURNING id, code, container_number, facility_id, carrier_id, inspector_id,
                      temperature_c, observations, signature_path, status,
                      inspected_at, created_at, updated_at
            "#,
        )
        .bind(inspection.code)
        .bind(inspection.container_number.trim())
        .bind(inspection.facility_id)
        .bind(inspection.carrier_id)
        .bind(inspection.inspector_id)
        .bind(inspection.temperature_c)
        .bind(inspection.observations)
        .bind(inspection.inspected_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                ApiError::Validation("Unknown facility, carrier or inspector".to_string())
            }
            _ => ApiError::Database(err),
        })?;

        Ok(result)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Inspection>, ApiError> {
        let result = sqlx::query_as::<_, Inspection>(
            r#"
            SELECT id, code, container_number, facility_id, carrier_id, inspector_id,
                   temperature_c, observations, signature_path, status,
                   inspected_at, created_at, updated_at
            FROM inspections
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn list(
        &self,
        filters: &InspectionFilters,
        visible_to_inspector: Option<i64>,
    ) -> Result<(Vec<InspectionListRow>, i64), ApiError> {
        let (page, page_size) = page_bounds(filters);

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM inspections i WHERE TRUE");
        Self::push_filters(&mut count_builder, filters, visible_to_inspector);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT i.id, i.code, i.container_number,
                   f.name AS facility_name, c.name AS carrier_name, u.name AS inspector_name,
                   i.status, i.inspected_at,
                   (SELECT COUNT(*) FROM inspection_photos p WHERE p.inspection_id = i.id) AS photo_count
            FROM inspections i
            JOIN facilities f ON f.id = i.facility_id
            JOIN carriers c ON c.id = i.carrier_id
            JOIN users u ON u.id = i.inspector_id
            WHERE TRUE
            "#,
        );
        Self::push_filters(&mut builder, filters, visible_to_inspector);
        builder.push(order_clause(filters));
        builder.push(" LIMIT ").push_bind(page_size);
        builder.push(" OFFSET ").push_bind((page - 1) * page_size);

        let rows = builder
            .build_query_as::<InspectionListRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn update(&self, id: i64, update: &InspectionUpdate) -> Result<Inspection, ApiError> {
        if let Some(container) = update.container_number.as_deref() {
            if container.trim().is_empty() {
                return Err(ApiError::Validation(
                    "Container number cannot be empty".to_string(),
                ));
            }
        }

        let result = sqlx::query_as::<_, Inspection>(
            r#"
            UPDATE inspections SET
                container_number = COALESCE($2, container_number),
                facility_id = COALESCE($3, facility_id),
                carrier_id = COALESCE($4, carrier_id),
                temperature_c = COALESCE($5, temperature_c),
                observations = COALESCE($6, observations),
                inspected_at = COALESCE(date_trunc('second', $7::timestamptz), inspected_at),
                updated_at = now()
            WHERE id = $1
            RETURNING id, code, container_number, facility_id, carrier_id, inspector_id,
                      temperature_c, observations, signature_path, status,
                      inspected_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.container_number.as_deref().map(str::trim))
        .bind(update.facility_id)
        .bind(update.carrier_id)
        .bind(update.temperature_c)
        .bind(&update.observations)
        .bind(update.inspected_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Inspection {id} not found")))?;

        Ok(result)
    }

    async fn set_status(
        &self,
        id: i64,
        status: InspectionStatus,
        observations: Option<&str>,
    ) -> Result<Inspection, ApiError> {
        let result = sqlx::query_as::<_, Inspection>(
            r#"
            UPDATE inspections SET
                status = $2,
                observations = COALESCE($3, observations),
                updated_at = now()
            WHERE id = $1
            RETURNING id, code, container_number, facility_id, carrier_id, inspector_id,
                      temperature_c, observations, signature_path, status,
                      inspected_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(observations)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Inspection {id} not found")))?;

        Ok(result)
    }

    async fn set_signature_path(&self, id: i64, path: &str) -> Result<(), ApiError> {
        let result =
            sqlx::query("UPDATE inspections SET signature_path = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(path)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Inspection {id} not found")));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM inspections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Inspection {id} not found")));
        }

        Ok(())
    }

    async fn status_counts(
        &self,
        visible_to_inspector: Option<i64>,
    ) -> Result<StatusCounts, ApiError> {
        let rows: Vec<(InspectionStatus, i64)> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*)
            FROM inspections
            WHERE ($1::bigint IS NULL OR inspector_id = $1)
            GROUP BY status
            "#,
        )
        .bind(visible_to_inspector)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = StatusCounts {
            pending: 0,
            approved: 0,
            rejected: 0,
        };
        for (status, count) in rows {
            match status {
                InspectionStatus::Pending => counts.pending = count,
                InspectionStatus::Approved => counts.approved = count,
                InspectionStatus::Rejected => counts.rejected = count,
            }
        }

        Ok(counts)
    }

    async fn summary(
        &self,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
        visible_to_inspector: Option<i64>,
    ) -> Result<ReportSummary, ApiError> {
        let rows: Vec<(InspectionStatus, i64)> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*)
            FROM inspections
            WHERE ($1::timestamptz IS NULL OR inspected_at >= $1)
              AND ($2::timestamptz IS NULL OR inspected_at <= $2)
              AND ($3::bigint IS NULL OR inspector_id = $3)
            GROUP BY status
            "#,
        )
        .bind(date_from)
        .bind(date_to)
        .bind(visible_to_inspector)
        .fetch_all(&self.pool)
        .await?;

        let mut summary = ReportSummary {
            total: 0,
            approved: 0,
            rejected: 0,
            pending: 0,
            approval_rate: 0.0,
        };
        for (status, count) in rows {
            summary.total += count;
            match status {
                InspectionStatus::Pending => summary.pending = count,
                InspectionStatus::Approved => summary.approved = count,
                InspectionStatus::Rejected => summary.rejected = count,
            }
        }
        let decided = summary.approved + summary.rejected;
        if decided > 0 {
            summary.approval_rate = summary.approved as f64 / decided as f64;
        }

        Ok(summary)
    }

    async fn dashboard(
        &self,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
        visible_to_inspector: Option<i64>,
    ) -> Result<DashboardData, ApiError> {
        let status_rows: Vec<(InspectionStatus, i64)> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*)
            FROM inspections
            WHERE inspected_at >= $1 AND inspected_at <= $2
              AND ($3::bigint IS NULL OR inspector_id = $3)
            GROUP BY status
            "#,
        )
        .bind(date_from)
        .bind(date_to)
        .bind(visible_to_inspector)
        .fetch_all(&self.pool)
        .await?;

        let (mut pending, mut approved, mut rejected) = (0, 0, 0);
        for (status, count) in &status_rows {
            match status {
                InspectionStatus::Pending => pending = *count,
                InspectionStatus::Approved => approved = *count,
                InspectionStatus::Rejected => rejected = *count,
            }
        }
        let inspections = pending + approved + rejected;

        let (users, facilities, carriers): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT (SELECT COUNT(*) FROM users),
                   (SELECT COUNT(*) FROM facilities),
                   (SELECT COUNT(*) FROM carriers)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let by_status = [
            (InspectionStatus::Pending, pending),
            (InspectionStatus::Approved, approved),
            (InspectionStatus::Rejected, rejected),
        ]
        .into_iter()
        .map(|(status, count)| StatusSlice {
            status,
            count,
            percentage: if inspections > 0 {
                (count as f64 / inspections as f64 * 10_000.0).round() / 100.0
            } else {
                0.0
            },
        })
        .collect();

        let by_day = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT inspected_at::date AS date, COUNT(*) AS count
            FROM inspections
            WHERE inspected_at >= $1 AND inspected_at <= $2
              AND ($3::bigint IS NULL OR inspector_id = $3)
            GROUP BY inspected_at::date
            ORDER BY date
            "#,
        )
        .bind(date_from)
        .bind(date_to)
        .bind(visible_to_inspector)
        .fetch_all(&self.pool)
        .await?;

        let by_facility = sqlx::query_as::<_, FacilityCount>(
            r#"
            SELECT f.name AS facility, COUNT(*) AS count
            FROM inspections i
            JOIN facilities f ON f.id = i.facility_id
            WHERE i.inspected_at >= $1 AND i.inspected_at <= $2
              AND ($3::bigint IS NULL OR i.inspector_id = $3)
            GROUP BY f.name
            ORDER BY count DESC, f.name
            LIMIT 10
            "#,
        )
        .bind(date_from)
        .bind(date_to)
        .bind(visible_to_inspector)
        .fetch_all(&self.pool)
        .await?;

        let by_inspector = sqlx::query_as::<_, InspectorBreakdown>(
            r#"
            SELECT u.name AS inspector,
                   COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE i.status = 'pending') AS pending,
                   COUNT(*) FILTER (WHERE i.status = 'approved') AS approved,
                   COUNT(*) FILTER (WHERE i.status = 'rejected') AS rejected
            FROM inspections i
            JOIN users u ON u.id = i.inspector_id
            WHERE i.inspected_at >= $1 AND i.inspected_at <= $2
              AND ($3::bigint IS NULL OR i.inspector_id = $3)
            GROUP BY u.name
            ORDER BY total DESC, u.name
            "#,
        )
        .bind(date_from)
        .bind(date_to)
        .bind(visible_to_inspector)
        .fetch_all(&self.pool)
        .await?;

        Ok(DashboardData {
            date_from,
            date_to,
            totals: DashboardTotals {
                inspections,
                pending,
                approved,
                rejected,
                users,
                facilities,
                carriers,
            },
            by_status,
            by_day,
            by_facility,
            by_inspector,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_clause_allows_known_columns_only() {
        let mut filters = InspectionFilters::default();
        filters.order_by = Some("code".to_string());
        filters.order_dir = Some("asc".to_string());
        assert_eq!(order_clause(&filters), " ORDER BY i.code ASC, i.id DESC");

        filters.order_by = Some("1; DROP TABLE inspections".to_string());
        assert_eq!(
            order_clause(&filters),
            " ORDER BY i.inspected_at ASC, i.id DESC"
        );
    }

    #[test]
    fn test_order_clause_defaults_to_newest_first() {
        let filters = InspectionFilters::default();
        assert_eq!(
            order_clause(&filters),
            " ORDER BY i.inspected_at DESC, i.id DESC"
        );
    }

    #[test]
    fn test_page_bounds_clamped() {
        let mut filters = InspectionFilters::default();
        assert_eq!(page_bounds(&filters), (1, DEFAULT_PAGE_SIZE));

        filters.page = Some(-5);
        filters.page_size = Some(10_000);
        assert_eq!(page_bounds(&filters), (1, MAX_PAGE_SIZE));

        filters.page = Some(3);
        filters.page_size = Some(50);
        assert_eq!(page_bounds(&filters), (3, 50));
    }
}
