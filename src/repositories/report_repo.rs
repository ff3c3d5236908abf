use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    database::DatabasePool,
    error::ApiError,
    models::{Report, ReportCreate},
};

#[async_trait]
pub trait ReportRepository {
    async fn create(&self, report: &ReportCreate) -> Result<Report, ApiError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Report>, ApiError>;
    async fn get_by_uuid(&self, report_uuid: &Uuid) -> Result<Option<Report>, ApiError>;
    async fn list_by_inspection(&self, inspection_id: i64) -> Result<Vec<Report>, ApiError>;
}

pub struct SqlxReportRepository {
    pool: DatabasePool,
}

impl SqlxReportRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for SqlxReportRepository {
    async fn create(&self, report: &ReportCreate) -> Result<Report, ApiError> {
        if report.file_path.trim().is_empty() {
            return Err(ApiError::Validation("File path cannot be empty".to_string()));
        }

        let result = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (report_uuid, inspection_id, file_path, hash_global)
            VALUES ($1, $2, $3, $4)
            RETURNING id, report_uuid, inspection_id, file_path, hash_global, created_at
            "#,
        )
        .bind(report.report_uuid)
        .bind(report.inspection_id)
        .bind(&report.file_path)
        .bind(&report.hash_global)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Report>, ApiError> {
        let result = sqlx::query_as::<_, Report>(
            r#"
            SELECT id, report_uuid, inspection_id, file_path, hash_global, created_at
            FROM reports
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn get_by_uuid(&self, report_uuid: &Uuid) -> Result<Option<Report>, ApiError> {
        let result = sqlx::query_as::<_, Report>(
            r#"
            SELECT id, report_uuid, inspection_id, file_path, hash_global, created_at
            FROM reports
            WHERE report_uuid = $1
            "#,
        )
        .bind(report_uuid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn list_by_inspection(&self, inspection_id: i64) -> Result<Vec<Report>, ApiError> {
        let results = sqlx::query_as::<_, Report>(
            r#"
            SELECT id, report_uuid, inspection_id, file_path, hash_global, created_at
            FROM reports
            WHERE inspection_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(inspection_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }
}
