use async_trait::async_trait;

use crate::{
    database::DatabasePool,
    error::ApiError,
    models::{Facility, FacilityCreate},
};

#[async_trait]
pub trait FacilityRepository {
    async fn create(&self, facility: &FacilityCreate) -> Result<Facility, ApiError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Facility>, ApiError>;
    async fn list(&self) -> Result<Vec<Facility>, ApiError>;
}

pub struct SqlxFacilityRepository {
    pool: DatabasePool,
}

impl SqlxFacilityRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn validate(&self, facility: &FacilityCreate) -> Result<(), ApiError> {
        if facility.code.trim().is_empty() {
            return Err(ApiError::Validation("Facility code cannot be empty".to_string()));
        }
        if facility.name.trim().is_empty() {
            return Err(ApiError::Validation("Facility name cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FacilityRepository for SqlxFacilityRepository {
    async fn create(&self, facility: &FacilityCreate) -> Result<Facility, ApiError> {
        self.validate(facility)?;

        let result = sqlx::query_as::<_, Facility>(
            r#"
            INSERT INTO facilities (code, name, location)
            VALUES ($1, $2, $3)
            RETURNING id, code, name, location, created_at, updated_at
            "#,
        )
        .bind(facility.code.trim())
        .bind(facility.name.trim())
        .bind(&facility.location)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Conflict(format!("Facility code {} already exists", facility.code))
            }
            _ => ApiError::Database(err),
        })?;

        Ok(result)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Facility>, ApiError> {
        let result = sqlx::query_as::<_, Facility>(
            r#"
            SELECT id, code, name, location, created_at, updated_at
            FROM facilities
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn list(&self) -> Result<Vec<Facility>, ApiError> {
        let results = sqlx::query_as::<_, Facility>(
            r#"
            SELECT id, code, name, location, created_at, updated_at
            FROM facilities
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }
}
