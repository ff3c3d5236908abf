use async_trait::async_trait;

use crate::{
    database::DatabasePool,
    error::ApiError,
    models::{Carrier, CarrierCreate},
};

#[async_trait]
pub trait CarrierRepository {
    async fn create(&self, carrier: &CarrierCreate) -> Result<Carrier, ApiError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Carrier>, ApiError>;
    async fn list(&self) -> Result<Vec<Carrier>, ApiError>;
}

pub struct SqlxCarrierRepository {
    pool: DatabasePool,
}

impl SqlxCarrierRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CarrierRepository for SqlxCarrierRepository {
    async fn create(&self, carrier: &CarrierCreate) -> Result<Carrier, ApiError> {
        if carrier.code.trim().is_empty() {
            return Err(ApiError::Validation("Carrier code cannot be empty".to_string()));
        }
        if carrier.name.trim().is_empty() {
            return Err(ApiError::Validation("Carrier name cannot be empty".to_string()));
        }

        let result = sqlx::query_as::<_, Carrier>(
            r#"
            INSERT INTO carriers (code, name)
            VALUES ($1, $2)
            RETURNING id, code, name, created_at, updated_at
            "#,
        )
        .bind(carrier.code.trim())
        .bind(carrier.name.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Conflict(format!("Carrier {} already exists", carrier.name))
            }
            _ => ApiError::Database(err),
        })?;

        Ok(result)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Carrier>, ApiError> {
        let result = sqlx::query_as::<_, Carrier>(
            r#"
            SELECT id, code, name, created_at, updated_at
            FROM carriers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn list(&self) -> Result<Vec<Carrier>, ApiError> {
        let results = sqlx::query_as::<_, Carrier>(
            r#"
            SELECT id, code, name, created_at, updated_at
            FROM carriers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }
}
