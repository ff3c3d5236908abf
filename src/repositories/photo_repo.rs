use async_trait::async_trait;

use crate::{
    database::DatabasePool,
    error::ApiError,
    models::{Photo, PhotoCreate},
};

#[async_trait]
pub trait PhotoRepository {
    async fn create(&self, photo: &PhotoCreate) -> Result<Photo, ApiError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Photo>, ApiError>;
    /// Photos of an inspection in capture order.
    async fn list_by_inspection(&self, inspection_id: i64) -> Result<Vec<Photo>, ApiError>;
    async fn next_seq(&self, inspection_id: i64) -> Result<i32, ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

pub struct SqlxPhotoRepository {
    pool: DatabasePool,
}

impl SqlxPhotoRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn validate(&self, photo: &PhotoCreate) -> Result<(), ApiError> {
        if photo.file_path.trim().is_empty() {
            return Err(ApiError::Validation("File path cannot be empty".to_string()));
        }
        if photo.file_path.contains("..") {
            return Err(ApiError::Validation(
                "Invalid file path - path traversal not allowed".to_string(),
            ));
        }
        if photo.mime_type.trim().is_empty() {
            return Err(ApiError::Validation("Content type cannot be empty".to_string()));
        }
        if let Some(hash) = photo.content_hash.as_deref() {
            if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ApiError::Validation(
                    "Content hash must be 64 hex characters".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PhotoRepository for SqlxPhotoRepository {
    async fn create(&self, photo: &PhotoCreate) -> Result<Photo, ApiError> {
        self.validate(photo)?;

        let result = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO inspection_photos
                (inspection_id, file_path, mime_type, content_hash, seq, taken_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, inspection_id, file_path, mime_type, content_hash, seq, taken_at, created_at
            "#,
        )
        .bind(photo.inspection_id)
        .bind(&photo.file_path)
        .bind(&photo.mime_type)
        .bind(&photo.content_hash)
        .bind(photo.seq)
        .bind(photo.taken_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Photo>, ApiError> {
        let result = sqlx::query_as::<_, Photo>(
            r#"
            SELECT id, inspection_id, file_path, mime_type, content_hash, seq, taken_at, created_at
            FROM inspection_photos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn list_by_inspection(&self, inspection_id: i64) -> Result<Vec<Photo>, ApiError> {
        let results = sqlx::query_as::<_, Photo>(
            r#"
            SELECT id, inspection_id, file_path, mime_type, content_hash, seq, taken_at, created_at
            FROM inspection_photos
            WHERE inspection_id = $1
            ORDER BY seq, id
            "#,
        )
        .bind(inspection_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }

    async fn next_seq(&self, inspection_id: i64) -> Result<i32, ApiError> {
        let max: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(seq) FROM inspection_photos WHERE inspection_id = $1",
        )
        .bind(inspection_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(max.unwrap_or(0) + 1)
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM inspection_photos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Photo {id} not found")));
        }

        Ok(())
    }
}
