use async_trait::async_trait;

use crate::{
    database::DatabasePool,
    error::ApiError,
    models::{User, UserRole, UserStatus},
};

#[async_trait]
pub trait UserRepository {
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, ApiError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, ApiError>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn list(&self) -> Result<Vec<User>, ApiError>;
    async fn touch_last_access(&self, id: i64) -> Result<(), ApiError>;
    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), ApiError>;
}

pub struct SqlxUserRepository {
    pool: DatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ApiError::Validation("Email cannot be empty".to_string()));
    }
    if !email.contains('@') || email.len() > 191 {
        return Err(ApiError::Validation(format!("Invalid email: {email}")));
    }
    Ok(())
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("Name cannot be empty".to_string()));
        }
        validate_email(email)?;

        let existing = self.get_by_email(email).await?;
        if existing.is_some() {
            return Err(ApiError::Conflict(format!(
                "User with email {email} already exists"
            )));
        }

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, role, status, last_access, created_at, updated_at
            "#,
        )
        .bind(name.trim())
        .bind(email.trim().to_lowercase())
        .bind(password_hash)
        .bind(role)
        .bind(UserStatus::Active)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, ApiError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, status, last_access, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, status, last_access, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn list(&self) -> Result<Vec<User>, ApiError> {
        let results = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, status, last_access, created_at, updated_at
            FROM users
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }

    async fn touch_last_access(&self, id: i64) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET last_access = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), ApiError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("User {id} not found")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("inspector@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("no-at-sign").is_err());
    }
}
