use async_trait::async_trait;

use crate::{
    database::DatabasePool,
    error::ApiError,
    models::{PreferencesUpdate, UserPreferences},
};

#[async_trait]
pub trait PreferenceRepository {
    /// Fetch the row for a user, creating the defaults on first access.
    async fn get_or_create(&self, user_id: i64) -> Result<UserPreferences, ApiError>;
    /// Upsert with partial fields; missing row is created from the defaults.
    async fn update(
        &self,
        user_id: i64,
        update: &PreferencesUpdate,
    ) -> Result<UserPreferences, ApiError>;
}

pub struct SqlxPreferenceRepository {
    pool: DatabasePool,
}

impl SqlxPreferenceRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn map_missing_user(err: sqlx::Error, user_id: i64) -> ApiError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            ApiError::NotFound(format!("User {user_id} not found"))
        }
        _ => ApiError::Database(err),
    }
}

#[async_trait]
impl PreferenceRepository for SqlxPreferenceRepository {
    async fn get_or_create(&self, user_id: i64) -> Result<UserPreferences, ApiError> {
        sqlx::query("INSERT INTO user_preferences (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|err| map_missing_user(err, user_id))?;

        let result = sqlx::query_as::<_, UserPreferences>(
            r#"
            SELECT user_id, auto_sync, notifications, geolocation, updated_at
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn update(
        &self,
        user_id: i64,
        update: &PreferencesUpdate,
    ) -> Result<UserPreferences, ApiError> {
        let result = sqlx::query_as::<_, UserPreferences>(
            r#"
            INSERT INTO user_preferences (user_id, auto_sync, notifications, geolocation)
            VALUES ($1, COALESCE($2, TRUE), COALESCE($3, TRUE), COALESCE($4, FALSE))
            ON CONFLICT (user_id) DO UPDATE SET
                auto_sync = COALESCE($2, user_preferences.auto_sync),
                notifications = COALESCE($3, user_preferences.notifications),
                geolocation = COALESCE($4, user_preferences.geolocation),
                updated_at = now()
            RETURNING user_id, auto_sync, notifications, geolocation, updated_at
            "#,
        )
        .bind(user_id)
        .bind(update.auto_sync)
        .bind(update.notifications)
        .bind(update.geolocation)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_missing_user(err, user_id))?;

        Ok(result)
    }
}
