use std::sync::Arc;

use crate::{
    error::ApiError,
    models::{User, UserStatus},
    repositories::UserRepository,
    utils::crypto,
};

/// Credential verification against the user store.
pub struct AuthService {
    users: Arc<dyn UserRepository + Send + Sync>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { users }
    }

    /// Check email/password and return the user on success. The same error
    /// is returned for unknown users and wrong passwords.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let invalid = || ApiError::authentication("Invalid email or password");

        let user = self.users.get_by_email(email).await?.ok_or_else(invalid)?;
        if user.status != UserStatus::Active {
            return Err(ApiError::authentication("Account is disabled"));
        }
        let stored_hash = user.password_hash.as_deref().ok_or_else(invalid)?;
        if !crypto::verify_password(password, stored_hash)? {
            return Err(invalid());
        }

        self.users.touch_last_access(user.id).await?;
        tracing::info!(user_id = user.id, "user authenticated");
        Ok(user)
    }
}
