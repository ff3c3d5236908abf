use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{User, UserRole};

/// Payload stored in the encrypted session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: i64,
    pub email: String,
    pub role: UserRole,
    pub expires_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(user: &User, ttl_minutes: i64) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            expires_at: Utc::now() + Duration::minutes(ttl_minutes),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserStatus;

    fn sample_user() -> User {
        User {
            id: 7,
            name: "Ana Diaz".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: None,
            role: UserRole::Inspector,
            status: UserStatus::Active,
            last_access: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_session_not_expired() {
        let session = UserSession::new(&sample_user(), 60);
        assert!(!session.is_expired());
        assert_eq!(session.user_id, 7);
        assert_eq!(session.role, UserRole::Inspector);
    }

    #[test]
    fn test_expired_session_detected() {
        let mut session = UserSession::new(&sample_user(), 60);
        session.expires_at = Utc::now() - Duration::minutes(1);
        assert!(session.is_expired());
    }
}
