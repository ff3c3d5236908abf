use serde::Serialize;

use crate::models::UserRole;

/// Authenticated caller identity, inserted into request extensions by the
/// auth middleware and read by handlers.
#[derive(Debug, Clone, Serialize)]
pub struct UserContext {
    pub user_id: i64,
    pub email: String,
    pub role: UserRole,
}

impl UserContext {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Supervisors and admins review inspections created by others.
    pub fn is_reviewer(&self) -> bool {
        matches!(self.role, UserRole::Supervisor | UserRole::Admin)
    }
}
