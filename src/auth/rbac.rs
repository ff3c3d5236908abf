use crate::auth::UserContext;
use crate::error::ApiError;
use crate::models::UserRole;

/// Fail with 403 unless the caller holds one of the listed roles.
pub fn require_role(ctx: &UserContext, allowed: &[UserRole]) -> Result<(), ApiError> {
    if allowed.contains(&ctx.role) {
        Ok(())
    } else {
        Err(ApiError::authorization(format!(
            "Requires one of roles: {allowed:?}"
        )))
    }
}

/// Reviewer check used by the status workflow and destructive operations.
pub fn require_reviewer(ctx: &UserContext) -> Result<(), ApiError> {
    require_role(ctx, &[UserRole::Supervisor, UserRole::Admin])
}

pub fn require_admin(ctx: &UserContext) -> Result<(), ApiError> {
    require_role(ctx, &[UserRole::Admin])
}

/// Inspectors may only touch their own inspections; reviewers see everything.
pub fn can_access_inspection(ctx: &UserContext, inspector_id: i64) -> bool {
    ctx.is_reviewer() || ctx.user_id == inspector_id
}

/// Aggregate queries for inspector callers are restricted to their own rows.
pub fn inspector_scope(ctx: &UserContext) -> Option<i64> {
    (ctx.role == UserRole::Inspector).then_some(ctx.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: UserRole) -> UserContext {
        UserContext {
            user_id: 10,
            email: "user@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(&ctx(UserRole::Admin), &[UserRole::Admin]).is_ok());
        assert!(require_role(&ctx(UserRole::Inspector), &[UserRole::Admin]).is_err());
    }

    #[test]
    fn test_require_reviewer() {
        assert!(require_reviewer(&ctx(UserRole::Supervisor)).is_ok());
        assert!(require_reviewer(&ctx(UserRole::Admin)).is_ok());
        assert!(require_reviewer(&ctx(UserRole::Inspector)).is_err());
    }

    #[test]
    fn test_inspector_scope_only_for_inspectors() {
        assert_eq!(inspector_scope(&ctx(UserRole::Inspector)), Some(10));
        assert_eq!(inspector_scope(&ctx(UserRole::Supervisor)), None);
        assert_eq!(inspector_scope(&ctx(UserRole::Admin)), None);
    }

    #[test]
    fn test_inspector_limited_to_own_inspections() {
        let inspector = ctx(UserRole::Inspector);
        assert!(can_access_inspection(&inspector, 10));
        assert!(!can_access_inspection(&inspector, 11));

        let supervisor = ctx(UserRole::Supervisor);
        assert!(can_access_inspection(&supervisor, 11));
    }
}
