//! Caller resolution and role gates shared by every service.

use crate::domain::{AuthenticatedCaller, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// Resolve the caller's account. Unknown subjects and deactivated accounts yield `None`.
pub(crate) async fn resolve_actor(
    users: &dyn UserRepository,
    caller: &AuthenticatedCaller,
) -> AppResult<Option<User>> {
    let actor = users.find_by_subject(&caller.subject).await?;
    Ok(actor.filter(|user| user.is_active))
}

/// Resolve the caller for self-service operations.
pub(crate) async fn require_user(
    users: &dyn UserRepository,
    caller: &AuthenticatedCaller,
) -> AppResult<User> {
    resolve_actor(users, caller)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

/// Resolve the caller and require at least `role`.
pub(crate) async fn require_role(
    users: &dyn UserRepository,
    caller: &AuthenticatedCaller,
    role: UserRole,
) -> AppResult<User> {
    let denied = || match role {
        UserRole::SuperAdmin => AppError::unauthorized("Super admin access required"),
        _ => AppError::unauthorized("Admin access required"),
    };

    match resolve_actor(users, caller).await? {
        Some(actor) if actor.role.can_access(role) => Ok(actor),
        Some(actor) => {
            tracing::warn!(
                actor_id = %actor.id,
                role = %actor.role,
                required = %role,
                "privileged call rejected"
            );
            Err(denied())
        }
        None => Err(denied()),
    }
}

pub(crate) async fn require_admin(
    users: &dyn UserRepository,
    caller: &AuthenticatedCaller,
) -> AppResult<User> {
    require_role(users, caller, UserRole::Admin).await
}

pub(crate) async fn require_super_admin(
    users: &dyn UserRepository,
    caller: &AuthenticatedCaller,
) -> AppResult<User> {
    require_role(users, caller, UserRole::SuperAdmin).await
}
