//! Role guards for privileged operations

use tracing::warn;
use uuid::Uuid;

use common::models::Role;

use crate::{
    error::{ApiError, ApiResult},
    store::UserStore,
};

/// Look up the actor's current role and check it against `allowed`.
///
/// Token claims never carry roles, so a demotion takes effect on the very
/// next request.
pub async fn require_role(
    store: &dyn UserStore,
    actor_id: Uuid,
    allowed: &[Role],
) -> ApiResult<Role> {
    let role = store
        .find_role(actor_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if allowed.contains(&role) {
        Ok(role)
    } else {
        warn!(%actor_id, role = role.as_str(), "insufficient role");
        let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
        Err(ApiError::Forbidden(format!(
            "requires role {}",
            names.join(" or ")
        )))
    }
}

pub const MODERATORS: &[Role] = &[Role::Admin, Role::SuperAdmin];
pub const SUPER_ADMIN: &[Role] = &[Role::SuperAdmin];
