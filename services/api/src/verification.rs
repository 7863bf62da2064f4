//! Verification state machine
//!
//! Profiles start `pending` and are moved to `verified` or `flagged` by
//! moderators. Verified and flagged are interchangeable afterwards; repeating
//! an action overwrites the verifier, timestamp and remarks. Super admins
//! additionally promote help seekers to admin and back.

use tracing::info;
use uuid::Uuid;

use common::models::{Role, VerificationStatus};

use crate::{
    error::{ApiError, ApiResult},
    guards::{self, require_role},
    models::admin::{RoleAction, RoleUpdate, StatusAction, StatusUpdate},
    store::UserStore,
};

pub const MAX_REMARKS_LEN: usize = 1000;

/// Trim remarks, dropping blank ones
fn normalize_remarks(remarks: Option<String>) -> ApiResult<Option<String>> {
    let remarks = remarks
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    match remarks {
        Some(r) if r.chars().count() > MAX_REMARKS_LEN => Err(ApiError::BadRequest(format!(
            "remarks must be at most {MAX_REMARKS_LEN} characters"
        ))),
        other => Ok(other),
    }
}

/// Verify or flag `target_id` on behalf of `actor_id`
pub async fn update_status(
    store: &dyn UserStore,
    actor_id: Uuid,
    target_id: Uuid,
    action: StatusAction,
    remarks: Option<String>,
) -> ApiResult<StatusUpdate> {
    require_role(store, actor_id, guards::MODERATORS).await?;
    let remarks = normalize_remarks(remarks)?;

    let previous = store
        .find_by_id(target_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {target_id}")))?;

    let status = action.target_status();
    let updated = store
        .set_status(target_id, status, actor_id, remarks.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {target_id}")))?;

    if updated.status == Some(VerificationStatus::Verified) && updated.verified_by.is_none() {
        return Err(ApiError::DataIntegrity(format!(
            "user {target_id} verified without a verifier"
        )));
    }

    info!(
        %actor_id,
        %target_id,
        from = previous.effective_status().as_str(),
        to = status.as_str(),
        previous_verifier = ?previous.verified_by,
        "verification status changed"
    );

    Ok(StatusUpdate {
        status: updated.effective_status(),
        id: updated.id,
        url_id: updated.url_id,
        full_name: updated.full_name,
        verified_by: updated.verified_by,
        verified_at: updated.verified_at,
        action,
        remarks: updated.remarks,
    })
}

/// Promote a help seeker to admin, or demote an admin back
pub async fn upgrade_role(
    store: &dyn UserStore,
    actor_id: Uuid,
    target_id: Uuid,
    new_role: Role,
    remarks: Option<String>,
) -> ApiResult<RoleUpdate> {
    if actor_id == target_id {
        return Err(ApiError::InvalidOperation(
            "cannot change your own role".to_string(),
        ));
    }
    if new_role == Role::SuperAdmin {
        return Err(ApiError::InvalidOperation(
            "super_admin cannot be assigned".to_string(),
        ));
    }

    require_role(store, actor_id, guards::SUPER_ADMIN).await?;
    let remarks = normalize_remarks(remarks)?;

    let target = store
        .find_by_id(target_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {target_id}")))?;
    if target.role == Role::SuperAdmin {
        return Err(ApiError::Forbidden(
            "cannot modify a super_admin".to_string(),
        ));
    }

    // the store refuses super admins too, so a concurrent promotion lands here
    let updated = store
        .set_role(target_id, new_role, remarks.as_deref())
        .await?
        .ok_or_else(|| ApiError::Forbidden("cannot modify a super_admin".to_string()))?;

    let action = match new_role {
        Role::Admin => RoleAction::UpgradeToAdmin,
        _ => RoleAction::DowngradeToHelpSeeker,
    };

    info!(
        %actor_id,
        %target_id,
        from = target.role.as_str(),
        to = new_role.as_str(),
        "role changed"
    );

    Ok(RoleUpdate {
        id: updated.id,
        url_id: updated.url_id,
        full_name: updated.full_name,
        role: updated.role,
        action,
        remarks: updated.remarks,
    })
}
