//! Self-service profile editing
//!
//! Users may edit their own profile fields only. Status, role and view
//! count are out of reach from here.

use uuid::Uuid;

use common::models::ProfileLinks;

use crate::{
    error::{ApiError, ApiResult},
    models::profile::{OwnProfile, ProfilePatch},
    store::UserStore,
};

pub async fn get_own_profile(store: &dyn UserStore, user_id: Uuid) -> ApiResult<OwnProfile> {
    store
        .find_by_id(user_id)
        .await?
        .map(OwnProfile::from)
        .ok_or(ApiError::Unauthorized)
}

fn required_field(name: &str, value: Option<String>) -> ApiResult<Option<String>> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(ApiError::BadRequest(format!("{name} cannot be empty"))),
        other => Ok(other),
    }
}

fn trim_link(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

pub async fn update_own_profile(
    store: &dyn UserStore,
    user_id: Uuid,
    patch: ProfilePatch,
) -> ApiResult<OwnProfile> {
    if patch.is_empty() {
        return Err(ApiError::BadRequest("nothing to update".to_string()));
    }

    let patch = ProfilePatch {
        full_name: required_field("fullName", patch.full_name)?,
        description: required_field("description", patch.description)?,
        phone_number: required_field("phoneNumber", patch.phone_number)?,
        links: ProfileLinks {
            linkedin_url: trim_link(patch.links.linkedin_url),
            campaign_url: trim_link(patch.links.campaign_url),
            facebook_url: trim_link(patch.links.facebook_url),
            telegram_url: trim_link(patch.links.telegram_url),
        },
    };

    store
        .update_profile(user_id, &patch)
        .await?
        .map(OwnProfile::from)
        .ok_or(ApiError::Unauthorized)
}
