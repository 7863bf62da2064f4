//! Self-service profile payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::models::{ProfileLinks, Role, User, VerificationStatus};

/// The caller's own profile, as returned by `GET /me`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnProfile {
    pub id: Uuid,
    pub url_id: i32,
    pub email: String,
    pub full_name: String,
    pub description: String,
    pub phone_number: String,
    pub role: Role,
    pub status: VerificationStatus,
    pub remarks: Option<String>,
    pub view_count: i32,
    #[serde(flatten)]
    pub links: ProfileLinks,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for OwnProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            url_id: user.url_id,
            status: user.effective_status(),
            email: user.email,
            full_name: user.full_name,
            description: user.description,
            phone_number: user.phone_number,
            role: user.role,
            remarks: user.remarks,
            view_count: user.view_count,
            links: ProfileLinks {
                linkedin_url: user.linkedin_url,
                campaign_url: user.campaign_url,
                facebook_url: user.facebook_url,
                telegram_url: user.telegram_url,
            },
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Partial profile update. Absent fields are left untouched; an empty link
/// clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub phone_number: Option<String>,
    #[serde(flatten)]
    pub links: ProfileLinks,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.description.is_none()
            && self.phone_number.is_none()
            && self.links == ProfileLinks::default()
    }
}
