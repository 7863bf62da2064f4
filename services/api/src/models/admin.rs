//! Moderation payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::models::{Role, User, VerificationStatus};

/// Status transition requested by an admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusAction {
    Verify,
    Flag,
}

impl StatusAction {
    pub fn target_status(&self) -> VerificationStatus {
        match self {
            StatusAction::Verify => VerificationStatus::Verified,
            StatusAction::Flag => VerificationStatus::Flagged,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub action: StatusAction,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub id: Uuid,
    pub url_id: i32,
    pub full_name: String,
    pub status: VerificationStatus,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub action: StatusAction,
    pub remarks: Option<String>,
}

/// Tag describing the direction of a role change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleAction {
    UpgradeToAdmin,
    DowngradeToHelpSeeker,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdateRequest {
    pub new_role: Role,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdate {
    pub id: Uuid,
    pub url_id: i32,
    pub full_name: String,
    pub role: Role,
    pub action: RoleAction,
    pub remarks: Option<String>,
}

/// Query string of the admin listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub status: Option<VerificationStatus>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Normalized listing filter handed to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFilter {
    pub status: Option<VerificationStatus>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl UserFilter {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;
}

impl From<UserListQuery> for UserFilter {
    fn from(query: UserListQuery) -> Self {
        let search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            status: query.status,
            search,
            limit: query
                .limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
            offset: query.offset.unwrap_or(0).max(0),
        }
    }
}

/// Row of the admin listing. Unlike the public card it carries the email.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserSummary {
    pub id: Uuid,
    pub url_id: i32,
    pub email: String,
    pub full_name: String,
    pub phone_number: String,
    pub role: Role,
    pub status: VerificationStatus,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<User> for AdminUserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            url_id: user.url_id,
            status: user.effective_status(),
            email: user.email,
            full_name: user.full_name,
            phone_number: user.phone_number,
            role: user.role,
            verified_by: user.verified_by,
            verified_at: user.verified_at,
            remarks: user.remarks,
            view_count: user.view_count,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserList {
    pub users: Vec<AdminUserSummary>,
    pub total: i64,
}

/// Public profile of an admin
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: Uuid,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub verification_count: i64,
}
