//! The `users` domain shared by every service
//!
//! There is a single entity: admins are users with an elevated role, and a
//! help seeker's verification lifecycle lives on the same row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Authorization tier of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    HelpSeeker,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::HelpSeeker => "help_seeker",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Roles allowed to verify or flag profiles
    pub fn can_moderate(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    /// Roles whose verified profiles appear in the public card stack
    pub fn is_browsable(&self) -> bool {
        matches!(self, Role::HelpSeeker | Role::Admin)
    }
}

/// Verification lifecycle of a profile. A NULL column reads as pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "verification_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Flagged,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Flagged => "flagged",
        }
    }
}

/// Row of the `users` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub url_id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub description: String,
    pub phone_number: String,
    pub role: Role,
    pub status: Option<VerificationStatus>,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub view_count: i32,
    pub linkedin_url: Option<String>,
    pub campaign_url: Option<String>,
    pub facebook_url: Option<String>,
    pub telegram_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Column list matching the field order of [`User`]
    pub const COLUMNS: &'static str = "id, url_id, email, password_hash, full_name, description, \
         phone_number, role, status, verified_by, verified_at, remarks, view_count, \
         linkedin_url, campaign_url, facebook_url, telegram_url, created_at, updated_at";

    pub fn effective_status(&self) -> VerificationStatus {
        self.status.unwrap_or(VerificationStatus::Pending)
    }

    /// Eligible for the public card stack. Verifier resolution is checked
    /// separately when the card is read.
    pub fn is_browsable(&self) -> bool {
        self.role.is_browsable()
            && self.status == Some(VerificationStatus::Verified)
            && self.verified_by.is_some()
    }
}

/// Optional outbound links shown on a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileLinks {
    pub linkedin_url: Option<String>,
    pub campaign_url: Option<String>,
    pub facebook_url: Option<String>,
    pub telegram_url: Option<String>,
}

/// New help seeker registration payload
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub description: String,
    pub phone_number: String,
    pub links: ProfileLinks,
}
