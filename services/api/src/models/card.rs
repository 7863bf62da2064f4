//! Public card-stack payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::models::{ProfileLinks, Role, User, VerificationStatus};

/// The admin credited with verifying a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifierSummary {
    pub id: Uuid,
    pub full_name: String,
}

/// One profile in the public card stack. Never carries the email.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCard {
    pub id: Uuid,
    pub url_id: i32,
    pub full_name: String,
    pub description: String,
    pub phone_number: String,
    pub role: Role,
    pub status: VerificationStatus,
    pub view_count: i32,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub links: ProfileLinks,
    pub verified_by_admin: VerifierSummary,
}

impl UserCard {
    pub fn new(user: User, verifier: VerifierSummary) -> Self {
        Self {
            id: user.id,
            url_id: user.url_id,
            status: user.effective_status(),
            full_name: user.full_name,
            description: user.description,
            phone_number: user.phone_number,
            role: user.role,
            view_count: user.view_count,
            verified_at: user.verified_at,
            created_at: user.created_at,
            links: ProfileLinks {
                linkedin_url: user.linkedin_url,
                campaign_url: user.campaign_url,
                facebook_url: user.facebook_url,
                telegram_url: user.telegram_url,
            },
            verified_by_admin: verifier,
        }
    }
}

/// A card addressed by `url_id`, with its neighbours in the stack
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user: UserCard,
    pub next_user_url_id: Option<i32>,
    pub previous_user_url_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorQuery {
    pub current_user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRequest {
    pub session_id: Option<String>,
}

/// Result of a view-count increment request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewOutcome {
    pub counted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i32>,
}

/// Body of `POST /users/:id/views`, flat rather than wrapped in `data`
#[derive(Debug, Clone, Serialize)]
pub struct ViewResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: ViewOutcome,
}
