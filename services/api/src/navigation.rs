//! Card navigation engine
//!
//! Browsable profiles form a ring ordered by ascending `view_count`, then
//! newest first, then by id. Landing, next and previous all walk the same
//! order, and both ends wrap around.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use common::models::{User, VerificationStatus};

use crate::{
    error::{ApiError, ApiResult},
    models::card::{UserCard, UserData, VerifierSummary, ViewOutcome},
    store::{UserStore, ViewLedger},
};

/// Longest accepted anonymous session identifier
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Position of a user in the card order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardKey {
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl Ord for CardKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.view_count
            .cmp(&other.view_count)
            .then_with(|| other.created_at.cmp(&self.created_at))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for CardKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&User> for CardKey {
    fn from(user: &User) -> Self {
        Self {
            view_count: user.view_count,
            created_at: user.created_at,
            id: user.id,
        }
    }
}

/// Attach the verifying admin to a browsable user.
///
/// A verified row whose `verified_by` does not resolve is corrupt data and
/// fails the whole read.
async fn to_card(store: &dyn UserStore, user: User) -> ApiResult<UserCard> {
    let verifier_id = match user.verified_by {
        Some(id) => id,
        None if user.effective_status() == VerificationStatus::Verified => {
            return Err(ApiError::DataIntegrity(format!(
                "verified user {} has no verifier",
                user.id
            )));
        }
        None => {
            return Err(ApiError::DataIntegrity(format!(
                "user {} is not browsable",
                user.id
            )));
        }
    };

    let verifier = store.find_by_id(verifier_id).await?.ok_or_else(|| {
        ApiError::DataIntegrity(format!(
            "verifier {} of user {} does not exist",
            verifier_id, user.id
        ))
    })?;

    Ok(UserCard::new(
        user,
        VerifierSummary {
            id: verifier.id,
            full_name: verifier.full_name,
        },
    ))
}

async fn card_or_none(store: &dyn UserStore, user: Option<User>) -> ApiResult<Option<UserCard>> {
    match user {
        Some(user) => Ok(Some(to_card(store, user).await?)),
        None => Ok(None),
    }
}

/// Browsable user following `key`, wrapping to the first
async fn next_after(store: &dyn UserStore, key: &CardKey) -> ApiResult<Option<User>> {
    match store.card_after(key).await? {
        Some(user) => Ok(Some(user)),
        None => Ok(store.first_card().await?),
    }
}

/// Browsable user preceding `key`, wrapping to the last
async fn previous_before(store: &dyn UserStore, key: &CardKey) -> ApiResult<Option<User>> {
    match store.card_before(key).await? {
        Some(user) => Ok(Some(user)),
        None => Ok(store.last_card().await?),
    }
}

/// Card after `current_user_id`, or the landing card when there is no
/// usable cursor. `None` only when nothing is browsable.
pub async fn get_next_user(
    store: &dyn UserStore,
    current_user_id: Option<Uuid>,
) -> ApiResult<Option<UserCard>> {
    let current = match current_user_id {
        Some(id) => store.find_by_id(id).await?,
        None => None,
    };

    let user = match current {
        Some(current) => next_after(store, &CardKey::from(&current)).await?,
        None => {
            if let Some(id) = current_user_id {
                debug!(%id, "unknown cursor, falling back to landing card");
            }
            store.first_card().await?
        }
    };

    card_or_none(store, user).await
}

/// Mirror of [`get_next_user`]: the card before `current_user_id`, wrapping
/// to the last card.
pub async fn get_previous_user(
    store: &dyn UserStore,
    current_user_id: Option<Uuid>,
) -> ApiResult<Option<UserCard>> {
    let current = match current_user_id {
        Some(id) => store.find_by_id(id).await?,
        None => None,
    };

    let user = match current {
        Some(current) => previous_before(store, &CardKey::from(&current)).await?,
        None => store.last_card().await?,
    };

    card_or_none(store, user).await
}

/// A browsable card addressed by its public id, with its neighbours
pub async fn get_user_by_url_id(store: &dyn UserStore, url_id: i32) -> ApiResult<Option<UserData>> {
    let Some(user) = store.find_card_by_url_id(url_id).await? else {
        return Ok(None);
    };

    let key = CardKey::from(&user);
    let next = next_after(store, &key).await?;
    let previous = previous_before(store, &key).await?;

    Ok(Some(UserData {
        user: to_card(store, user).await?,
        next_user_url_id: next.map(|u| u.url_id),
        previous_user_url_id: previous.map(|u| u.url_id),
    }))
}

/// Count one view of `user_id`.
///
/// Signed-in callers are never counted. With a session id, only the first
/// view per session is counted.
pub async fn increment_view_count(
    store: &dyn UserStore,
    ledger: &dyn ViewLedger,
    user_id: Uuid,
    session_id: Option<&str>,
    authenticated: bool,
) -> ApiResult<ViewOutcome> {
    if authenticated {
        debug!(%user_id, "view by signed-in caller not counted");
        return Ok(ViewOutcome {
            counted: false,
            view_count: None,
        });
    }

    let session_id = match session_id.map(str::trim) {
        Some(id) if id.is_empty() || id.len() > MAX_SESSION_ID_LEN => {
            return Err(ApiError::BadRequest(format!(
                "sessionId must be 1 to {MAX_SESSION_ID_LEN} characters"
            )));
        }
        other => other,
    };

    if let Some(session_id) = session_id {
        if !ledger.claim(session_id, user_id).await? {
            return Ok(ViewOutcome {
                counted: false,
                view_count: None,
            });
        }
    }

    let result = store.increment_view_count(user_id).await;

    // a claim only stands for a view that was actually counted
    if !matches!(result, Ok(Some(_))) {
        if let Some(session_id) = session_id {
            if let Err(e) = ledger.release(session_id, user_id).await {
                warn!(%user_id, error = %e, "failed to release view claim");
            }
        }
    }

    match result? {
        Some(view_count) => Ok(ViewOutcome {
            counted: true,
            view_count: Some(view_count),
        }),
        None => {
            warn!(%user_id, "view for unknown or hidden user");
            Err(ApiError::NotFound(format!("user {user_id}")))
        }
    }
}
