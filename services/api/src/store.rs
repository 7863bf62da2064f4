//! Storage seams of the API service
//!
//! The engines only talk to these traits. Production wires the Postgres and
//! Redis implementations from [`crate::repositories`]; unit tests use the
//! in-memory ones in [`memory`].

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use common::models::{Role, User, VerificationStatus};

use crate::{
    models::{admin::UserFilter, profile::ProfilePatch},
    navigation::CardKey,
};

/// Access to the `users` table
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Current role of a user, read fresh on every authorization check
    async fn find_role(&self, id: Uuid) -> Result<Option<Role>>;

    /// Set the verification status and record the actor. `None` when the
    /// target does not exist.
    async fn set_status(
        &self,
        target: Uuid,
        status: VerificationStatus,
        actor: Uuid,
        remarks: Option<&str>,
    ) -> Result<Option<User>>;

    /// Change the role of a user who is not a super admin. `None` when the
    /// target does not exist or is a super admin.
    async fn set_role(&self, target: Uuid, role: Role, remarks: Option<&str>)
    -> Result<Option<User>>;

    /// First browsable user in card order
    async fn first_card(&self) -> Result<Option<User>>;

    /// Last browsable user in card order
    async fn last_card(&self) -> Result<Option<User>>;

    /// First browsable user strictly after `key`
    async fn card_after(&self, key: &CardKey) -> Result<Option<User>>;

    /// Last browsable user strictly before `key`
    async fn card_before(&self, key: &CardKey) -> Result<Option<User>>;

    async fn find_card_by_url_id(&self, url_id: i32) -> Result<Option<User>>;

    /// Atomically add one view to a browsable user, returning the new count
    async fn increment_view_count(&self, id: Uuid) -> Result<Option<i32>>;

    /// Filtered page of users plus the total number of matches
    async fn list_users(&self, filter: &UserFilter) -> Result<(Vec<User>, i64)>;

    /// Number of users currently verified by `admin_id`
    async fn verification_count(&self, admin_id: Uuid) -> Result<i64>;

    /// Apply a normalized profile patch. An empty link string clears the link.
    async fn update_profile(&self, id: Uuid, patch: &ProfilePatch) -> Result<Option<User>>;
}

/// Records which anonymous sessions already viewed a card
#[async_trait]
pub trait ViewLedger: Send + Sync {
    /// Returns `true` for the first view of `user_id` in `session_id`
    async fn claim(&self, session_id: &str, user_id: Uuid) -> Result<bool>;

    /// Undo a claim whose view was not counted
    async fn release(&self, session_id: &str, user_id: Uuid) -> Result<()>;
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use chrono::{DateTime, Duration, Utc};

    use super::*;

    #[derive(Default)]
    pub struct MemoryUserStore {
        users: Mutex<Vec<User>>,
        offline: AtomicBool,
    }

    impl MemoryUserStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Insert a help seeker created `age_minutes` ago and return its id
        pub fn seed(&self, full_name: &str, age_minutes: i64) -> Uuid {
            self.seed_at(full_name, Utc::now() - Duration::minutes(age_minutes))
        }

        pub fn seed_at(&self, full_name: &str, created_at: DateTime<Utc>) -> Uuid {
            let mut users = self.users.lock().unwrap();
            let id = Uuid::new_v4();
            let slug = full_name.to_lowercase().replace(' ', ".");
            let url_id = users.len() as i32 + 1;
            users.push(User {
                id,
                url_id,
                email: format!("{slug}@example.com"),
                password_hash: "hash".to_string(),
                full_name: full_name.to_string(),
                description: format!("{full_name} needs help"),
                phone_number: "+15550100".to_string(),
                role: Role::HelpSeeker,
                status: Some(VerificationStatus::Pending),
                verified_by: None,
                verified_at: None,
                remarks: None,
                view_count: 0,
                linkedin_url: None,
                campaign_url: None,
                facebook_url: None,
                telegram_url: None,
                created_at,
                updated_at: created_at,
            });
            id
        }

        pub fn seed_with_role(&self, full_name: &str, role: Role) -> Uuid {
            let id = self.seed(full_name, 10_000);
            self.modify(id, |u| u.role = role);
            id
        }

        /// Mark `id` verified by `admin` without going through the engine
        pub fn verify(&self, id: Uuid, admin: Uuid) {
            self.modify(id, |u| {
                u.status = Some(VerificationStatus::Verified);
                u.verified_by = Some(admin);
                u.verified_at = Some(Utc::now());
            });
        }

        pub fn modify(&self, id: Uuid, f: impl FnOnce(&mut User)) {
            let mut users = self.users.lock().unwrap();
            if let Some(user) = users.iter_mut().find(|u| u.id == id) {
                f(user);
            }
        }

        /// Make every view increment fail as if the database were down
        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        pub fn get(&self, id: Uuid) -> Option<User> {
            self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
        }

        fn cards(&self) -> Vec<User> {
            let mut cards: Vec<User> = self
                .users
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.is_browsable())
                .cloned()
                .collect();
            cards.sort_by_key(|u| CardKey::from(u));
            cards
        }
    }

    fn matches(user: &User, filter: &UserFilter) -> bool {
        let status_ok = match filter.status {
            Some(status) => user.effective_status() == status,
            None => true,
        };
        let search_ok = match &filter.search {
            Some(term) => {
                let term = term.to_lowercase();
                [&user.full_name, &user.email, &user.phone_number]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            None => true,
        };
        status_ok && search_ok
    }

    fn apply_link(field: &mut Option<String>, patch: &Option<String>) {
        if let Some(value) = patch {
            *field = if value.is_empty() {
                None
            } else {
                Some(value.clone())
            };
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
            Ok(self.get(id))
        }

        async fn find_role(&self, id: Uuid) -> Result<Option<Role>> {
            Ok(self.get(id).map(|u| u.role))
        }

        async fn set_status(
            &self,
            target: Uuid,
            status: VerificationStatus,
            actor: Uuid,
            remarks: Option<&str>,
        ) -> Result<Option<User>> {
            let mut users = self.users.lock().unwrap();
            Ok(users.iter_mut().find(|u| u.id == target).map(|u| {
                let now = Utc::now();
                u.status = Some(status);
                u.verified_by = Some(actor);
                u.verified_at = Some(now);
                u.remarks = remarks.map(str::to_string);
                u.updated_at = now;
                u.clone()
            }))
        }

        async fn set_role(
            &self,
            target: Uuid,
            role: Role,
            remarks: Option<&str>,
        ) -> Result<Option<User>> {
            let mut users = self.users.lock().unwrap();
            Ok(users
                .iter_mut()
                .find(|u| u.id == target && u.role != Role::SuperAdmin)
                .map(|u| {
                    u.role = role;
                    u.remarks = remarks.map(str::to_string);
                    u.updated_at = Utc::now();
                    u.clone()
                }))
        }

        async fn first_card(&self) -> Result<Option<User>> {
            Ok(self.cards().into_iter().next())
        }

        async fn last_card(&self) -> Result<Option<User>> {
            Ok(self.cards().pop())
        }

        async fn card_after(&self, key: &CardKey) -> Result<Option<User>> {
            Ok(self
                .cards()
                .into_iter()
                .find(|u| CardKey::from(u) > *key))
        }

        async fn card_before(&self, key: &CardKey) -> Result<Option<User>> {
            Ok(self
                .cards()
                .into_iter()
                .rev()
                .find(|u| CardKey::from(u) < *key))
        }

        async fn find_card_by_url_id(&self, url_id: i32) -> Result<Option<User>> {
            Ok(self.cards().into_iter().find(|u| u.url_id == url_id))
        }

        async fn increment_view_count(&self, id: Uuid) -> Result<Option<i32>> {
            if self.offline.load(Ordering::SeqCst) {
                anyhow::bail!("connection refused");
            }
            let mut users = self.users.lock().unwrap();
            Ok(users
                .iter_mut()
                .find(|u| u.id == id && u.is_browsable())
                .map(|u| {
                    u.view_count += 1;
                    u.view_count
                }))
        }

        async fn list_users(&self, filter: &UserFilter) -> Result<(Vec<User>, i64)> {
            let mut matched: Vec<User> = self
                .users
                .lock()
                .unwrap()
                .iter()
                .filter(|u| matches(u, filter))
                .cloned()
                .collect();
            matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let total = matched.len() as i64;
            let page = matched
                .into_iter()
                .skip(filter.offset as usize)
                .take(filter.limit as usize)
                .collect();
            Ok((page, total))
        }

        async fn verification_count(&self, admin_id: Uuid) -> Result<i64> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .filter(|u| {
                    u.verified_by == Some(admin_id)
                        && u.status == Some(VerificationStatus::Verified)
                })
                .count() as i64)
        }

        async fn update_profile(&self, id: Uuid, patch: &ProfilePatch) -> Result<Option<User>> {
            let mut users = self.users.lock().unwrap();
            Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
                if let Some(name) = &patch.full_name {
                    u.full_name = name.clone();
                }
                if let Some(description) = &patch.description {
                    u.description = description.clone();
                }
                if let Some(phone) = &patch.phone_number {
                    u.phone_number = phone.clone();
                }
                apply_link(&mut u.linkedin_url, &patch.links.linkedin_url);
                apply_link(&mut u.campaign_url, &patch.links.campaign_url);
                apply_link(&mut u.facebook_url, &patch.links.facebook_url);
                apply_link(&mut u.telegram_url, &patch.links.telegram_url);
                u.updated_at = Utc::now();
                u.clone()
            }))
        }
    }

    #[derive(Default)]
    pub struct MemoryViewLedger {
        seen: Mutex<HashSet<(String, Uuid)>>,
    }

    #[async_trait]
    impl ViewLedger for MemoryViewLedger {
        async fn claim(&self, session_id: &str, user_id: Uuid) -> Result<bool> {
            Ok(self
                .seen
                .lock()
                .unwrap()
                .insert((session_id.to_string(), user_id)))
        }

        async fn release(&self, session_id: &str, user_id: Uuid) -> Result<()> {
            self.seen
                .lock()
                .unwrap()
                .remove(&(session_id.to_string(), user_id));
            Ok(())
        }
    }
}
