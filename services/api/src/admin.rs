//! Admin listing and public admin profiles

use uuid::Uuid;

use crate::{
    error::ApiResult,
    guards::{self, require_role},
    models::admin::{AdminProfile, AdminUserSummary, UserFilter, UserList, UserListQuery},
    store::UserStore,
};

/// Paged user listing for moderators
pub async fn list_users(
    store: &dyn UserStore,
    actor_id: Uuid,
    query: UserListQuery,
) -> ApiResult<UserList> {
    require_role(store, actor_id, guards::MODERATORS).await?;

    let filter = UserFilter::from(query);
    let (users, total) = store.list_users(&filter).await?;

    Ok(UserList {
        users: users.into_iter().map(AdminUserSummary::from).collect(),
        total,
    })
}

/// Public profile of an admin or super admin. `None` for anyone else.
pub async fn get_admin_profile(
    store: &dyn UserStore,
    admin_id: Uuid,
) -> ApiResult<Option<AdminProfile>> {
    let Some(user) = store.find_by_id(admin_id).await? else {
        return Ok(None);
    };
    if !user.role.can_moderate() {
        return Ok(None);
    }

    let verification_count = store.verification_count(admin_id).await?;

    Ok(Some(AdminProfile {
        id: user.id,
        full_name: user.full_name,
        role: user.role,
        created_at: user.created_at,
        verification_count,
    }))
}

#[cfg(test)]
mod tests {
    use common::models::{Role, VerificationStatus};

    use super::*;
    use crate::{error::ApiError, store::memory::MemoryUserStore};

    #[tokio::test]
    async fn listing_filters_and_pages() {
        let store = MemoryUserStore::new();
        let admin = store.seed_with_role("Ada Admin", Role::Admin);
        let alice = store.seed("Alice Smith", 3);
        store.seed("Bob Jones", 2);
        store.seed("Carol Smith", 1);
        store.verify(alice, admin);

        let list = list_users(
            &store,
            admin,
            UserListQuery {
                search: Some("SMITH".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(list.total, 2);
        assert_eq!(list.users[0].full_name, "Carol Smith");

        let list = list_users(
            &store,
            admin,
            UserListQuery {
                status: Some(VerificationStatus::Pending),
                limit: Some(1),
                offset: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        // Carol, Bob, Ada are pending
        assert_eq!(list.total, 3);
        assert_eq!(list.users.len(), 1);
        assert_eq!(list.users[0].full_name, "Bob Jones");
    }

    #[tokio::test]
    async fn pending_filter_includes_null_status() {
        let store = MemoryUserStore::new();
        let admin = store.seed_with_role("Ada Admin", Role::Admin);
        let legacy = store.seed("Legacy", 1);
        store.modify(legacy, |u| u.status = None);

        let list = list_users(
            &store,
            admin,
            UserListQuery {
                status: Some(VerificationStatus::Pending),
                search: Some("legacy".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.users[0].status, VerificationStatus::Pending);
    }

    #[tokio::test]
    async fn listing_requires_moderator() {
        let store = MemoryUserStore::new();
        let seeker = store.seed("Sam", 1);

        let err = list_users(&store, seeker, UserListQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn admin_profile_counts_current_verifications() {
        let store = MemoryUserStore::new();
        let admin = store.seed_with_role("Ada Admin", Role::Admin);
        let a = store.seed("A", 2);
        let b = store.seed("B", 1);
        store.verify(a, admin);
        store.verify(b, admin);
        store.modify(b, |u| u.status = Some(VerificationStatus::Flagged));

        let profile = get_admin_profile(&store, admin).await.unwrap().unwrap();
        assert_eq!(profile.full_name, "Ada Admin");
        assert_eq!(profile.verification_count, 1);
    }

    #[tokio::test]
    async fn non_admins_have_no_public_profile() {
        let store = MemoryUserStore::new();
        let seeker = store.seed("Sam", 1);

        assert!(get_admin_profile(&store, seeker).await.unwrap().is_none());
        assert!(get_admin_profile(&store, Uuid::new_v4()).await.unwrap().is_none());
    }
}
