//! Postgres implementation of [`UserStore`]

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use common::models::{Role, User, VerificationStatus};

use crate::{
    models::{admin::UserFilter, profile::ProfilePatch},
    navigation::CardKey,
    store::UserStore,
};

/// Rows that may appear in the public card stack
const BROWSABLE: &str =
    "role IN ('help_seeker', 'admin') AND status = 'verified' AND verified_by IS NOT NULL";

const CARD_ORDER: &str = "view_count ASC, created_at DESC, id ASC";
const CARD_ORDER_REVERSED: &str = "view_count DESC, created_at ASC, id DESC";

/// Escape `%`, `_` and `\` so user input matches literally inside LIKE
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Emails are stored trimmed and lowercased at registration
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grant `super_admin` to the account registered under `email`.
    ///
    /// Returns `false` when no such account exists yet.
    pub async fn promote_super_admin(&self, email: &str) -> Result<bool> {
        let email = normalize_email(email);
        let result = sqlx::query(
            "UPDATE users SET role = 'super_admin', updated_at = NOW() \
             WHERE email = $1 AND role <> 'super_admin'",
        )
        .bind(&email)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(%email, "promoted to super_admin");
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(&email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn fetch_card(&self, sql: &str, key: Option<&CardKey>) -> Result<Option<User>> {
        let mut query = sqlx::query_as::<_, User>(sql);
        if let Some(key) = key {
            query = query.bind(key.view_count).bind(key.created_at).bind(key.id);
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", User::COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_role(&self, id: Uuid) -> Result<Option<Role>> {
        let role = sqlx::query_scalar::<_, Role>("SELECT role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    async fn set_status(
        &self,
        target: Uuid,
        status: VerificationStatus,
        actor: Uuid,
        remarks: Option<&str>,
    ) -> Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET status = $2, verified_by = $3, verified_at = NOW(), remarks = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            User::COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(target)
            .bind(status)
            .bind(actor)
            .bind(remarks)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn set_role(
        &self,
        target: Uuid,
        role: Role,
        remarks: Option<&str>,
    ) -> Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET role = $2, remarks = $3, updated_at = NOW()
            WHERE id = $1 AND role <> 'super_admin'
            RETURNING {}
            "#,
            User::COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(target)
            .bind(role)
            .bind(remarks)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn first_card(&self) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE {BROWSABLE} ORDER BY {CARD_ORDER} LIMIT 1",
            User::COLUMNS
        );
        self.fetch_card(&sql, None).await
    }

    async fn last_card(&self) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE {BROWSABLE} ORDER BY {CARD_ORDER_REVERSED} LIMIT 1",
            User::COLUMNS
        );
        self.fetch_card(&sql, None).await
    }

    async fn card_after(&self, key: &CardKey) -> Result<Option<User>> {
        let sql = format!(
            r#"
            SELECT {} FROM users
            WHERE {BROWSABLE}
              AND (view_count > $1
                   OR (view_count = $1 AND (created_at < $2
                       OR (created_at = $2 AND id > $3))))
            ORDER BY {CARD_ORDER}
            LIMIT 1
            "#,
            User::COLUMNS
        );
        self.fetch_card(&sql, Some(key)).await
    }

    async fn card_before(&self, key: &CardKey) -> Result<Option<User>> {
        let sql = format!(
            r#"
            SELECT {} FROM users
            WHERE {BROWSABLE}
              AND (view_count < $1
                   OR (view_count = $1 AND (created_at > $2
                       OR (created_at = $2 AND id < $3))))
            ORDER BY {CARD_ORDER_REVERSED}
            LIMIT 1
            "#,
            User::COLUMNS
        );
        self.fetch_card(&sql, Some(key)).await
    }

    async fn find_card_by_url_id(&self, url_id: i32) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE url_id = $1 AND {BROWSABLE}",
            User::COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(url_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<Option<i32>> {
        let sql = format!(
            "UPDATE users SET view_count = view_count + 1 WHERE id = $1 AND {BROWSABLE} \
             RETURNING view_count"
        );
        let count = sqlx::query_scalar::<_, i32>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<(Vec<User>, i64)> {
        const FILTER: &str = r#"
            ($1::verification_status IS NULL OR COALESCE(status, 'pending') = $1)
            AND ($2::text IS NULL
                 OR full_name ILIKE $2 OR email ILIKE $2 OR phone_number ILIKE $2)
        "#;

        let pattern = filter.search.as_deref().map(like_pattern);

        let sql = format!(
            "SELECT {} FROM users WHERE {FILTER} ORDER BY created_at DESC, id ASC LIMIT $3 OFFSET $4",
            User::COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(filter.status)
            .bind(&pattern)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM users WHERE {FILTER}"
        ))
        .bind(filter.status)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((users, total))
    }

    async fn verification_count(&self, admin_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE verified_by = $1 AND status = 'verified'",
        )
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn update_profile(&self, id: Uuid, patch: &ProfilePatch) -> Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                description = COALESCE($3, description),
                phone_number = COALESCE($4, phone_number),
                linkedin_url = CASE WHEN $5::text IS NULL THEN linkedin_url ELSE NULLIF($5, '') END,
                campaign_url = CASE WHEN $6::text IS NULL THEN campaign_url ELSE NULLIF($6, '') END,
                facebook_url = CASE WHEN $7::text IS NULL THEN facebook_url ELSE NULLIF($7, '') END,
                telegram_url = CASE WHEN $8::text IS NULL THEN telegram_url ELSE NULLIF($8, '') END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            User::COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&patch.full_name)
            .bind(&patch.description)
            .bind(&patch.phone_number)
            .bind(&patch.links.linkedin_url)
            .bind(&patch.links.campaign_url)
            .bind(&patch.links.facebook_url)
            .bind(&patch.links.telegram_url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
