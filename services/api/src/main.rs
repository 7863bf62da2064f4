use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod admin;
mod error;
mod guards;
mod middleware;
mod models;
mod navigation;
mod profile;
mod repositories;
mod routes;
mod settings;
mod state;
mod store;
mod verification;

use common::{
    cache::{RedisConfig, RedisPool},
    database::{self, DatabaseConfig},
};
use tokio::net::TcpListener;

use crate::{
    middleware::JwtVerifier,
    repositories::{PgUserStore, RedisViewLedger},
    settings::Settings,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting API service");

    let settings = Settings::load()?;

    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;
    info!("Database migrations applied");

    let user_store = PgUserStore::new(pool);

    if let Some(email) = settings.super_admin_email.as_deref() {
        if !user_store.promote_super_admin(email).await? {
            warn!(%email, "super admin account is not registered yet");
        }
    }

    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    let app_state = AppState {
        store: Arc::new(user_store),
        view_ledger: Arc::new(RedisViewLedger::new(
            redis_pool,
            settings.view_dedup_ttl_seconds,
        )),
        jwt_verifier: JwtVerifier::from_env()?,
    };

    let app = routes::create_router(app_state);

    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("API service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
