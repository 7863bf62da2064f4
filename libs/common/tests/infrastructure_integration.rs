//! Integration tests for the infrastructure components
//!
//! These tests verify that PostgreSQL (with migrations applied) and Redis
//! are reachable from the application. They are ignored by default because
//! they need both servers running.

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires running PostgreSQL and Redis"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    run_migrations(&pool).await?;

    let row = sqlx::query(
        "SELECT COUNT(*) AS n FROM information_schema.tables WHERE table_name = 'users'",
    )
    .fetch_one(&pool)
    .await?;
    let tables: i64 = row.get("n");
    assert_eq!(tables, 1, "users table missing after migrations");

    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    assert!(
        redis_pool.health_check().await?,
        "Redis health check failed"
    );

    let test_key = "integration_test_view_key";
    redis_pool.delete(test_key).await?;

    assert!(redis_pool.set_if_absent(test_key, "1", 10).await?);
    assert!(!redis_pool.set_if_absent(test_key, "1", 10).await?);
    assert_eq!(redis_pool.get(test_key).await?, Some("1".to_string()));

    redis_pool.delete(test_key).await?;
    assert_eq!(redis_pool.get(test_key).await?, None);

    Ok(())
}
