//! Postgres and Redis backed stores

pub mod user;
pub mod views;

pub use user::PgUserStore;
pub use views::RedisViewLedger;
