//! Service settings loaded with the `config` crate
//!
//! Defaults are overridden by `APP_*` environment variables
//! (`APP_HOST`, `APP_PORT`, `APP_VIEW_DEDUP_TTL_SECONDS`,
//! `APP_SUPER_ADMIN_EMAIL`).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// How long a session's view of a card is remembered
    pub view_dedup_ttl_seconds: u64,
    /// Account promoted to super_admin at start-up, if registered
    pub super_admin_email: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3001_i64)?
            .set_default("view_dedup_ttl_seconds", 86_400_i64)?
            .add_source(config::Environment::with_prefix("APP").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            std::env::remove_var("APP_HOST");
            std::env::remove_var("APP_PORT");
            std::env::remove_var("APP_VIEW_DEDUP_TTL_SECONDS");
            std::env::remove_var("APP_SUPER_ADMIN_EMAIL");
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_without_env() {
        clear_env();
        let settings = Settings::load().unwrap();
        assert_eq!(settings.bind_address(), "0.0.0.0:3001");
        assert_eq!(settings.view_dedup_ttl_seconds, 86_400);
        assert_eq!(settings.super_admin_email, None);
    }

    #[test]
    #[serial]
    fn env_overrides_defaults() {
        clear_env();
        unsafe {
            std::env::set_var("APP_VIEW_DEDUP_TTL_SECONDS", "60");
            std::env::set_var("APP_SUPER_ADMIN_EMAIL", "root@example.com");
        }
        let settings = Settings::load().unwrap();
        assert_eq!(settings.view_dedup_ttl_seconds, 60);
        assert_eq!(settings.super_admin_email.as_deref(), Some("root@example.com"));
        clear_env();
    }
}
