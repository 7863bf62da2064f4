//! Listener settings loaded with the `config` crate
//!
//! Defaults are overridden by `APP_*` environment variables
//! (`APP_HOST`, `APP_PORT`).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000_i64)?
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

    #[test]
    #[serial]
    fn defaults_apply_without_env() {
        unsafe {
            std::env::remove_var("APP_HOST");
            std::env::remove_var("APP_PORT");
        }
        let settings = Settings::load().unwrap();
        assert_eq!(settings.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    #[serial]
    fn env_overrides_port() {
        unsafe {
            std::env::set_var("APP_PORT", "4100");
        }
        let settings = Settings::load().unwrap();
        assert_eq!(settings.port, 4100);
        unsafe {
            std::env::remove_var("APP_PORT");
        }
    }
}
