use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL used to build ticket links in escalation notifications.
    pub app_base_url: String,
    /// SLA backend selector; anything other than "database" falls back with
    /// a warning (see `resolve_sla_backend`).
    pub sla_backend: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let app_base_url =
            env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        if app_base_url.is_empty() {
            return Err(ConfigError::InvalidBaseUrl);
        }

        let sla_backend = env::var("SLA_BACKEND").unwrap_or_else(|_| "database".to_string());

        Ok(Config {
            // Trailing slashes would double up in built ticket URLs.
            app_base_url: app_base_url.trim_end_matches('/').to_string(),
            sla_backend,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app_base_url: "http://localhost:3000".to_string(),
            sla_backend: "database".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_BASE_URL must not be empty")]
    InvalidBaseUrl,
}
