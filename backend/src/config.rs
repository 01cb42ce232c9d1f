use std::str::FromStr;
use shuttle_runtime::SecretStore;
use tracing::info;

pub const STORE_BACKEND_KEY: &str = "STORE_BACKEND";
pub const CORS_ALLOWED_ORIGINS_KEY: &str = "CORS_ALLOWED_ORIGINS";
pub const RUN_MIGRATIONS_KEY: &str = "RUN_MIGRATIONS";

const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

/// Process-wide settings, read once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store_backend: StoreBackend,
    pub allowed_origins: Vec<String>,
    pub run_migrations: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::Postgres,
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            run_migrations: true,
        }
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value: value.to_string() }),
    }
}

impl AppConfig {
    pub fn from_secrets(secrets: &SecretStore) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| secrets.get(key))
    }

    /// Builds the config from any key lookup; unset keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(STORE_BACKEND_KEY) {
            config.store_backend = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: STORE_BACKEND_KEY,
                value,
            })?;
        }

        if let Some(value) = lookup(CORS_ALLOWED_ORIGINS_KEY) {
            let origins: Vec<String> = value.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
            if origins.is_empty() {
                return Err(ConfigError::InvalidValue { key: CORS_ALLOWED_ORIGINS_KEY, value });
            }
            config.allowed_origins = origins;
        }

        if let Some(value) = lookup(RUN_MIGRATIONS_KEY) {
            config.run_migrations = parse_bool(RUN_MIGRATIONS_KEY, &value)?;
        }

        info!(
            "⚙️ Config: store={:?}, origins={:?}, migrations={}",
            config.store_backend, config.allowed_origins, config.run_migrations
        );
        Ok(config)
    }
}
