use std::{env, fmt, str::FromStr};

use tracing::{info, warn};

use crate::filtering::DEFAULT_LIMIT;

/// Selects the in-memory store instead of a database connection.
pub const MEMORY_STORE: &str = "memory";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// sea-orm connection URL, or [`MEMORY_STORE`].
    pub database_url: String,
    pub default_page_limit: u64,
    /// Bearer token registered for a seeded admin user.
    pub admin_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { key, value, reason } => write!(f, "invalid {key} value `{value}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] for values that do not parse.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`, falling back to defaults for unset keys.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] for values that do not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let default_limit = DEFAULT_LIMIT.to_string();
        let default_page_limit = try_load(&lookup, "DEFAULT_PAGE_LIMIT", &default_limit)?;
        if default_page_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "DEFAULT_PAGE_LIMIT",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            port: try_load(&lookup, "PORT", "5000")?,
            database_url: var(&lookup, "DATABASE_URL").unwrap_or_else(|| {
                info!("DATABASE_URL not set, using default: sqlite::memory:");
                "sqlite::memory:".to_string()
            }),
            default_page_limit,
            admin_token: var(&lookup, "ADMIN_TOKEN"),
        })
    }

    #[must_use]
    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_STORE
    }
}

fn var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    let value = lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    if value.is_none() {
        warn!("Environment variable {key} not found, using default");
    }
    value
}

fn try_load<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    let value = var(lookup, key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.default_page_limit, 25);
        assert_eq!(config.admin_token, None);
        assert!(!config.uses_memory_store());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "memory"),
            ("DEFAULT_PAGE_LIMIT", "10"),
            ("ADMIN_TOKEN", "secret"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.uses_memory_store());
        assert_eq!(config.default_page_limit, 10);
        assert_eq!(config.admin_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("PORT", "not-a-port")]),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
        assert!(config(&[("DEFAULT_PAGE_LIMIT", "0")]).is_err());
    }
}
