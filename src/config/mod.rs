use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

use crate::db::CommitPolicy;

fn default_max_connections() -> u32 {
    5
}

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Upper bound on pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How composite writes are committed
    #[serde(default)]
    pub commit_policy: CommitPolicy,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Parse environment variables into Config struct
        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Build a configuration from explicit `(NAME, value)` pairs
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter::<_, Config>(vars)?)
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    // Ensure .env file is loaded
    dotenv().ok();

    // Load the configuration
    Config::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_only_the_url_is_set() {
        let config =
            Config::from_vars(vars(&[("DATABASE_URL", "postgres://localhost/clients_db")]))
                .unwrap();

        assert_eq!(config.database_url(), "postgres://localhost/clients_db");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.commit_policy, CommitPolicy::Atomic);
    }

    #[test]
    fn commit_policy_and_pool_size_are_read() {
        let config = Config::from_vars(vars(&[
            ("DATABASE_URL", "postgres://localhost/clients_db"),
            ("MAX_CONNECTIONS", "2"),
            ("COMMIT_POLICY", "per-statement"),
        ]))
        .unwrap();

        assert_eq!(config.max_connections, 2);
        assert_eq!(config.commit_policy, CommitPolicy::PerStatement);
    }

    #[test]
    fn missing_url_is_an_error() {
        assert!(Config::from_vars(vars(&[("MAX_CONNECTIONS", "2")])).is_err());
    }
}
