//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TACO_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `TACO_HOST` - Bind address (default: 127.0.0.1)
//! - `TACO_PORT` - Listen port (default: 8080)
//! - `TACO_BASE_URL` - Public URL (default: `http://localhost:8080`)
//! - `TACO_ORDERS_PAGE_SIZE` - Orders shown on the order history page (default: 20)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Largest accepted order history page size.
pub const MAX_ORDERS_PAGE_SIZE: u32 = 100;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct TacoCloudConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Order listing settings
    pub orders: OrderConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Order listing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderConfig {
    /// Number of past orders shown on the order history page.
    pub page_size: u32,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

impl TacoCloudConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from a variable lookup function.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&var);

        let database_url = vars
            .get("TACO_DATABASE_URL")
            .or_else(|| vars.get("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("TACO_DATABASE_URL".to_string()))?;
        let host = vars.parse_or("TACO_HOST", "127.0.0.1")?;
        let port = vars.parse_or("TACO_PORT", "8080")?;
        let base_url = vars.get_or("TACO_BASE_URL", "http://localhost:8080");
        let orders = OrderConfig {
            page_size: parse_page_size(&vars.get_or("TACO_ORDERS_PAGE_SIZE", "20"))?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            orders,
            sentry_dsn: vars.get("SENTRY_DSN"),
            sentry_environment: vars.get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: vars.parse_or("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: vars.parse_or("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (enables secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    /// Get an optional variable.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    /// Get a variable with a default value.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_or(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Parse and range-check the order history page size.
fn parse_page_size(value: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::InvalidEnvVar("TACO_ORDERS_PAGE_SIZE".to_string(), reason)
    };

    let size = value.parse::<u32>().map_err(|e| invalid(e.to_string()))?;
    if size == 0 || size > MAX_ORDERS_PAGE_SIZE {
        return Err(invalid(format!(
            "must be between 1 and {MAX_ORDERS_PAGE_SIZE} (got {size})"
        )));
    }
    Ok(size)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<TacoCloudConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        TacoCloudConfig::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("TACO_DATABASE_URL", "postgres://localhost/tacos")]).unwrap();

        assert_eq!(config.database_url.expose_secret(), "postgres://localhost/tacos");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.orders.page_size, 20);
        assert!(!config.is_secure());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fly/tacos")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fly/tacos");
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "TACO_DATABASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TACO_DATABASE_URL", "postgres://localhost/tacos"),
            ("TACO_HOST", "0.0.0.0"),
            ("TACO_PORT", "9000"),
            ("TACO_BASE_URL", "https://tacocloud.example"),
            ("TACO_ORDERS_PAGE_SIZE", "5"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.orders.page_size, 5);
        assert!(config.is_secure());
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[
            ("TACO_DATABASE_URL", "postgres://localhost/tacos"),
            ("TACO_PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "TACO_PORT"));
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(parse_page_size("0").is_err());
        assert!(parse_page_size("101").is_err());
        assert!(parse_page_size("-3").is_err());
        assert_eq!(parse_page_size("1").unwrap(), 1);
        assert_eq!(parse_page_size("100").unwrap(), 100);
    }

    #[test]
    fn test_debug_does_not_leak_database_url() {
        let config = load(&[("TACO_DATABASE_URL", "postgres://user:hunter2@db/tacos")]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
    }
}
