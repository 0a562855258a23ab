//! Application configuration loaded from environment variables.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `HTTP_PORT` | Listening port | `8080` |
//! | `DATABASE_URL` | Full connection string | built from the `DATABASE_*` parts |
//! | `DATABASE_HOST`, `DATABASE_USER`, `DATABASE_PASSWORD`, `DATABASE_NAME` | Connection parts | none |
//! | `JWT_SECRET` | HS256 signing secret | required |
//! | `PAGE`, `PER_PAGE` | Search pagination defaults | `1`, `20` |
//! | `LOG_FILTER` | `tracing` filter directives | `info` |

use crate::pagination::{DEFAULT_PAGE, DEFAULT_PER_PAGE, PaginationConfig};
use thiserror::Error;

/// Port used when `HTTP_PORT` is unset.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Filter used when `LOG_FILTER` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

const DATABASE_PORT: u16 = 5432;

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} is not set in the environment")]
    Missing(&'static str),

    /// A variable holds a value that does not parse.
    #[error("{key} has an invalid value: {value}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Resolved application configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Listening port.
    pub http_port: u16,
    /// Database connection string.
    pub database_url: String,
    /// HS256 signing secret.
    pub jwt_secret: String,
    /// Search pagination defaults.
    pub pagination: PaginationConfig,
    /// `tracing` filter directives.
    pub log_filter: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("http_port", &self.http_port)
            .field("pagination", &self.pagination)
            .field("log_filter", &self.log_filter)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns the value of a
    /// variable or `None` when it is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let jwt_secret = read("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let http_port = match read("HTTP_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "HTTP_PORT",
                value: raw.clone(),
            })?,
            None => DEFAULT_HTTP_PORT,
        };
        let database_url = match read("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts(&read)?,
        };

        Ok(Self {
            http_port,
            database_url,
            jwt_secret,
            pagination: PaginationConfig {
                page: positive_or(read("PAGE"), DEFAULT_PAGE),
                per_page: positive_or(read("PER_PAGE"), DEFAULT_PER_PAGE),
            },
            log_filter: read("LOG_FILTER").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
        })
    }
}

fn database_url_from_parts(
    read: &impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let (Some(host), Some(user), Some(name)) = (
        read("DATABASE_HOST"),
        read("DATABASE_USER"),
        read("DATABASE_NAME"),
    ) else {
        return Err(ConfigError::Missing("DATABASE_URL"));
    };
    let password = read("DATABASE_PASSWORD").unwrap_or_default();
    Ok(format!(
        "host={host} port={DATABASE_PORT} user={user} password={password} dbname={name} sslmode=disable"
    ))
}

// Non-numeric and non-positive values fall back silently.
fn positive_or(raw: Option<String>, fallback: i64) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(fallback)
}
