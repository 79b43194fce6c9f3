//! Configuration module for the goalkeeper manager.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;

use reqwest::Url;

/// Default MySQL/MariaDB port.
pub const DEFAULT_DB_PORT: u16 = 3306;

/// Errors raised while reading configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
    #[error("database is not configured: set DATABASE_URL or DB_HOST and DB_NAME")]
    MissingDatabase,
}

/// Connection settings for the relational database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub port: u16,
    /// Full connection URL; takes precedence over the discrete settings
    pub url: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: None,
            user: None,
            password: None,
            name: None,
            port: DEFAULT_DB_PORT,
            url: None,
        }
    }
}

impl DatabaseConfig {
    /// Build the connection URL handed to the `sqlx` any-driver.
    pub fn connection_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        let (Some(host), Some(name)) = (&self.host, &self.name) else {
            return Err(ConfigError::MissingDatabase);
        };

        let mut url = Url::parse(&format!("mysql://{}:{}/{}", host, self.port, name)).map_err(
            |_| ConfigError::InvalidValue {
                var: "DB_HOST",
                value: host.clone(),
            },
        )?;

        // Url percent-encodes the credentials for us
        if let Some(user) = &self.user {
            url.set_username(user)
                .map_err(|_| ConfigError::InvalidValue {
                    var: "DB_USER",
                    value: user.clone(),
                })?;
        }
        if let Some(password) = &self.password {
            url.set_password(Some(password))
                .map_err(|_| ConfigError::InvalidValue {
                    var: "DB_PASS",
                    value: "***".to_string(),
                })?;
        }

        Ok(url.to_string())
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit log lines as JSON
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = match env::var("DB_PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                var: "DB_PORT",
                value,
            })?,
            Err(_) => DEFAULT_DB_PORT,
        };

        let database = DatabaseConfig {
            host: non_empty_var("DB_HOST"),
            user: non_empty_var("DB_USER"),
            password: non_empty_var("DB_PASS"),
            name: non_empty_var("DB_NAME"),
            port,
            url: non_empty_var("DATABASE_URL"),
        };

        let bind_value =
            env::var("GOLEIROS_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_value
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                var: "GOLEIROS_BIND_ADDR",
                value: bind_value.clone(),
            })?;

        let log_level = env::var("GOLEIROS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_json = flag_var("GOLEIROS_LOG_JSON");

        Ok(Self {
            database,
            bind_addr,
            log_level,
            log_json,
        })
    }
}

/// Dashboard client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Talk to the HTTP backend instead of the in-memory fixtures
    pub use_real_api: bool,
    pub api_base_url: String,
    /// Key for the message drafting service; drafting is disabled without it
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            use_real_api: false,
            api_base_url: "http://127.0.0.1:8080/api".to_string(),
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load client configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Self {
            use_real_api: flag_var("GOLEIROS_USE_REAL_API"),
            api_base_url: non_empty_var("GOLEIROS_API_BASE_URL").unwrap_or(defaults.api_base_url),
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            gemini_model: non_empty_var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn flag_var(name: &str) -> bool {
    env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
