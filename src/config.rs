//! Configuration management for Bookshelf server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::services::catalog::MAX_SEARCH_RESULTS;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub session_secret: String,
    pub session_expiration_hours: u64,
    /// Emails that receive the admin role when they register
    pub admin_emails: Vec<String>,
    /// Grant the admin role to the very first account created
    pub first_user_is_admin: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
    pub max_results: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // BOOKSHELF_SERVER__PORT=8080 etc.
            .add_source(
                Environment::with_prefix("BOOKSHELF")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.admin_emails")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("auth.session_secret", env::var("SESSION_SECRET").ok())?
            .set_override_option("catalog.api_key", env::var("CATALOG_API_KEY").ok())?
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "catalog API key is required (set CATALOG_API_KEY)".to_string(),
            ));
        }
        if self.auth.session_secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "session secret must not be empty (set SESSION_SECRET)".to_string(),
            ));
        }
        if !(1..=MAX_SEARCH_RESULTS).contains(&self.catalog.max_results) {
            return Err(ConfigError::Message(format!(
                "catalog.max_results must be between 1 and {}",
                MAX_SEARCH_RESULTS
            )));
        }
        Ok(())
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.auth
            .admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email.trim()))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://library.db".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: "change-this-secret-in-production".to_string(),
            session_expiration_hours: 24,
            admin_emails: Vec::new(),
            first_user_is_admin: true,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/books/v1".to_string(),
            api_key: String::new(),
            timeout_seconds: 5,
            max_results: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
