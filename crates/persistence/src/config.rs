//! Configuration loading and validation.

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
}

/// Database connection configuration.
///
/// Everything except `default_schema` must be supplied; `default_schema`
/// falls back to `public`.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,

    #[serde(default = "default_schema")]
    pub default_schema: String,
}

fn default_schema() -> String {
    "public".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration (optional)
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with CDB__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("CDB").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds the config entirely from embedded defaults and overrides,
    /// without touching the file system or process environment.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [database]
            host = "localhost"
            port = 5432
            database = "customers"
            user = "postgres"
            password = "postgres"
            default_schema = "public"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.host.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "CDB__DATABASE__HOST must be set".to_string(),
            ));
        }
        if self.database.database.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "CDB__DATABASE__DATABASE must be set".to_string(),
            ));
        }
        if self.database.user.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "CDB__DATABASE__USER must be set".to_string(),
            ));
        }
        if self.database.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Database port cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}
