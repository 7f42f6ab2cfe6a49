//! Configuration management

use clap::Parser;
use config::{
    builder::DefaultState, Config as ConfigBuilder, ConfigBuilder as Builder,
    ConfigError as BuilderError, Environment, File,
};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Prefix for environment overrides, e.g. `LINKSHELF_JWT__ACCESS_SECRET`
pub const ENV_PREFIX: &str = "LINKSHELF";

/// Longest accepted token lifetime (100 years), well inside chrono's range
pub const MAX_TOKEN_LIFETIME_MINUTES: u64 = 60 * 24 * 365 * 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server configuration: {0}")]
    InvalidServer(String),

    #[error("Invalid database configuration: {0}")]
    InvalidDatabase(String),

    #[error("Invalid logging configuration: {0}")]
    InvalidLogging(String),

    #[error("Invalid security configuration: {0}")]
    InvalidSecurity(String),

    #[error("Invalid JWT configuration: {0}")]
    InvalidJwt(String),

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

impl From<BuilderError> for ConfigError {
    fn from(err: BuilderError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub jwt: JwtConfig,
}

impl Config {
    /// Load configuration with precedence: CLI args > Environment variables > Config file > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let cli_args = CliArgs::parse();
        Self::load_with(&cli_args)
    }

    /// Same as [`load`](Self::load) with already parsed arguments
    pub fn load_with(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let mut builder = with_defaults(ConfigBuilder::builder())?;

        if let Some(config_path) = &cli_args.config {
            if !config_path.exists() {
                return Err(ConfigError::FileNotFound(config_path.display().to_string()));
            }
            builder = builder.add_source(File::from(config_path.as_path()));
        }

        builder = builder.add_source(env_source());

        if let Some(host) = &cli_args.host {
            builder = builder.set_override("server.host", host.clone())?;
        }
        if let Some(port) = cli_args.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(db_path) = &cli_args.database {
            builder = builder.set_override("database.path", db_path.display().to_string())?;
        }
        if let Some(log_level) = &cli_args.log_level {
            builder = builder.set_override("logging.level", log_level.clone())?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file path (defaults fill the gaps)
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let config: Config = with_defaults(ConfigBuilder::builder())?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logging.validate()?;
        self.security.validate()?;
        self.jwt.validate()?;
        Ok(())
    }
}

fn with_defaults(builder: Builder<DefaultState>) -> Result<Builder<DefaultState>, ConfigError> {
    // Secrets have no usable default; validation rejects empty ones
    Ok(builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("server.request_timeout", 30)?
        .set_default("server.lookup_timeout_ms", 5000)?
        .set_default("database.path", "./data/linkshelf.db")?
        .set_default("database.connection_pool_size", 10)?
        .set_default("database.busy_timeout", 5000)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "json")?
        .set_default("logging.output", "stdout")?
        .set_default("security.allowed_origins", vec!["*"])?
        .set_default("jwt.access_secret", "")?
        .set_default("jwt.access_expiration_minutes", 60 * 24)?
        .set_default("jwt.refresh_secret", "")?
        .set_default("jwt.refresh_expiration_minutes", 60 * 24 * 7)?
        .set_default("jwt.rotate_refresh_tokens", false)?)
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("security.allowed_origins")
        .try_parsing(true)
}

/// Command-line arguments for configuration override
#[derive(Debug, Default, Parser)]
#[command(name = "linkshelf")]
#[command(about = "Linkshelf API server", long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Server host address
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Database file path
    #[arg(short, long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: u64, // seconds
    pub lookup_timeout_ms: u64,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidServer("host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidServer("port must be greater than 0".to_string()));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidServer("request_timeout must be greater than 0".to_string()));
        }

        if self.lookup_timeout_ms == 0 {
            return Err(ConfigError::InvalidServer("lookup_timeout_ms must be greater than 0".to_string()));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub connection_pool_size: u32,
    pub busy_timeout: u64, // milliseconds
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidDatabase("path cannot be empty".to_string()));
        }

        if self.connection_pool_size == 0 {
            return Err(ConfigError::InvalidDatabase("connection_pool_size must be greater than 0".to_string()));
        }

        if self.busy_timeout == 0 {
            return Err(ConfigError::InvalidDatabase("busy_timeout must be greater than 0".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub log_file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "level must be one of: {:?}",
                valid_levels
            )));
        }

        let valid_formats = ["json", "text"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "format must be one of: {:?}",
                valid_formats
            )));
        }

        let valid_outputs = ["stdout", "file"];
        if !valid_outputs.contains(&self.output.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "output must be one of: {:?}",
                valid_outputs
            )));
        }

        if self.output == "file" && self.log_file.is_none() {
            return Err(ConfigError::InvalidLogging(
                "log_file must be specified when output is 'file'".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

impl SecurityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_origins.is_empty() {
            return Err(ConfigError::InvalidSecurity("allowed_origins cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Signing secrets and lifetimes for the access and refresh token domains
#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub access_expiration_minutes: u64,
    pub refresh_secret: String,
    pub refresh_expiration_minutes: u64,
    pub rotate_refresh_tokens: bool,
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_secret.is_empty() {
            return Err(ConfigError::InvalidJwt("access_secret must be provided".to_string()));
        }

        if self.refresh_secret.is_empty() {
            return Err(ConfigError::InvalidJwt("refresh_secret must be provided".to_string()));
        }

        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::InvalidJwt(
                "access_secret and refresh_secret must differ".to_string(),
            ));
        }

        if self.access_expiration_minutes == 0 {
            return Err(ConfigError::InvalidJwt("access_expiration_minutes must be greater than 0".to_string()));
        }

        if self.refresh_expiration_minutes == 0 {
            return Err(ConfigError::InvalidJwt("refresh_expiration_minutes must be greater than 0".to_string()));
        }

        if self.access_expiration_minutes > MAX_TOKEN_LIFETIME_MINUTES
            || self.refresh_expiration_minutes > MAX_TOKEN_LIFETIME_MINUTES
        {
            return Err(ConfigError::InvalidJwt("token lifetime is too large".to_string()));
        }

        Ok(())
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &"<redacted>")
            .field("access_expiration_minutes", &self.access_expiration_minutes)
            .field("refresh_secret", &"<redacted>")
            .field("refresh_expiration_minutes", &self.refresh_expiration_minutes)
            .field("rotate_refresh_tokens", &self.rotate_refresh_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write temp config");
        file
    }

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            access_secret: "access-secret".to_string(),
            access_expiration_minutes: 60,
            refresh_secret: "refresh-secret".to_string(),
            refresh_expiration_minutes: 120,
            rotate_refresh_tokens: false,
        }
    }

    #[test]
    fn test_file_with_secrets_uses_default_lifetimes() {
        let file = write_config(
            r#"
[jwt]
access_secret = "a-secret"
refresh_secret = "r-secret"
"#,
        );

        let config = Config::from_file(file.path()).expect("config should load");

        assert_eq!(config.jwt.access_expiration_minutes, 60 * 24);
        assert_eq!(config.jwt.refresh_expiration_minutes, 60 * 24 * 7);
        assert!(!config.jwt.rotate_refresh_tokens);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.lookup_timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn test_missing_secrets_rejected() {
        let file = write_config(
            r#"
[server]
port = 9000
"#,
        );

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJwt(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_identical_secrets_rejected() {
        let mut jwt = jwt_config();
        jwt.refresh_secret = jwt.access_secret.clone();

        assert!(matches!(jwt.validate(), Err(ConfigError::InvalidJwt(_))));
    }

    #[test]
    fn test_zero_lifetime_rejected() {
        let mut jwt = jwt_config();
        jwt.access_expiration_minutes = 0;

        assert!(jwt.validate().is_err());
        assert!(jwt_config().validate().is_ok());
    }

    #[test]
    fn test_lifetime_cap() {
        let mut jwt = jwt_config();
        jwt.refresh_expiration_minutes = MAX_TOKEN_LIFETIME_MINUTES;
        assert!(jwt.validate().is_ok());

        jwt.refresh_expiration_minutes = MAX_TOKEN_LIFETIME_MINUTES + 1;
        assert!(matches!(jwt.validate(), Err(ConfigError::InvalidJwt(_))));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", jwt_config());

        assert!(!rendered.contains("access-secret"));
        assert!(!rendered.contains("refresh-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_logging_file_requires_path() {
        let logging = LoggingConfig {
            level: "info".to_string(),
            format: "text".to_string(),
            output: "file".to_string(),
            log_file: None,
        };

        assert!(matches!(logging.validate(), Err(ConfigError::InvalidLogging(_))));
    }
}
