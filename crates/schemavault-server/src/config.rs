//! Server configuration loading from file and environment variables.

use schemavault_db::DbSettings;
use schemavault_store::StoreSettings;
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Object store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Changelog tool settings.
    #[serde(default)]
    pub tool: ToolConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// MySQL server configuration. Host and user are required for any
/// database-backed endpoint; without them those endpoints report
/// "not configured".
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_db_port")]
    pub port: u16,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Maximum pooled connections.
    #[serde(default = "default_connection_limit")]
    pub connection_limit: u32,

    /// Seconds a request waits for a pooled connection.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

/// Object store configuration. Region and bucket are required for dump and
/// restore.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub bucket: Option<String>,

    /// Key prefix for every stored changelog.
    #[serde(default)]
    pub prefix: String,

    /// Endpoint override for S3-compatible stores.
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub force_path_style: bool,
}

/// Changelog tool configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolConfig {
    /// Executable name or path.
    #[serde(default = "default_tool_binary")]
    pub binary: String,

    /// Directory for transient changelog files. Defaults to a `schemavault`
    /// directory under the system temp directory.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "schemavault_pipeline=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

fn default_db_port() -> u16 {
    3306
}

fn default_connection_limit() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn default_tool_binary() -> String {
    "liquibase".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_db_port(),
            user: None,
            password: None,
            connection_limit: default_connection_limit(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("connection_limit", &self.connection_limit)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            binary: default_tool_binary(),
            scratch_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl DatabaseConfig {
    /// Pool settings for [`schemavault_db::PoolManager`].
    pub fn settings(&self) -> DbSettings {
        DbSettings {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            connection_limit: self.connection_limit,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
        }
    }
}

impl StoreConfig {
    /// Client settings for [`schemavault_store::S3ObjectStore`].
    pub fn settings(&self) -> StoreSettings {
        StoreSettings {
            region: self.region.clone(),
            bucket: self.bucket.clone(),
            prefix: self.prefix.clone(),
            endpoint: self.endpoint.clone(),
            force_path_style: self.force_path_style,
        }
    }
}

impl ToolConfig {
    /// The configured scratch directory, or the default under the temp directory.
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("schemavault"))
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment overrides (see [`apply_env_overrides`]).
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Overrides config values from environment variables read through `lookup`.
///
/// - `HOST`, `PORT` override `server.host`, `server.port`
/// - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_CONNECTION_LIMIT`
///   override the `database` section
/// - `AWS_REGION`, `S3_BUCKET_NAME`, `S3_PREFIX`, `S3_ENDPOINT`,
///   `S3_FORCE_PATH_STYLE` override the `store` section
/// - `LIQUIBASE_BIN`, `SCHEMAVAULT_SCRATCH_DIR` override the `tool` section
/// - `LOG_LEVEL`, `LOG_JSON` override the `logging` section
///
/// Values that fail to parse are ignored, as is `0` for `DB_PORT` and
/// `DB_CONNECTION_LIMIT`.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let flag = |value: String| value == "true" || value == "1";

    if let Some(parsed) = lookup("HOST").and_then(|v| v.parse().ok()) {
        config.server.host = parsed;
    }
    if let Some(parsed) = lookup("PORT").and_then(|v| v.parse().ok()) {
        config.server.port = parsed;
    }

    if let Some(host) = lookup("DB_HOST") {
        config.database.host = Some(host);
    }
    if let Some(parsed) = lookup("DB_PORT")
        .and_then(|v| v.parse::<u16>().ok())
        .filter(|&port| port != 0)
    {
        config.database.port = parsed;
    }
    if let Some(user) = lookup("DB_USER") {
        config.database.user = Some(user);
    }
    if let Some(password) = lookup("DB_PASSWORD") {
        config.database.password = Some(password);
    }
    if let Some(parsed) = lookup("DB_CONNECTION_LIMIT")
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|&limit| limit != 0)
    {
        config.database.connection_limit = parsed;
    }

    if let Some(region) = lookup("AWS_REGION") {
        config.store.region = Some(region);
    }
    if let Some(bucket) = lookup("S3_BUCKET_NAME") {
        config.store.bucket = Some(bucket);
    }
    if let Some(prefix) = lookup("S3_PREFIX") {
        config.store.prefix = prefix;
    }
    if let Some(endpoint) = lookup("S3_ENDPOINT") {
        config.store.endpoint = Some(endpoint);
    }
    if let Some(value) = lookup("S3_FORCE_PATH_STYLE") {
        config.store.force_path_style = flag(value);
    }

    if let Some(binary) = lookup("LIQUIBASE_BIN") {
        config.tool.binary = binary;
    }
    if let Some(dir) = lookup("SCHEMAVAULT_SCRATCH_DIR") {
        config.tool.scratch_dir = Some(PathBuf::from(dir));
    }

    if let Some(level) = lookup("LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(value) = lookup("LOG_JSON") {
        config.logging.json = flag(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.connection_limit, 10);
        assert_eq!(config.store.prefix, "");
        assert_eq!(config.tool.binary, "liquibase");
        assert!(config.database.settings().target().is_none());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config: Config = toml::from_str(
            r#"
            [database]
            host = "file-host"
            user = "file-user"

            [store]
            prefix = "from-file"
            "#,
        )
        .unwrap();

        apply_env_overrides(
            &mut config,
            env(&[
                ("PORT", "8080"),
                ("DB_HOST", "env-host"),
                ("DB_PORT", "3307"),
                ("DB_PASSWORD", "pw"),
                ("DB_CONNECTION_LIMIT", "4"),
                ("AWS_REGION", "eu-west-1"),
                ("S3_BUCKET_NAME", "backups"),
                ("S3_PREFIX", "nightly"),
                ("S3_FORCE_PATH_STYLE", "true"),
                ("LIQUIBASE_BIN", "/opt/liquibase/liquibase"),
                ("SCHEMAVAULT_SCRATCH_DIR", "/var/tmp/sv"),
            ]),
        );

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.host.as_deref(), Some("env-host"));
        assert_eq!(config.database.user.as_deref(), Some("file-user"));
        assert_eq!(config.database.port, 3307);
        assert_eq!(config.database.connection_limit, 4);
        let store = config.store.settings();
        assert_eq!(store.region.as_deref(), Some("eu-west-1"));
        assert_eq!(store.bucket.as_deref(), Some("backups"));
        assert_eq!(store.prefix, "nightly");
        assert!(store.force_path_style);
        assert_eq!(config.tool.binary, "/opt/liquibase/liquibase");
        assert_eq!(config.tool.scratch_dir(), PathBuf::from("/var/tmp/sv"));

        let target = config.database.settings().target().unwrap();
        assert_eq!(target.host, "env-host");
        assert_eq!(target.password.as_deref(), Some("pw"));
    }

    #[test]
    fn unparseable_numbers_keep_previous_values() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[("PORT", "http"), ("DB_PORT", "-1"), ("DB_CONNECTION_LIMIT", "many")]),
        );
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.connection_limit, 10);
    }

    #[test]
    fn zero_port_and_limit_keep_defaults() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[("DB_PORT", "0"), ("DB_CONNECTION_LIMIT", "0")]),
        );
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.connection_limit, 10);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(load_config(path.to_str()).is_ok());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(matches!(
            load_config(path.to_str()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = DatabaseConfig {
            password: Some("hunter2".to_string()),
            ..DatabaseConfig::default()
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
