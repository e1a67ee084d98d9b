use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::clock::Clock;
use crate::identity::{ApiKeyTable, IdentityStrategy};
use crate::store::{DocumentStore, UserId};

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// How the server maps requests to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMode {
    Fixed,
    Cookie,
    ApiKey,
}

impl FromStr for IdentityMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(IdentityMode::Fixed),
            "cookie" => Ok(IdentityMode::Cookie),
            "api_key" | "apikey" => Ok(IdentityMode::ApiKey),
            other => Err(ConfigError::InvalidValue {
                key: "server.identity",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for IdentityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityMode::Fixed => write!(f, "fixed"),
            IdentityMode::Cookie => write!(f, "cookie"),
            IdentityMode::ApiKey => write!(f, "api_key"),
        }
    }
}

/// API key entry in config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyEntry {
    pub key: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub port: ConfigValue<u16>,
    pub identity: ConfigValue<IdentityMode>,
    pub cookie_name: String,
    pub fixed_user: String,
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding per-user documents and backups
    pub data_dir: ConfigValue<PathBuf>,
    /// Single-tenant document used to seed new users
    pub legacy_path: ConfigValue<Option<PathBuf>>,
    /// User the CLI acts as
    pub user: ConfigValue<String>,
    pub server: ServerConfig,
    #[serde(skip_serializing)]
    pub api_keys: Vec<ApiKeyEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone_offset_minutes: Option<i32>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ServerFile {
    port: Option<u16>,
    identity: Option<IdentityMode>,
    cookie_name: Option<String>,
    fixed_user: Option<String>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    legacy_path: Option<PathBuf>,
    user: Option<String>,
    server: ServerFile,
    api_keys: Vec<ApiKeyEntry>,
    timezone_offset_minutes: Option<i32>,
}

/// Resolves relative paths against the config file's directory.
fn resolve_relative(config_path: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        config_path.parent().map(|p| p.join(&path)).unwrap_or(path)
    } else {
        path
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Like [`Config::load`], reading environment variables through `env`.
    pub fn load_with_env<F>(config_path: Option<PathBuf>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut legacy_path = ConfigValue::new(None, ConfigSource::Default);
        let mut user = ConfigValue::new("default".to_string(), ConfigSource::Default);
        let mut port = ConfigValue::new(8080, ConfigSource::Default);
        let mut identity = ConfigValue::new(IdentityMode::Cookie, ConfigSource::Default);
        let mut cookie_name = "leanfit_uid".to_string();
        let mut fixed_user = "default".to_string();
        let mut api_keys = Vec::new();
        let mut timezone_offset_minutes = None;
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file.data_dir {
                data_dir = ConfigValue::new(resolve_relative(&path, dir), ConfigSource::File);
            }
            if let Some(legacy) = file.legacy_path {
                legacy_path =
                    ConfigValue::new(Some(resolve_relative(&path, legacy)), ConfigSource::File);
            }
            if let Some(u) = file.user {
                user = ConfigValue::new(u, ConfigSource::File);
            }
            if let Some(p) = file.server.port {
                port = ConfigValue::new(p, ConfigSource::File);
            }
            if let Some(mode) = file.server.identity {
                identity = ConfigValue::new(mode, ConfigSource::File);
            }
            if let Some(name) = file.server.cookie_name {
                cookie_name = name;
            }
            if let Some(u) = file.server.fixed_user {
                fixed_user = u;
            }
            api_keys = file.api_keys;
            timezone_offset_minutes = file.timezone_offset_minutes;
        }

        // Apply environment variable overrides
        if let Some(dir) = env("LEANFIT_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Some(legacy) = env("LEANFIT_LEGACY_PATH") {
            legacy_path = ConfigValue::new(Some(PathBuf::from(legacy)), ConfigSource::Environment);
        }
        if let Some(u) = env("LEANFIT_USER") {
            user = ConfigValue::new(u, ConfigSource::Environment);
        }
        if let Some(p) = env("LEANFIT_PORT") {
            let parsed = p.parse().map_err(|_| ConfigError::InvalidValue {
                key: "LEANFIT_PORT",
                value: p.clone(),
            })?;
            port = ConfigValue::new(parsed, ConfigSource::Environment);
        }
        if let Some(mode) = env("LEANFIT_IDENTITY") {
            identity = ConfigValue::new(mode.parse()?, ConfigSource::Environment);
        }

        Ok(Self {
            data_dir,
            legacy_path,
            user,
            server: ServerConfig {
                port,
                identity,
                cookie_name,
                fixed_user,
            },
            api_keys,
            timezone_offset_minutes,
            config_file,
        })
    }

    /// Builds the document store described by this configuration.
    pub fn document_store(&self) -> DocumentStore {
        let store = DocumentStore::new(self.data_dir.value.clone());
        match &self.legacy_path.value {
            Some(legacy) => store.with_legacy_path(legacy.clone()),
            None => store,
        }
    }

    /// The user the CLI acts as.
    pub fn cli_user(&self) -> Result<UserId, ConfigError> {
        parse_user("user", &self.user.value)
    }

    pub fn clock(&self) -> Clock {
        Clock::from_offset_minutes(self.timezone_offset_minutes)
    }

    /// Builds the server's identity strategy.
    pub fn identity_strategy(&self) -> Result<IdentityStrategy, ConfigError> {
        match self.server.identity.value {
            IdentityMode::Fixed => Ok(IdentityStrategy::Fixed(parse_user(
                "server.fixed_user",
                &self.server.fixed_user,
            )?)),
            IdentityMode::Cookie => Ok(IdentityStrategy::Cookie {
                name: self.server.cookie_name.clone(),
            }),
            IdentityMode::ApiKey => {
                let mut keys = ApiKeyTable::new();
                for entry in &self.api_keys {
                    keys.insert(entry.key.clone(), parse_user("api_keys.user_id", &entry.user_id)?);
                }
                Ok(IdentityStrategy::ApiKey(keys))
            }
        }
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/leanfit/
    /// - macOS: ~/Library/Application Support/leanfit/
    /// - Windows: %APPDATA%/leanfit/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leanfit")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/leanfit/
    /// - macOS: ~/Library/Application Support/leanfit/
    /// - Windows: %APPDATA%/leanfit/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leanfit")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn parse_user(key: &'static str, raw: &str) -> Result<UserId, ConfigError> {
    UserId::parse(raw).map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {}", .0.display(), .1)]
    ReadError(PathBuf, std::io::Error),

    #[error("Failed to parse config file '{}': {}", .0.display(), .1)]
    ParseError(PathBuf, serde_yaml::Error),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load_with_env(Some(config_path), no_env).unwrap();
        assert!(config.data_dir.value.ends_with("leanfit"));
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert_eq!(config.user.value, "default");
        assert_eq!(config.server.port.value, 8080);
        assert_eq!(config.server.identity.value, IdentityMode::Cookie);
        assert_eq!(config.server.cookie_name, "leanfit_uid");
        assert_eq!(config.legacy_path.value, None);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /srv/leanfit").unwrap();
        writeln!(file, "legacy_path: legacy.json").unwrap();
        writeln!(file, "user: alice").unwrap();
        writeln!(file, "server:").unwrap();
        writeln!(file, "  port: 9000").unwrap();
        writeln!(file, "  identity: api_key").unwrap();
        writeln!(file, "api_keys:").unwrap();
        writeln!(file, "  - key: secret").unwrap();
        writeln!(file, "    user_id: alice").unwrap();

        let config = Config::load_with_env(Some(config_path.clone()), no_env).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/srv/leanfit"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(
            config.legacy_path.value,
            Some(temp_dir.path().join("legacy.json"))
        );
        assert_eq!(config.user.value, "alice");
        assert_eq!(config.server.port.value, 9000);
        assert_eq!(config.server.identity.value, IdentityMode::ApiKey);
        assert_eq!(config.config_file, Some(config_path));

        match config.identity_strategy().unwrap() {
            IdentityStrategy::ApiKey(keys) => {
                assert_eq!(keys.validate("secret").unwrap().as_str(), "alice")
            }
            other => panic!("unexpected strategy: {:?}", other),
        }
    }

    #[test]
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "user: fromfile").unwrap();

        let env: HashMap<&str, &str> = [
            ("LEANFIT_USER", "fromenv"),
            ("LEANFIT_PORT", "3000"),
            ("LEANFIT_IDENTITY", "fixed"),
        ]
        .into_iter()
        .collect();

        let config = Config::load_with_env(Some(config_path), |k| {
            env.get(k).map(|v| v.to_string())
        })
        .unwrap();
        assert_eq!(config.user.value, "fromenv");
        assert_eq!(config.user.source, ConfigSource::Environment);
        assert_eq!(config.server.port.value, 3000);
        assert_eq!(config.server.identity.value, IdentityMode::Fixed);
    }

    #[test]
    fn test_invalid_env_values() {
        let temp_dir = tempdir().unwrap();
        let path = Some(temp_dir.path().join("none.yaml"));

        let err = Config::load_with_env(path.clone(), |k| {
            (k == "LEANFIT_PORT").then(|| "eighty".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "LEANFIT_PORT", .. }));

        let err = Config::load_with_env(path, |k| {
            (k == "LEANFIT_IDENTITY").then(|| "oauth".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("server.identity"));
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "server: [unclosed").unwrap();

        let result = Config::load_with_env(Some(config_path), no_env);
        assert!(matches!(result, Err(ConfigError::ParseError(_, _))));
    }

    #[test]
    fn test_invalid_cli_user() {
        let temp_dir = tempdir().unwrap();
        let config = Config::load_with_env(Some(temp_dir.path().join("none.yaml")), |k| {
            (k == "LEANFIT_USER").then(|| "../etc".to_string())
        })
        .unwrap();
        assert!(config.cli_user().is_err());
    }
}
