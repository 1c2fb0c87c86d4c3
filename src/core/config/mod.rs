//! core::config
//!
//! Credential configuration for the source and destination accounts.
//!
//! # Overview
//!
//! SpaceBridge talks to two Spacelift accounts. Each needs a base URL, an
//! API key id and an API key secret.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Config file (see [`schema`])
//! 2. `.env` file (`--env-file`, or `./.env` when present)
//! 3. Process environment
//!
//! # Environment Variables
//!
//! - `SOURCE_SPACELIFT_URL`, `SOURCE_SPACELIFT_KEY_ID`, `SOURCE_SPACELIFT_SECRET_KEY`
//! - `DESTINATION_SPACELIFT_URL`, `DESTINATION_SPACELIFT_KEY_ID`,
//!   `DESTINATION_SPACELIFT_SECRET_KEY`
//!
//! Loading never fails on missing credentials. [`Config::source`] and
//! [`Config::destination`] validate the account they return, so a command
//! fails before any network call only when it needs that account.
//!
//! # Example
//!
//! ```no_run
//! use spacebridge::core::config::Config;
//!
//! let loaded = Config::load(None).unwrap();
//! let source = loaded.config.source().unwrap();
//! println!("Source: {}", source.url);
//! ```

pub mod schema;

pub use schema::{AccountSection, FileConfig};

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Env var pointing at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SPACEBRIDGE_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to load env file '{path}': {message}")]
    EnvFileError { path: PathBuf, message: String },

    #[error("{account} configuration error: spacelift {field} is required (set {env_var})")]
    MissingField {
        account: Account,
        field: &'static str,
        env_var: String,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Which side of the migration an account is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Account {
    Source,
    Destination,
}

impl Account {
    /// Prefix of this account's environment variables.
    pub fn env_prefix(self) -> &'static str {
        match self {
            Account::Source => "SOURCE_SPACELIFT",
            Account::Destination => "DESTINATION_SPACELIFT",
        }
    }

    fn env_var(self, suffix: &str) -> String {
        format!("{}_{}", self.env_prefix(), suffix)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Account::Source => write!(f, "source"),
            Account::Destination => write!(f, "destination"),
        }
    }
}

/// Validated credentials for one account.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountConfig {
    /// Base URL without a trailing slash, e.g. `https://acme.app.spacelift.io`.
    pub url: String,
    pub key_id: String,
    pub secret_key: String,
}

// Custom Debug to avoid exposing secret_key
impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("url", &self.url)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: Config,
    /// Config file that was read, if any.
    pub config_path: Option<PathBuf>,
    /// `.env` file that was read, if any.
    pub env_file: Option<PathBuf>,
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    source: AccountSection,
    destination: AccountSection,
}

impl Config {
    /// Load configuration from the config file, `.env` file and environment.
    ///
    /// `env_file` is an explicit `.env` path; it must exist. Without it,
    /// `./.env` is read when present.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed.
    /// Missing credentials are not an error here.
    pub fn load(env_file: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let (file, config_path) = Self::load_file()?;
        file.validate()?;

        let (dotenv, env_file) = Self::load_env_file(env_file)?;

        let mut vars = dotenv;
        for account in [Account::Source, Account::Destination] {
            for suffix in ["URL", "KEY_ID", "SECRET_KEY"] {
                let key = account.env_var(suffix);
                if let Ok(value) = std::env::var(&key) {
                    vars.insert(key, value);
                }
            }
        }

        Ok(ConfigLoadResult {
            config: Self::resolve(file, &vars),
            config_path,
            env_file,
        })
    }

    /// Overlay environment values on a parsed config file.
    ///
    /// Empty values in `vars` are ignored.
    pub fn resolve(file: FileConfig, vars: &HashMap<String, String>) -> Self {
        let mut config = Config {
            source: file.source,
            destination: file.destination,
        };
        overlay(&mut config.source, Account::Source, vars);
        overlay(&mut config.destination, Account::Destination, vars);
        config
    }

    /// Validated source account credentials.
    pub fn source(&self) -> Result<AccountConfig, ConfigError> {
        validate(&self.source, Account::Source)
    }

    /// Validated destination account credentials.
    pub fn destination(&self) -> Result<AccountConfig, ConfigError> {
        validate(&self.destination, Account::Destination)
    }

    /// Whether all destination credentials are present.
    pub fn has_destination(&self) -> bool {
        self.destination().is_ok()
    }

    fn load_file() -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
        // 1. Check $SPACEBRIDGE_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok((Self::read_file_config(&path)?, Some(path)));
            }
        }

        // 2. Check $XDG_CONFIG_HOME/spacebridge/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("spacebridge/config.toml");
            if path.exists() {
                return Ok((Self::read_file_config(&path)?, Some(path)));
            }
        }

        // 3. Check ~/.spacebridge/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".spacebridge/config.toml");
            if path.exists() {
                return Ok((Self::read_file_config(&path)?, Some(path)));
            }
        }

        Ok((FileConfig::default(), None))
    }

    /// Read and parse a config file.
    pub fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn load_env_file(
        explicit: Option<&Path>,
    ) -> Result<(HashMap<String, String>, Option<PathBuf>), ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(".env");
                if !default.exists() {
                    return Ok((HashMap::new(), None));
                }
                default
            }
        };

        let vars = read_env_file(&path)?;
        Ok((vars, Some(path)))
    }
}

/// Parse a `.env` file into a map. Later lines win.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let env_error = |e: dotenvy::Error| ConfigError::EnvFileError {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(env_error)? {
        let (key, value) = item.map_err(env_error)?;
        vars.insert(key, value);
    }
    Ok(vars)
}

fn overlay(section: &mut AccountSection, account: Account, vars: &HashMap<String, String>) {
    let get = |suffix: &str| {
        vars.get(&account.env_var(suffix))
            .filter(|v| !v.is_empty())
            .cloned()
    };
    if let Some(url) = get("URL") {
        section.url = Some(url);
    }
    if let Some(key_id) = get("KEY_ID") {
        section.key_id = Some(key_id);
    }
    if let Some(secret_key) = get("SECRET_KEY") {
        section.secret_key = Some(secret_key);
    }
}

fn validate(section: &AccountSection, account: Account) -> Result<AccountConfig, ConfigError> {
    let require = |value: &Option<String>, field: &'static str, suffix: &str| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(String::from)
            .ok_or_else(|| ConfigError::MissingField {
                account,
                field,
                env_var: account.env_var(suffix),
            })
    };

    let url = require(&section.url, "URL", "URL")?;
    let key_id = require(&section.key_id, "API key ID", "KEY_ID")?;
    let secret_key = require(&section.secret_key, "API secret key", "SECRET_KEY")?;

    Ok(AccountConfig {
        url: url.trim_end_matches('/').to_string(),
        key_id,
        secret_key,
    })
}
