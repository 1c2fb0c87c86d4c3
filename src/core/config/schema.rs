//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Config File
//!
//! Located at (in order of precedence):
//! 1. `$SPACEBRIDGE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/spacebridge/config.toml`
//! 3. `~/.spacebridge/config.toml`
//!
//! # Validation
//!
//! URLs must be http(s). Missing fields are not a file error; they are
//! reported when an account is actually needed.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Parsed config file.
///
/// # Example
///
/// ```toml
/// [source]
/// url = "https://acme.app.spacelift.io"
/// key_id = "01HXYZ..."
/// secret_key = "..."
///
/// [destination]
/// url = "https://acme-new.app.spacelift.io"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub source: AccountSection,
    pub destination: AccountSection,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a URL is not http(s).
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source.validate("source")?;
        self.destination.validate("destination")
    }
}

/// Credentials for one Spacelift account. Every field may be overridden by
/// the environment.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AccountSection {
    pub url: Option<String>,
    pub key_id: Option<String>,
    pub secret_key: Option<String>,
}

impl AccountSection {
    fn validate(&self, table: &str) -> Result<(), ConfigError> {
        if let Some(url) = &self.url {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ConfigError::InvalidValue(format!(
                    "[{}] url must start with http:// or https://, got '{}'",
                    table, url
                )));
            }
        }
        Ok(())
    }
}

// Custom Debug to avoid exposing secret_key
impl std::fmt::Debug for AccountSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSection")
            .field("url", &self.url)
            .field("key_id", &self.key_id)
            .field("has_secret_key", &self.secret_key.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_tables() {
        let cfg: FileConfig = toml::from_str(
            r#"
            [source]
            url = "https://old.app.spacelift.io"
            key_id = "K1"
            secret_key = "S1"

            [destination]
            url = "https://new.app.spacelift.io"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.source.key_id.as_deref(), Some("K1"));
        assert!(cfg.destination.key_id.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_keys() {
        let result: Result<FileConfig, _> = toml::from_str("[source]\ntoken = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_http_url() {
        let cfg: FileConfig = toml::from_str("[source]\nurl = \"ftp://x\"\n").unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("[source] url"));
    }

    #[test]
    fn debug_hides_secret() {
        let section = AccountSection {
            url: None,
            key_id: None,
            secret_key: Some("hunter2".into()),
        };
        assert!(!format!("{:?}", section).contains("hunter2"));
    }
}
