use serde::{Deserialize, Serialize};

use super::stack::Hooks;

/// A Spacelift context: a reusable bundle of environment variables and
/// mounted files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub space: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub hooks: Hooks,
    #[serde(default)]
    pub config: Vec<ConfigElement>,
    /// Unix timestamp.
    #[serde(default)]
    pub created_at: i64,
    /// Unix timestamp.
    #[serde(default)]
    pub updated_at: i64,
}

impl Context {
    /// Config elements whose values the API never returns.
    pub fn secrets(&self) -> impl Iterator<Item = &ConfigElement> {
        self.config.iter().filter(|c| c.write_only)
    }
}

/// One environment variable or mounted file inside a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigElement {
    pub id: String,
    /// `ENVIRONMENT_VARIABLE` or `FILE_MOUNT`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Always `None` for write-only elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub write_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
