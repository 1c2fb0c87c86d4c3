use serde::{Deserialize, Serialize};

/// Id of the account's root space. It never has a parent.
pub const ROOT_SPACE_ID: &str = "root";

/// A Spacelift space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Parent space id. `None` or empty means this is a root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_space: Option<String>,
    #[serde(default)]
    pub inherit_entities: bool,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Space {
    /// Declared parent id, treating an empty string as absent.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_space.as_deref().filter(|p| !p.is_empty())
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_SPACE_ID
    }
}
