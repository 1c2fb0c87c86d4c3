use serde::{Deserialize, Serialize};

/// A Spacelift policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub space: String,
    /// Policy type, e.g. `PLAN` or `APPROVAL`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Rego engine version, e.g. `REGO_V1`.
    #[serde(default)]
    pub engine_type: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Short human description of a policy type.
pub fn describe_policy_type(kind: &str) -> &'static str {
    match kind {
        "ACCESS" => "Controls who can access stacks and modules",
        "APPROVAL" => "Approves or rejects runs",
        "GIT_PUSH" => "Decides which pushes trigger runs",
        "INITIALIZATION" => "Validates runs before they start",
        "LOGIN" => "Controls who can log in",
        "NOTIFICATION" => "Routes notifications",
        "PLAN" => "Evaluates proposed changes",
        "TASK" => "Validates tasks before they run",
        "TRIGGER" => "Triggers runs on other stacks",
        _ => "Unknown policy type",
    }
}
