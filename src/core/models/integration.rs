use serde::{Deserialize, Serialize};

/// An AWS IAM role integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsIntegration {
    pub id: String,
    pub name: String,
    pub role_arn: String,
    #[serde(default)]
    pub duration_seconds: i64,
    #[serde(default)]
    pub generate_credentials_in_worker: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub space: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// An Azure AD application integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureIntegration {
    pub id: String,
    pub name: String,
    pub tenant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_subscription_id: Option<String>,
    #[serde(default)]
    pub application_id: String,
    #[serde(default)]
    pub display_name: String,
    pub space: String,
    #[serde(default)]
    pub labels: Vec<String>,
}
