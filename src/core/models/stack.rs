use serde::{Deserialize, Serialize};

/// GraphQL typename of a Terraform / OpenTofu vendor configuration.
pub const VENDOR_TERRAFORM: &str = "StackConfigVendorTerraform";

/// GraphQL typename of a Terragrunt vendor configuration.
pub const VENDOR_TERRAGRUNT: &str = "StackConfigVendorTerragrunt";

/// A Spacelift stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub space: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<String>,
    #[serde(default)]
    pub provider: String,
    /// GraphQL typename of the vendor configuration, e.g. `StackConfigVendorTerraform`.
    #[serde(default)]
    pub vendor_type: String,
    #[serde(
        default,
        rename = "repositoryURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub repository_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terraform_version: Option<String>,
    #[serde(default)]
    pub administrative: bool,
    #[serde(default)]
    pub autodeploy: bool,
    #[serde(default)]
    pub autoretry: bool,
    #[serde(default)]
    pub local_preview_enabled: bool,
    #[serde(default)]
    pub protect_from_deletion: bool,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub manages_state_file: bool,
    #[serde(default)]
    pub external_state_access_enabled: bool,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub additional_project_globs: Vec<String>,
    #[serde(default)]
    pub hooks: Hooks,
    #[serde(default)]
    pub attached_contexts: Vec<ContextAttachment>,
    #[serde(default)]
    pub attached_policies: Vec<PolicyAttachment>,
    #[serde(default)]
    pub depends_on: Vec<StackDependency>,
    #[serde(default)]
    pub attached_aws_integrations: Vec<IntegrationAttachment>,
    #[serde(default)]
    pub attached_azure_integrations: Vec<IntegrationAttachment>,
}

impl Stack {
    /// Whether the vendor produces Terraform-format state.
    pub fn is_terraform_family(&self) -> bool {
        matches!(
            self.vendor_type.as_str(),
            VENDOR_TERRAFORM | VENDOR_TERRAGRUNT
        )
    }

    /// Whether Spacelift itself stores this stack's state.
    pub fn has_platform_managed_state(&self) -> bool {
        self.manages_state_file && self.is_terraform_family()
    }

    /// Vendor name for display.
    pub fn friendly_vendor(&self) -> &str {
        friendly_vendor_type(&self.vendor_type)
    }
}

/// Map a vendor typename to the name users see in the Spacelift UI.
pub fn friendly_vendor_type(vendor_type: &str) -> &str {
    match vendor_type {
        VENDOR_TERRAFORM => "Terraform",
        "StackConfigVendorTofu" => "Tofu",
        VENDOR_TERRAGRUNT => "Terragrunt",
        "StackConfigVendorAnsible" => "Ansible",
        "StackConfigVendorKubernetes" => "Kubernetes",
        "StackConfigVendorCloudFormation" => "CloudFormation",
        "StackConfigVendorPulumi" => "Pulumi",
        other => other,
    }
}

/// Lifecycle hook commands shared by stacks and contexts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Hooks {
    pub after_apply: Vec<String>,
    pub before_apply: Vec<String>,
    pub after_init: Vec<String>,
    pub before_init: Vec<String>,
    pub after_plan: Vec<String>,
    pub before_plan: Vec<String>,
    pub after_perform: Vec<String>,
    pub before_perform: Vec<String>,
    pub after_destroy: Vec<String>,
    pub before_destroy: Vec<String>,
    pub after_run: Vec<String>,
}

impl Hooks {
    pub fn is_empty(&self) -> bool {
        [
            &self.after_apply,
            &self.before_apply,
            &self.after_init,
            &self.before_init,
            &self.after_plan,
            &self.before_plan,
            &self.after_perform,
            &self.before_perform,
            &self.after_destroy,
            &self.before_destroy,
            &self.after_run,
        ]
        .iter()
        .all(|h| h.is_empty())
    }
}

/// A context attached to a stack, with its merge priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextAttachment {
    pub id: String,
    pub context_id: String,
    #[serde(default)]
    pub priority: i64,
}

/// A policy attached to a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyAttachment {
    pub id: String,
    pub policy_id: String,
}

/// A run-order dependency on another stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackDependency {
    pub id: String,
    pub depends_on_stack_id: String,
}

/// A cloud integration attached to a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationAttachment {
    pub id: String,
    pub integration_id: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub write: bool,
    /// Azure only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
}
