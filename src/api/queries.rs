//! api::queries
//!
//! GraphQL documents and their response shapes.
//!
//! # Design
//!
//! Wire structs mirror the GraphQL selection sets exactly and convert 1:1
//! into [`crate::core::models`]. Nullable lists become empty vectors, and
//! nullable scalars stay `None`.

use serde::{Deserialize, Deserializer};

use super::traits::{AttachedStack, StateUpload};
use crate::core::models::{
    AwsIntegration, AzureIntegration, ConfigElement, Context, ContextAttachment, Hooks, Policy,
    PolicyAttachment, Space, Stack, StackDependency,
};

/// Deserialize `null` as the type's default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

const HOOKS_SELECTION: &str = "hooks { afterApply beforeApply afterInit beforeInit afterPlan beforePlan afterPerform beforePerform afterDestroy beforeDestroy afterRun }";

pub const SPACES_QUERY: &str = r#"query Spaces {
  spaces {
    id
    name
    description
    parentSpace
    inheritEntities
    labels
  }
}"#;

/// Stacks query. `{HOOKS}` is replaced by [`stacks_query`].
const STACKS_QUERY_TEMPLATE: &str = r#"query Stacks {
  stacks {
    id
    name
    description
    space
    branch
    repository
    namespace
    projectRoot
    provider
    repositoryURL
    runnerImage
    terraformVersion
    administrative
    autodeploy
    autoretry
    localPreviewEnabled
    protectFromDeletion
    isDisabled
    managesStateFile
    labels
    additionalProjectGlobs
    vendorConfig {
      __typename
      ... on StackConfigVendorTerraform {
        externalStateAccessEnabled
      }
    }
    {HOOKS}
    attachedContexts { id contextId priority }
    attachedPolicies { id policyId }
    dependsOn { id dependsOnStack { id } }
  }
}"#;

const CONTEXTS_QUERY_TEMPLATE: &str = r#"query Contexts {
  contexts {
    id
    name
    description
    space
    labels
    createdAt
    updatedAt
    {HOOKS}
    config { id type value writeOnly description }
  }
}"#;

pub const POLICIES_QUERY: &str = r#"query Policies {
  policies {
    id
    name
    description
    space
    type
    engineType
    body
    labels
    createdAt
    updatedAt
  }
}"#;

pub const AWS_INTEGRATIONS_QUERY: &str = r#"query AwsIntegrations {
  awsIntegrations {
    id
    name
    roleArn
    durationSeconds
    generateCredentialsInWorker
    externalId
    space
    labels
  }
}"#;

pub const AZURE_INTEGRATIONS_QUERY: &str = r#"query AzureIntegrations {
  azureIntegrations {
    id
    name
    tenantId
    defaultSubscriptionId
    applicationId
    displayName
    space
    labels
  }
}"#;

pub const AWS_ATTACHMENTS_QUERY: &str = r#"query AwsIntegrationAttachments($id: ID!) {
  awsIntegration(id: $id) {
    attachedStacks { id stackId isModule read write }
  }
}"#;

pub const AZURE_ATTACHMENTS_QUERY: &str = r#"query AzureIntegrationAttachments($id: ID!) {
  azureIntegration(id: $id) {
    attachedStacks { id stackId isModule read write subscriptionId }
  }
}"#;

pub const STATE_DOWNLOAD_URL_MUTATION: &str = r#"mutation GetStateDownloadURL($stackId: ID!) {
  stateDownloadUrl(input: { stackId: $stackId }) {
    url
  }
}"#;

pub const STATE_UPLOAD_URL_MUTATION: &str = r#"mutation GetStateUploadURL {
  stateUploadUrl {
    url
    objectId
  }
}"#;

pub const LOCK_STACK_MUTATION: &str = r#"mutation LockStack($id: ID!) {
  stackLock(id: $id) { id }
}"#;

pub const UNLOCK_STACK_MUTATION: &str = r#"mutation UnlockStack($id: ID!) {
  stackUnlock(id: $id) { id }
}"#;

pub const IMPORT_STATE_MUTATION: &str = r#"mutation ImportManagedState($stackId: ID!, $state: String!) {
  stackManagedStateImport(stackId: $stackId, state: $state)
}"#;

/// `stackUpdate` needs every required `StackInput` field, so the current
/// values are sent back alongside the change.
pub const ENABLE_EXTERNAL_STATE_MUTATION: &str = r#"mutation EnableExternalState(
  $id: ID!,
  $administrative: Boolean!,
  $branch: String!,
  $name: String!,
  $repository: String!
) {
  stackUpdate(id: $id, input: {
    administrative: $administrative
    branch: $branch
    name: $name
    repository: $repository
    vendorConfig: { terraform: { externalStateAccessEnabled: true } }
  }) { id }
}"#;

pub const ENABLE_STACK_MUTATION: &str = r#"mutation EnableStack(
  $id: ID!,
  $administrative: Boolean!,
  $branch: String!,
  $name: String!,
  $repository: String!
) {
  stackUpdate(id: $id, input: {
    administrative: $administrative
    branch: $branch
    name: $name
    repository: $repository
    isDisabled: false
  }) { id }
}"#;

pub fn stacks_query() -> String {
    STACKS_QUERY_TEMPLATE.replace("{HOOKS}", HOOKS_SELECTION)
}

pub fn contexts_query() -> String {
    CONTEXTS_QUERY_TEMPLATE.replace("{HOOKS}", HOOKS_SELECTION)
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct SpacesData {
    #[serde(deserialize_with = "nullable")]
    pub spaces: Vec<WireSpace>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSpace {
    id: String,
    name: String,
    #[serde(default, deserialize_with = "nullable")]
    description: String,
    #[serde(default)]
    parent_space: Option<String>,
    #[serde(default)]
    inherit_entities: bool,
    #[serde(default, deserialize_with = "nullable")]
    labels: Vec<String>,
}

impl From<WireSpace> for Space {
    fn from(w: WireSpace) -> Self {
        Space {
            id: w.id,
            name: w.name,
            description: w.description,
            parent_space: w.parent_space,
            inherit_entities: w.inherit_entities,
            labels: w.labels,
        }
    }
}

#[derive(Deserialize)]
pub struct StacksData {
    #[serde(deserialize_with = "nullable")]
    pub stacks: Vec<WireStack>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStack {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    space: String,
    #[serde(default, deserialize_with = "nullable")]
    branch: String,
    #[serde(default, deserialize_with = "nullable")]
    repository: String,
    #[serde(default, deserialize_with = "nullable")]
    namespace: String,
    #[serde(default)]
    project_root: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    provider: String,
    #[serde(default, rename = "repositoryURL")]
    repository_url: Option<String>,
    #[serde(default)]
    runner_image: Option<String>,
    #[serde(default)]
    terraform_version: Option<String>,
    #[serde(default)]
    administrative: bool,
    #[serde(default)]
    autodeploy: bool,
    #[serde(default)]
    autoretry: bool,
    #[serde(default)]
    local_preview_enabled: bool,
    #[serde(default)]
    protect_from_deletion: bool,
    #[serde(default)]
    is_disabled: bool,
    #[serde(default)]
    manages_state_file: bool,
    #[serde(default, deserialize_with = "nullable")]
    labels: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    additional_project_globs: Vec<String>,
    #[serde(default)]
    vendor_config: Option<WireVendorConfig>,
    #[serde(default, deserialize_with = "nullable")]
    hooks: WireHooks,
    #[serde(default, deserialize_with = "nullable")]
    attached_contexts: Vec<WireContextAttachment>,
    #[serde(default, deserialize_with = "nullable")]
    attached_policies: Vec<WirePolicyAttachment>,
    #[serde(default, deserialize_with = "nullable")]
    depends_on: Vec<WireDependency>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireVendorConfig {
    #[serde(rename = "__typename", default)]
    typename: String,
    #[serde(default)]
    external_state_access_enabled: Option<bool>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireHooks {
    #[serde(default, deserialize_with = "nullable")]
    after_apply: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    before_apply: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    after_init: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    before_init: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    after_plan: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    before_plan: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    after_perform: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    before_perform: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    after_destroy: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    before_destroy: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    after_run: Vec<String>,
}

impl From<WireHooks> for Hooks {
    fn from(w: WireHooks) -> Self {
        Hooks {
            after_apply: w.after_apply,
            before_apply: w.before_apply,
            after_init: w.after_init,
            before_init: w.before_init,
            after_plan: w.after_plan,
            before_plan: w.before_plan,
            after_perform: w.after_perform,
            before_perform: w.before_perform,
            after_destroy: w.after_destroy,
            before_destroy: w.before_destroy,
            after_run: w.after_run,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireContextAttachment {
    id: String,
    context_id: String,
    #[serde(default)]
    priority: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePolicyAttachment {
    id: String,
    policy_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDependency {
    id: String,
    depends_on_stack: WireId,
}

#[derive(Deserialize)]
struct WireId {
    id: String,
}

impl From<WireStack> for Stack {
    fn from(w: WireStack) -> Self {
        let (vendor_type, external_state_access_enabled) = match w.vendor_config {
            Some(v) => (v.typename, v.external_state_access_enabled.unwrap_or(false)),
            None => (String::new(), false),
        };

        Stack {
            id: w.id,
            name: w.name,
            description: w.description,
            space: w.space,
            branch: w.branch,
            repository: w.repository,
            namespace: w.namespace,
            project_root: w.project_root,
            provider: w.provider,
            vendor_type,
            repository_url: w.repository_url,
            runner_image: w.runner_image,
            terraform_version: w.terraform_version,
            administrative: w.administrative,
            autodeploy: w.autodeploy,
            autoretry: w.autoretry,
            local_preview_enabled: w.local_preview_enabled,
            protect_from_deletion: w.protect_from_deletion,
            is_disabled: w.is_disabled,
            manages_state_file: w.manages_state_file,
            external_state_access_enabled,
            labels: w.labels,
            additional_project_globs: w.additional_project_globs,
            hooks: w.hooks.into(),
            attached_contexts: w
                .attached_contexts
                .into_iter()
                .map(|a| ContextAttachment {
                    id: a.id,
                    context_id: a.context_id,
                    priority: a.priority,
                })
                .collect(),
            attached_policies: w
                .attached_policies
                .into_iter()
                .map(|a| PolicyAttachment {
                    id: a.id,
                    policy_id: a.policy_id,
                })
                .collect(),
            depends_on: w
                .depends_on
                .into_iter()
                .map(|d| StackDependency {
                    id: d.id,
                    depends_on_stack_id: d.depends_on_stack.id,
                })
                .collect(),
            attached_aws_integrations: Vec::new(),
            attached_azure_integrations: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
pub struct ContextsData {
    #[serde(deserialize_with = "nullable")]
    pub contexts: Vec<WireContext>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireContext {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    space: String,
    #[serde(default, deserialize_with = "nullable")]
    labels: Vec<String>,
    #[serde(default)]
    created_at: i64,
    #[serde(default)]
    updated_at: i64,
    #[serde(default, deserialize_with = "nullable")]
    hooks: WireHooks,
    #[serde(default, deserialize_with = "nullable")]
    config: Vec<WireConfigElement>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireConfigElement {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    write_only: bool,
    #[serde(default)]
    description: Option<String>,
}

impl From<WireContext> for Context {
    fn from(w: WireContext) -> Self {
        Context {
            id: w.id,
            name: w.name,
            description: w.description,
            space: w.space,
            labels: w.labels,
            hooks: w.hooks.into(),
            config: w
                .config
                .into_iter()
                .map(|c| ConfigElement {
                    id: c.id,
                    kind: c.kind,
                    // Write-only values are never carried, even if returned.
                    value: if c.write_only { None } else { c.value },
                    write_only: c.write_only,
                    description: c.description,
                })
                .collect(),
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct PoliciesData {
    #[serde(deserialize_with = "nullable")]
    pub policies: Vec<WirePolicy>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePolicy {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    space: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, deserialize_with = "nullable")]
    engine_type: String,
    #[serde(default, deserialize_with = "nullable")]
    body: String,
    #[serde(default, deserialize_with = "nullable")]
    labels: Vec<String>,
    #[serde(default)]
    created_at: i64,
    #[serde(default)]
    updated_at: i64,
}

impl From<WirePolicy> for Policy {
    fn from(w: WirePolicy) -> Self {
        Policy {
            id: w.id,
            name: w.name,
            description: w.description,
            space: w.space,
            kind: w.kind,
            engine_type: w.engine_type,
            body: w.body,
            labels: w.labels,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsIntegrationsData {
    #[serde(deserialize_with = "nullable")]
    pub aws_integrations: Vec<WireAwsIntegration>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAwsIntegration {
    id: String,
    name: String,
    role_arn: String,
    #[serde(default)]
    duration_seconds: i64,
    #[serde(default)]
    generate_credentials_in_worker: bool,
    #[serde(default)]
    external_id: Option<String>,
    space: String,
    #[serde(default, deserialize_with = "nullable")]
    labels: Vec<String>,
}

impl From<WireAwsIntegration> for AwsIntegration {
    fn from(w: WireAwsIntegration) -> Self {
        AwsIntegration {
            id: w.id,
            name: w.name,
            role_arn: w.role_arn,
            duration_seconds: w.duration_seconds,
            generate_credentials_in_worker: w.generate_credentials_in_worker,
            external_id: w.external_id,
            space: w.space,
            labels: w.labels,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureIntegrationsData {
    #[serde(deserialize_with = "nullable")]
    pub azure_integrations: Vec<WireAzureIntegration>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAzureIntegration {
    id: String,
    name: String,
    tenant_id: String,
    #[serde(default)]
    default_subscription_id: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    application_id: String,
    #[serde(default, deserialize_with = "nullable")]
    display_name: String,
    space: String,
    #[serde(default, deserialize_with = "nullable")]
    labels: Vec<String>,
}

impl From<WireAzureIntegration> for AzureIntegration {
    fn from(w: WireAzureIntegration) -> Self {
        AzureIntegration {
            id: w.id,
            name: w.name,
            tenant_id: w.tenant_id,
            default_subscription_id: w.default_subscription_id,
            application_id: w.application_id,
            display_name: w.display_name,
            space: w.space,
            labels: w.labels,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsAttachmentsData {
    pub aws_integration: Option<WireIntegrationAttachments>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureAttachmentsData {
    pub azure_integration: Option<WireIntegrationAttachments>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireIntegrationAttachments {
    #[serde(default, deserialize_with = "nullable")]
    pub attached_stacks: Vec<WireAttachedStack>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAttachedStack {
    id: String,
    stack_id: String,
    #[serde(default)]
    is_module: bool,
    #[serde(default)]
    read: bool,
    #[serde(default)]
    write: bool,
    #[serde(default)]
    subscription_id: Option<String>,
}

impl From<WireAttachedStack> for AttachedStack {
    fn from(w: WireAttachedStack) -> Self {
        AttachedStack {
            id: w.id,
            stack_id: w.stack_id,
            is_module: w.is_module,
            read: w.read,
            write: w.write,
            subscription_id: w.subscription_id,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDownloadUrlData {
    pub state_download_url: WireUrl,
}

#[derive(Deserialize)]
pub struct WireUrl {
    pub url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateUploadUrlData {
    pub state_upload_url: WireUpload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireUpload {
    url: String,
    object_id: String,
}

impl From<WireUpload> for StateUpload {
    fn from(w: WireUpload) -> Self {
        StateUpload {
            url: w.url,
            object_id: w.object_id,
        }
    }
}
