//! api::mock
//!
//! In-memory Spacelift account for deterministic testing.
//!
//! # Design
//!
//! The mock serves resources from memory, records every call as a
//! [`MockOperation`], and can be told to fail or stall specific calls,
//! including calls for one stack only. Mutations update the stored stacks
//! so follow-up listings see the change.
//!
//! # Example
//!
//! ```
//! use spacebridge::api::mock::{FailOn, MockApi};
//! use spacebridge::api::{ApiError, SpaceliftApi};
//!
//! # tokio_test::block_on(async {
//! let api = MockApi::new()
//!     .fail_on(FailOn::Lock("vpc".into()), ApiError::GraphQl("stack is locked".into()));
//!
//! assert!(api.lock_stack("vpc").await.is_err());
//! assert!(api.lock_stack("dns").await.is_ok());
//! assert_eq!(api.operations().len(), 2);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{ApiError, AttachedStack, IntegrationKind, SpaceliftApi, StateUpload};
use crate::core::models::{AwsIntegration, AzureIntegration, Context, Policy, Space, Stack};

/// Mock account for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping. Clones share state.
#[derive(Debug, Clone)]
pub struct MockApi {
    base_url: String,
    inner: Arc<Mutex<MockApiInner>>,
}

#[derive(Debug)]
struct MockApiInner {
    spaces: Vec<Space>,
    stacks: Vec<Stack>,
    contexts: Vec<Context>,
    policies: Vec<Policy>,
    aws_integrations: Vec<AwsIntegration>,
    azure_integrations: Vec<AzureIntegration>,
    attachments: HashMap<(IntegrationKind, String), Vec<AttachedStack>>,
    next_upload: u64,
    failures: Vec<(FailOn, ApiError)>,
    stalls: Vec<FailOn>,
    operations: Vec<MockOperation>,
}

/// Selects the call a failure or stall applies to.
///
/// Stack-scoped variants only match calls for that stack id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailOn {
    ListSpaces,
    ListStacks,
    ListContexts,
    ListPolicies,
    ListAwsIntegrations,
    ListAzureIntegrations,
    IntegrationAttachments(IntegrationKind, String),
    StateDownloadUrl(String),
    StateUploadUrl,
    Lock(String),
    Unlock(String),
    Import(String),
    EnableExternalStateAccess(String),
    EnableStack(String),
}

/// Recorded call for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    ListSpaces,
    ListStacks,
    ListContexts,
    ListPolicies,
    ListAwsIntegrations,
    ListAzureIntegrations,
    IntegrationAttachments {
        kind: IntegrationKind,
        integration_id: String,
    },
    StateDownloadUrl {
        stack_id: String,
    },
    StateUploadUrl,
    Lock {
        stack_id: String,
    },
    Unlock {
        stack_id: String,
    },
    Import {
        stack_id: String,
        object_id: String,
    },
    EnableExternalStateAccess {
        stack_id: String,
    },
    EnableStack {
        stack_id: String,
    },
}

impl MockOperation {
    /// Whether the call changes account state or hands out transfer URLs.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            MockOperation::ListSpaces
                | MockOperation::ListStacks
                | MockOperation::ListContexts
                | MockOperation::ListPolicies
                | MockOperation::ListAwsIntegrations
                | MockOperation::ListAzureIntegrations
                | MockOperation::IntegrationAttachments { .. }
        )
    }
}

impl MockApi {
    /// Create an empty account.
    pub fn new() -> Self {
        Self {
            base_url: "https://mock.app.spacelift.io".to_string(),
            inner: Arc::new(Mutex::new(MockApiInner {
                spaces: Vec::new(),
                stacks: Vec::new(),
                contexts: Vec::new(),
                policies: Vec::new(),
                aws_integrations: Vec::new(),
                azure_integrations: Vec::new(),
                attachments: HashMap::new(),
                next_upload: 1,
                failures: Vec::new(),
                stalls: Vec::new(),
                operations: Vec::new(),
            })),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn with_spaces(self, spaces: Vec<Space>) -> Self {
        self.inner.lock().unwrap().spaces = spaces;
        self
    }

    pub fn with_stacks(self, stacks: Vec<Stack>) -> Self {
        self.inner.lock().unwrap().stacks = stacks;
        self
    }

    pub fn with_contexts(self, contexts: Vec<Context>) -> Self {
        self.inner.lock().unwrap().contexts = contexts;
        self
    }

    pub fn with_policies(self, policies: Vec<Policy>) -> Self {
        self.inner.lock().unwrap().policies = policies;
        self
    }

    pub fn with_aws_integrations(self, integrations: Vec<AwsIntegration>) -> Self {
        self.inner.lock().unwrap().aws_integrations = integrations;
        self
    }

    pub fn with_azure_integrations(self, integrations: Vec<AzureIntegration>) -> Self {
        self.inner.lock().unwrap().azure_integrations = integrations;
        self
    }

    /// Set the attachments listed for one integration.
    pub fn with_attachments(
        self,
        kind: IntegrationKind,
        integration_id: &str,
        attached: Vec<AttachedStack>,
    ) -> Self {
        self.inner
            .lock()
            .unwrap()
            .attachments
            .insert((kind, integration_id.to_string()), attached);
        self
    }

    /// Make the selected call fail with `error`.
    pub fn fail_on(self, target: FailOn, error: ApiError) -> Self {
        self.inner.lock().unwrap().failures.push((target, error));
        self
    }

    /// Make the selected call never complete.
    pub fn stall_on(self, target: FailOn) -> Self {
        self.inner.lock().unwrap().stalls.push(target);
        self
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.inner.lock().unwrap().operations.clone()
    }

    /// Number of recorded calls that change state.
    pub fn mutation_count(&self) -> usize {
        self.operations().iter().filter(|op| op.is_mutation()).count()
    }

    /// Current copy of a stored stack.
    pub fn stack(&self, id: &str) -> Option<Stack> {
        let inner = self.inner.lock().unwrap();
        inner.stacks.iter().find(|s| s.id == id).cloned()
    }

    /// Record the call, then apply any configured stall or failure.
    async fn enter(&self, op: MockOperation, target: FailOn) -> Result<(), ApiError> {
        let (stall, failure) = {
            let mut inner = self.inner.lock().unwrap();
            inner.operations.push(op);
            let stall = inner.stalls.contains(&target);
            let failure = inner
                .failures
                .iter()
                .find(|(t, _)| *t == target)
                .map(|(_, e)| e.clone());
            (stall, failure)
        };

        if stall {
            std::future::pending::<()>().await;
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn update_stack(&self, stack_id: &str, f: impl FnOnce(&mut Stack)) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        let stack = inner
            .stacks
            .iter_mut()
            .find(|s| s.id == stack_id)
            .ok_or_else(|| ApiError::GraphQl(format!("stack {} not found", stack_id)))?;
        f(stack);
        Ok(())
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpaceliftApi for MockApi {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list_spaces(&self) -> Result<Vec<Space>, ApiError> {
        self.enter(MockOperation::ListSpaces, FailOn::ListSpaces)
            .await?;
        Ok(self.inner.lock().unwrap().spaces.clone())
    }

    async fn list_stacks(&self) -> Result<Vec<Stack>, ApiError> {
        self.enter(MockOperation::ListStacks, FailOn::ListStacks)
            .await?;
        Ok(self.inner.lock().unwrap().stacks.clone())
    }

    async fn list_contexts(&self) -> Result<Vec<Context>, ApiError> {
        self.enter(MockOperation::ListContexts, FailOn::ListContexts)
            .await?;
        Ok(self.inner.lock().unwrap().contexts.clone())
    }

    async fn list_policies(&self) -> Result<Vec<Policy>, ApiError> {
        self.enter(MockOperation::ListPolicies, FailOn::ListPolicies)
            .await?;
        Ok(self.inner.lock().unwrap().policies.clone())
    }

    async fn list_aws_integrations(&self) -> Result<Vec<AwsIntegration>, ApiError> {
        self.enter(MockOperation::ListAwsIntegrations, FailOn::ListAwsIntegrations)
            .await?;
        Ok(self.inner.lock().unwrap().aws_integrations.clone())
    }

    async fn list_azure_integrations(&self) -> Result<Vec<AzureIntegration>, ApiError> {
        self.enter(
            MockOperation::ListAzureIntegrations,
            FailOn::ListAzureIntegrations,
        )
        .await?;
        Ok(self.inner.lock().unwrap().azure_integrations.clone())
    }

    async fn list_integration_attachments(
        &self,
        kind: IntegrationKind,
        integration_id: &str,
    ) -> Result<Vec<AttachedStack>, ApiError> {
        self.enter(
            MockOperation::IntegrationAttachments {
                kind,
                integration_id: integration_id.to_string(),
            },
            FailOn::IntegrationAttachments(kind, integration_id.to_string()),
        )
        .await?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .attachments
            .get(&(kind, integration_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn state_download_url(&self, stack_id: &str) -> Result<String, ApiError> {
        self.enter(
            MockOperation::StateDownloadUrl {
                stack_id: stack_id.to_string(),
            },
            FailOn::StateDownloadUrl(stack_id.to_string()),
        )
        .await?;
        Ok(format!("https://downloads.mock/{}/state.tfstate", stack_id))
    }

    async fn state_upload_url(&self) -> Result<StateUpload, ApiError> {
        self.enter(MockOperation::StateUploadUrl, FailOn::StateUploadUrl)
            .await?;
        let mut inner = self.inner.lock().unwrap();
        let n = inner.next_upload;
        inner.next_upload += 1;
        Ok(StateUpload {
            url: format!("https://uploads.mock/object-{}", n),
            object_id: format!("object-{}", n),
        })
    }

    async fn lock_stack(&self, stack_id: &str) -> Result<(), ApiError> {
        self.enter(
            MockOperation::Lock {
                stack_id: stack_id.to_string(),
            },
            FailOn::Lock(stack_id.to_string()),
        )
        .await
    }

    async fn unlock_stack(&self, stack_id: &str) -> Result<(), ApiError> {
        self.enter(
            MockOperation::Unlock {
                stack_id: stack_id.to_string(),
            },
            FailOn::Unlock(stack_id.to_string()),
        )
        .await
    }

    async fn import_managed_state(&self, stack_id: &str, object_id: &str) -> Result<(), ApiError> {
        self.enter(
            MockOperation::Import {
                stack_id: stack_id.to_string(),
                object_id: object_id.to_string(),
            },
            FailOn::Import(stack_id.to_string()),
        )
        .await
    }

    async fn enable_external_state_access(&self, stack: &Stack) -> Result<(), ApiError> {
        self.enter(
            MockOperation::EnableExternalStateAccess {
                stack_id: stack.id.clone(),
            },
            FailOn::EnableExternalStateAccess(stack.id.clone()),
        )
        .await?;
        self.update_stack(&stack.id, |s| s.external_state_access_enabled = true)
    }

    async fn enable_stack(&self, stack: &Stack) -> Result<(), ApiError> {
        self.enter(
            MockOperation::EnableStack {
                stack_id: stack.id.clone(),
            },
            FailOn::EnableStack(stack.id.clone()),
        )
        .await?;
        self.update_stack(&stack.id, |s| s.is_disabled = false)
    }
}
