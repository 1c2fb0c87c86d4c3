//! api::spacelift
//!
//! `SpaceliftApi` implementation over the GraphQL endpoint.
//!
//! # Design
//!
//! Each trait method issues exactly one GraphQL document from
//! [`super::queries`] and converts the response into model types. The
//! client holds no state besides the authenticated channel.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::graphql::GraphqlClient;
use super::queries::{self, *};
use super::traits::{ApiError, AttachedStack, IntegrationKind, SpaceliftApi, StateUpload};
use crate::auth::{ApiKeyTokenProvider, TokenProvider};
use crate::core::config::AccountConfig;
use crate::core::models::{AwsIntegration, AzureIntegration, Context, Policy, Space, Stack};

/// Spacelift account client.
#[derive(Debug)]
pub struct SpaceliftClient {
    base_url: String,
    graphql: GraphqlClient,
}

/// Response shape for mutations whose payload is ignored.
#[derive(Deserialize)]
struct Ignored {}

impl SpaceliftClient {
    /// Create a client with an explicit token provider.
    pub fn new(base_url: &str, tokens: Arc<dyn TokenProvider>) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let graphql = GraphqlClient::new(&base_url, tokens)?;
        Ok(Self { base_url, graphql })
    }

    /// Create a client that authenticates with the account's API key.
    pub fn from_account(account: &AccountConfig) -> Result<Self, ApiError> {
        let tokens = ApiKeyTokenProvider::new(account)
            .map_err(|e| ApiError::AuthFailed(e.to_string()))?;
        Self::new(&account.url, Arc::new(tokens))
    }

    /// API key id the client authenticates as.
    pub fn key_id(&self) -> &str {
        self.graphql.key_id()
    }

    async fn update_stack(&self, document: &str, stack: &Stack) -> Result<(), ApiError> {
        let _: Ignored = self
            .graphql
            .mutate(document, update_variables(stack))
            .await?;
        Ok(())
    }
}

/// Variables for a `stackUpdate`, carrying the stack's current required fields.
fn update_variables(stack: &Stack) -> Value {
    json!({
        "id": stack.id,
        "administrative": stack.administrative,
        "branch": stack.branch,
        "name": stack.name,
        "repository": stack.repository,
    })
}

#[async_trait]
impl SpaceliftApi for SpaceliftClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list_spaces(&self) -> Result<Vec<Space>, ApiError> {
        let data: SpacesData = self.graphql.query(SPACES_QUERY, json!({})).await?;
        Ok(data.spaces.into_iter().map(Into::into).collect())
    }

    async fn list_stacks(&self) -> Result<Vec<Stack>, ApiError> {
        let data: StacksData = self
            .graphql
            .query(&queries::stacks_query(), json!({}))
            .await?;
        Ok(data.stacks.into_iter().map(Into::into).collect())
    }

    async fn list_contexts(&self) -> Result<Vec<Context>, ApiError> {
        let data: ContextsData = self
            .graphql
            .query(&queries::contexts_query(), json!({}))
            .await?;
        Ok(data.contexts.into_iter().map(Into::into).collect())
    }

    async fn list_policies(&self) -> Result<Vec<Policy>, ApiError> {
        let data: PoliciesData = self.graphql.query(POLICIES_QUERY, json!({})).await?;
        Ok(data.policies.into_iter().map(Into::into).collect())
    }

    async fn list_aws_integrations(&self) -> Result<Vec<AwsIntegration>, ApiError> {
        let data: AwsIntegrationsData = self
            .graphql
            .query(AWS_INTEGRATIONS_QUERY, json!({}))
            .await?;
        Ok(data.aws_integrations.into_iter().map(Into::into).collect())
    }

    async fn list_azure_integrations(&self) -> Result<Vec<AzureIntegration>, ApiError> {
        let data: AzureIntegrationsData = self
            .graphql
            .query(AZURE_INTEGRATIONS_QUERY, json!({}))
            .await?;
        Ok(data.azure_integrations.into_iter().map(Into::into).collect())
    }

    async fn list_integration_attachments(
        &self,
        kind: IntegrationKind,
        integration_id: &str,
    ) -> Result<Vec<AttachedStack>, ApiError> {
        let variables = json!({ "id": integration_id });
        let integration = match kind {
            IntegrationKind::Aws => {
                let data: AwsAttachmentsData =
                    self.graphql.query(AWS_ATTACHMENTS_QUERY, variables).await?;
                data.aws_integration
            }
            IntegrationKind::Azure => {
                let data: AzureAttachmentsData =
                    self.graphql.query(AZURE_ATTACHMENTS_QUERY, variables).await?;
                data.azure_integration
            }
        };

        // A deleted integration comes back as null; treat it as unattached.
        Ok(integration
            .map(|i| i.attached_stacks.into_iter().map(Into::into).collect())
            .unwrap_or_default())
    }

    async fn state_download_url(&self, stack_id: &str) -> Result<String, ApiError> {
        let data: StateDownloadUrlData = self
            .graphql
            .mutate(STATE_DOWNLOAD_URL_MUTATION, json!({ "stackId": stack_id }))
            .await?;
        let url = data.state_download_url.url;
        if url.is_empty() {
            return Err(ApiError::Decode("empty state download URL".into()));
        }
        Ok(url)
    }

    async fn state_upload_url(&self) -> Result<StateUpload, ApiError> {
        let data: StateUploadUrlData = self
            .graphql
            .mutate(STATE_UPLOAD_URL_MUTATION, json!({}))
            .await?;
        Ok(data.state_upload_url.into())
    }

    async fn lock_stack(&self, stack_id: &str) -> Result<(), ApiError> {
        let _: Ignored = self
            .graphql
            .mutate(LOCK_STACK_MUTATION, json!({ "id": stack_id }))
            .await?;
        Ok(())
    }

    async fn unlock_stack(&self, stack_id: &str) -> Result<(), ApiError> {
        let _: Ignored = self
            .graphql
            .mutate(UNLOCK_STACK_MUTATION, json!({ "id": stack_id }))
            .await?;
        Ok(())
    }

    async fn import_managed_state(&self, stack_id: &str, object_id: &str) -> Result<(), ApiError> {
        let _: Ignored = self
            .graphql
            .mutate(
                IMPORT_STATE_MUTATION,
                json!({ "stackId": stack_id, "state": object_id }),
            )
            .await?;
        Ok(())
    }

    async fn enable_external_state_access(&self, stack: &Stack) -> Result<(), ApiError> {
        self.update_stack(ENABLE_EXTERNAL_STATE_MUTATION, stack).await
    }

    async fn enable_stack(&self, stack: &Stack) -> Result<(), ApiError> {
        self.update_stack(ENABLE_STACK_MUTATION, stack).await
    }
}
