//! discovery
//!
//! Builds a [`Manifest`] from a live account.
//!
//! # Architecture
//!
//! [`DiscoveryService::discover_all`] issues one listing per resource kind in
//! a fixed order (spaces, contexts, policies, stacks, AWS integrations, Azure
//! integrations), then one attachment listing per integration. Integration
//! attachments are only visible from the integration side, so they are merged
//! into their stacks afterwards through an id index built once.
//!
//! The first failing call aborts the whole build. The error names which
//! fetch failed.
//!
//! # Example
//!
//! ```
//! use spacebridge::api::mock::MockApi;
//! use spacebridge::discovery::DiscoveryService;
//! use spacebridge::ui::output::Verbosity;
//!
//! # tokio_test::block_on(async {
//! let api = MockApi::new();
//! let manifest = DiscoveryService::new(&api, Verbosity::Quiet)
//!     .discover_all()
//!     .await
//!     .unwrap();
//! assert!(manifest.stacks.is_empty());
//! # });
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::api::{ApiError, AttachedStack, IntegrationKind, SpaceliftApi};
use crate::core::manifest::Manifest;
use crate::core::models::{
    AwsIntegration, AzureIntegration, Context, IntegrationAttachment, Policy, Space, Stack,
};
use crate::ui::output::{self, Verbosity};

/// A discovery call failed.
#[derive(Debug, Error)]
#[error("failed to fetch {what}: {source}")]
pub struct DiscoveryError {
    /// Which fetch failed, e.g. `stacks` or `AWS integration attachments for prod`.
    pub what: String,
    #[source]
    pub source: ApiError,
}

impl DiscoveryError {
    fn new(what: impl Into<String>, source: ApiError) -> Self {
        Self {
            what: what.into(),
            source,
        }
    }
}

/// Reads resources from one account.
pub struct DiscoveryService<'a> {
    api: &'a dyn SpaceliftApi,
    verbosity: Verbosity,
}

impl<'a> DiscoveryService<'a> {
    pub fn new(api: &'a dyn SpaceliftApi, verbosity: Verbosity) -> Self {
        Self { api, verbosity }
    }

    pub async fn discover_spaces(&self) -> Result<Vec<Space>, DiscoveryError> {
        let spaces = self
            .api
            .list_spaces()
            .await
            .map_err(|e| DiscoveryError::new("spaces", e))?;
        output::debug(format!("found {} spaces", spaces.len()), self.verbosity);
        Ok(spaces)
    }

    /// Stacks without integration attachments.
    pub async fn discover_stacks(&self) -> Result<Vec<Stack>, DiscoveryError> {
        let stacks = self
            .api
            .list_stacks()
            .await
            .map_err(|e| DiscoveryError::new("stacks", e))?;
        output::debug(format!("found {} stacks", stacks.len()), self.verbosity);
        Ok(stacks)
    }

    pub async fn discover_contexts(&self) -> Result<Vec<Context>, DiscoveryError> {
        let contexts = self
            .api
            .list_contexts()
            .await
            .map_err(|e| DiscoveryError::new("contexts", e))?;
        output::debug(format!("found {} contexts", contexts.len()), self.verbosity);
        Ok(contexts)
    }

    pub async fn discover_policies(&self) -> Result<Vec<Policy>, DiscoveryError> {
        let policies = self
            .api
            .list_policies()
            .await
            .map_err(|e| DiscoveryError::new("policies", e))?;
        output::debug(format!("found {} policies", policies.len()), self.verbosity);
        Ok(policies)
    }

    pub async fn discover_aws_integrations(&self) -> Result<Vec<AwsIntegration>, DiscoveryError> {
        let integrations = self
            .api
            .list_aws_integrations()
            .await
            .map_err(|e| DiscoveryError::new("AWS integrations", e))?;
        output::debug(
            format!("found {} AWS integrations", integrations.len()),
            self.verbosity,
        );
        Ok(integrations)
    }

    pub async fn discover_azure_integrations(
        &self,
    ) -> Result<Vec<AzureIntegration>, DiscoveryError> {
        let integrations = self
            .api
            .list_azure_integrations()
            .await
            .map_err(|e| DiscoveryError::new("Azure integrations", e))?;
        output::debug(
            format!("found {} Azure integrations", integrations.len()),
            self.verbosity,
        );
        Ok(integrations)
    }

    /// Discover every resource kind and merge integration attachments.
    pub async fn discover_all(&self) -> Result<Manifest, DiscoveryError> {
        let mut manifest = Manifest::new(self.api.base_url());

        manifest.spaces = self.discover_spaces().await?;
        manifest.contexts = self.discover_contexts().await?;
        manifest.policies = self.discover_policies().await?;
        manifest.stacks = self.discover_stacks().await?;
        manifest.aws_integrations = self.discover_aws_integrations().await?;
        manifest.azure_integrations = self.discover_azure_integrations().await?;

        let mut merger = AttachmentMerger::new(&mut manifest.stacks);

        for integration in &manifest.aws_integrations {
            let attached = self
                .attachments(IntegrationKind::Aws, &integration.id, &integration.name)
                .await?;
            merger.merge(IntegrationKind::Aws, &integration.id, attached);
        }

        for integration in &manifest.azure_integrations {
            let attached = self
                .attachments(IntegrationKind::Azure, &integration.id, &integration.name)
                .await?;
            merger.merge(IntegrationKind::Azure, &integration.id, attached);
        }

        if merger.unknown > 0 {
            output::debug(
                format!(
                    "ignored {} integration attachments for unknown stacks",
                    merger.unknown
                ),
                self.verbosity,
            );
        }

        Ok(manifest)
    }

    async fn attachments(
        &self,
        kind: IntegrationKind,
        id: &str,
        name: &str,
    ) -> Result<Vec<AttachedStack>, DiscoveryError> {
        self.api
            .list_integration_attachments(kind, id)
            .await
            .map_err(|e| DiscoveryError::new(format!("{} integration attachments for {}", kind, name), e))
    }
}

/// Merges integration-side attachments into stacks.
struct AttachmentMerger<'s> {
    stacks: &'s mut [Stack],
    index: HashMap<String, usize>,
    unknown: usize,
}

impl<'s> AttachmentMerger<'s> {
    fn new(stacks: &'s mut [Stack]) -> Self {
        let index = stacks
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Self {
            stacks,
            index,
            unknown: 0,
        }
    }

    /// Attach `attached` to its stacks. Module attachments are skipped and
    /// unknown stack ids are counted and ignored.
    fn merge(&mut self, kind: IntegrationKind, integration_id: &str, attached: Vec<AttachedStack>) {
        for a in attached.into_iter().filter(|a| !a.is_module) {
            let Some(&i) = self.index.get(&a.stack_id) else {
                self.unknown += 1;
                continue;
            };
            let attachment = IntegrationAttachment {
                id: a.id,
                integration_id: integration_id.to_string(),
                read: a.read,
                write: a.write,
                subscription_id: a.subscription_id,
            };
            let stack = &mut self.stacks[i];
            match kind {
                IntegrationKind::Aws => stack.attached_aws_integrations.push(attachment),
                IntegrationKind::Azure => stack.attached_azure_integrations.push(attachment),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{FailOn, MockApi, MockOperation};

    fn stack(id: &str) -> Stack {
        serde_json::from_value(serde_json::json!({"id": id, "name": id, "space": "root"})).unwrap()
    }

    fn attached(id: &str, stack_id: &str, is_module: bool) -> AttachedStack {
        AttachedStack {
            id: id.into(),
            stack_id: stack_id.into(),
            is_module,
            read: true,
            write: false,
            subscription_id: None,
        }
    }

    #[test]
    fn merger_skips_modules_and_unknown_stacks() {
        let mut stacks = vec![stack("vpc"), stack("dns")];
        let mut merger = AttachmentMerger::new(&mut stacks);
        merger.merge(
            IntegrationKind::Aws,
            "aws-1",
            vec![
                attached("a1", "vpc", false),
                attached("a2", "mod-x", true),
                attached("a3", "ghost", false),
            ],
        );
        assert_eq!(merger.unknown, 1);

        assert_eq!(stacks[0].attached_aws_integrations.len(), 1);
        assert_eq!(stacks[0].attached_aws_integrations[0].integration_id, "aws-1");
        assert!(stacks[1].attached_aws_integrations.is_empty());
    }

    #[tokio::test]
    async fn discovery_order_is_fixed() {
        let api = MockApi::new();
        DiscoveryService::new(&api, Verbosity::Quiet)
            .discover_all()
            .await
            .unwrap();
        assert_eq!(
            api.operations(),
            vec![
                MockOperation::ListSpaces,
                MockOperation::ListContexts,
                MockOperation::ListPolicies,
                MockOperation::ListStacks,
                MockOperation::ListAwsIntegrations,
                MockOperation::ListAzureIntegrations,
            ]
        );
    }

    #[tokio::test]
    async fn failure_names_the_fetch() {
        let api = MockApi::new().fail_on(FailOn::ListPolicies, ApiError::RateLimited);
        let err = DiscoveryService::new(&api, Verbosity::Quiet)
            .discover_all()
            .await
            .unwrap_err();
        assert_eq!(err.what, "policies");
        assert_eq!(err.to_string(), "failed to fetch policies: rate limited");
        // Aborted before stacks were listed.
        assert!(!api.operations().contains(&MockOperation::ListStacks));
    }
}
