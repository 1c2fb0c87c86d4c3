//! api::traits
//!
//! Trait definition for talking to one Spacelift account.
//!
//! # Design
//!
//! The `SpaceliftApi` trait is async because every operation is a GraphQL
//! round trip. Methods are typed per resource so discovery and migration code
//! never build GraphQL documents themselves. Byte streaming of state blobs is
//! a separate concern, see [`crate::api::blob`].
//!
//! Nothing here retries. A failed call is reported to the caller once.
//!
//! # Example
//!
//! ```ignore
//! use spacebridge::api::{ApiError, SpaceliftApi};
//!
//! async fn lock_for_import(api: &dyn SpaceliftApi, stack_id: &str) -> Result<(), ApiError> {
//!     api.lock_stack(stack_id).await?;
//!     // ... import ...
//!     api.unlock_stack(stack_id).await
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::models::{AwsIntegration, AzureIntegration, Context, Policy, Space, Stack};

/// Errors from a single API call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The API key was rejected or the token has expired.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// Non-success HTTP status.
    #[error("API error: {status} - {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },

    /// The GraphQL response carried an `errors` array.
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),
}

/// Upload target returned by `stateUploadUrl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateUpload {
    /// Pre-signed URL to PUT the state blob to.
    pub url: String,
    /// Opaque id passed to the import mutation.
    pub object_id: String,
}

/// Cloud integration flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegrationKind {
    Aws,
    Azure,
}

impl std::fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrationKind::Aws => write!(f, "AWS"),
            IntegrationKind::Azure => write!(f, "Azure"),
        }
    }
}

/// One attachment of an integration, as listed from the integration side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedStack {
    /// Attachment id.
    pub id: String,
    /// Stack or module id.
    pub stack_id: String,
    /// True when the attachment belongs to a module rather than a stack.
    pub is_module: bool,
    pub read: bool,
    pub write: bool,
    /// Azure only.
    pub subscription_id: Option<String>,
}

/// Operations against one Spacelift account.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ApiError>`. Callers decide whether a failure
/// aborts the whole operation (discovery) or only one stack (migration).
#[async_trait]
pub trait SpaceliftApi: Send + Sync {
    /// Base URL of the account, e.g. `https://acme.app.spacelift.io`.
    fn base_url(&self) -> &str;

    async fn list_spaces(&self) -> Result<Vec<Space>, ApiError>;

    /// List stacks. Integration attachments are left empty; discovery merges
    /// them in from the integration side.
    async fn list_stacks(&self) -> Result<Vec<Stack>, ApiError>;

    async fn list_contexts(&self) -> Result<Vec<Context>, ApiError>;

    async fn list_policies(&self) -> Result<Vec<Policy>, ApiError>;

    async fn list_aws_integrations(&self) -> Result<Vec<AwsIntegration>, ApiError>;

    async fn list_azure_integrations(&self) -> Result<Vec<AzureIntegration>, ApiError>;

    /// List the stacks and modules an integration is attached to.
    async fn list_integration_attachments(
        &self,
        kind: IntegrationKind,
        integration_id: &str,
    ) -> Result<Vec<AttachedStack>, ApiError>;

    /// Get a pre-signed URL to download a stack's current state.
    ///
    /// Requires external state access to be enabled on the stack.
    async fn state_download_url(&self, stack_id: &str) -> Result<String, ApiError>;

    /// Get a pre-signed upload URL and the object id to import from.
    async fn state_upload_url(&self) -> Result<StateUpload, ApiError>;

    /// Lock a stack for exclusive use.
    async fn lock_stack(&self, stack_id: &str) -> Result<(), ApiError>;

    /// Release a lock taken by [`SpaceliftApi::lock_stack`].
    async fn unlock_stack(&self, stack_id: &str) -> Result<(), ApiError>;

    /// Import an uploaded state object into a locked stack.
    async fn import_managed_state(&self, stack_id: &str, object_id: &str)
        -> Result<(), ApiError>;

    /// Turn on external state access so the state can be downloaded.
    async fn enable_external_state_access(&self, stack: &Stack) -> Result<(), ApiError>;

    /// Clear the disabled flag on a stack.
    async fn enable_stack(&self, stack: &Stack) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        assert_eq!(
            ApiError::AuthFailed("bad key".into()).to_string(),
            "authentication failed: bad key"
        );
        assert_eq!(ApiError::RateLimited.to_string(), "rate limited");
        assert_eq!(
            ApiError::Http {
                status: 502,
                message: "bad gateway".into()
            }
            .to_string(),
            "API error: 502 - bad gateway"
        );
        assert_eq!(
            ApiError::GraphQl("stack not found".into()).to_string(),
            "GraphQL error: stack not found"
        );
    }

    #[test]
    fn integration_kind_display() {
        assert_eq!(IntegrationKind::Aws.to_string(), "AWS");
        assert_eq!(IntegrationKind::Azure.to_string(), "Azure");
    }
}
