//! core::models
//!
//! Domain records for the Spacelift resources SpaceBridge migrates.
//!
//! # Design
//!
//! Every record serializes with camelCase field names. That serialized form
//! is the manifest file format, so these types are also the on-disk schema.
//! Optional lists deserialize to empty vectors so older manifests still load.

mod context;
mod integration;
mod policy;
mod space;
mod stack;

pub use context::{ConfigElement, Context};
pub use integration::{AwsIntegration, AzureIntegration};
pub use policy::{describe_policy_type, Policy};
pub use space::{Space, ROOT_SPACE_ID};
pub use stack::{
    friendly_vendor_type, ContextAttachment, Hooks, IntegrationAttachment, PolicyAttachment,
    Stack, StackDependency, VENDOR_TERRAFORM, VENDOR_TERRAGRUNT,
};
