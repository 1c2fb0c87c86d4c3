//! api
//!
//! Access to Spacelift accounts.
//!
//! # Architecture
//!
//! The [`SpaceliftApi`] trait defines every call SpaceBridge makes against an
//! account. Discovery and migration take `&dyn SpaceliftApi`, so the same code
//! runs against [`SpaceliftClient`] in production and [`mock::MockApi`] in
//! tests. State bytes move through the separate [`BlobTransport`] trait
//! because they go to pre-signed storage URLs, not to the GraphQL endpoint.
//!
//! # Modules
//!
//! - `traits`: `SpaceliftApi` and its error and value types
//! - `graphql`: authenticated GraphQL channel
//! - `queries`: GraphQL documents and wire shapes
//! - [`spacelift`]: production client
//! - [`blob`]: streaming state transfer
//! - [`mock`]: in-memory account for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use spacebridge::api::{SpaceliftApi, SpaceliftClient};
//!
//! let client = SpaceliftClient::from_account(&config.source()?)?;
//! let stacks = client.list_stacks().await?;
//! ```

pub mod blob;
pub(crate) mod graphql;
pub mod mock;
mod queries;
pub mod spacelift;
mod traits;

pub use blob::{BlobError, BlobTransport, HttpBlobTransport, StateDownload};
pub use graphql::GraphqlClient;
pub use spacelift::SpaceliftClient;
pub use traits::*;
