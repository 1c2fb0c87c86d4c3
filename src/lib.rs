//! SpaceBridge - migrate Spacelift resources and Terraform state between accounts
//!
//! SpaceBridge reads a source Spacelift account, exports what it finds as a
//! manifest, scopes that manifest to a space subtree for configuration
//! generation, and copies Spacelift-managed Terraform state into same-named
//! stacks of a destination account.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to handlers)
//! - [`core`] - Domain models, manifest, space hierarchy, filtering and config
//! - [`auth`] - API key to bearer token exchange
//! - [`api`] - Spacelift GraphQL client and state blob transport
//! - [`discovery`] - Reads every resource kind into a manifest
//! - [`migrate`] - Classification, per-stack state transfer and batch updates
//! - [`ui`] - Terminal output
//!
//! # Correctness Invariants
//!
//! 1. A stack that was locked is always unlocked again, whatever failed
//! 2. One stack's failure never stops the others
//! 3. Dry runs issue no mutations
//! 4. Write-only config values are never exported

pub mod api;
pub mod auth;
pub mod cli;
pub mod core;
pub mod discovery;
pub mod migrate;
pub mod ui;
