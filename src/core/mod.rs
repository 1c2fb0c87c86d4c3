//! core
//!
//! Domain types and pure algorithms for SpaceBridge.
//!
//! # Modules
//!
//! - [`models`] - Spacelift resource records (spaces, stacks, contexts, ...)
//! - [`manifest`] - Immutable snapshot of one account and its file format
//! - [`spaces`] - Space hierarchy: closures and filter token resolution
//! - [`filter`] - Projection of a manifest onto one space subtree
//! - [`config`] - Credential configuration for both accounts
//!
//! # Design Principles
//!
//! - Nothing in `core` performs network I/O
//! - Manifests are never mutated in place; filtering builds a new one

pub mod config;
pub mod filter;
pub mod manifest;
pub mod models;
pub mod spaces;
