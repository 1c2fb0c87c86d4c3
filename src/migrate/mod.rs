//! migrate
//!
//! Managed-state migration between two Spacelift accounts.
//!
//! # Architecture
//!
//! ```text
//! source stacks ──classify──▶ MigrationPlan ──execute──▶ MigrationReport
//!                    ▲                          │
//!          destination names           StateTransfer per candidate
//! ```
//!
//! - [`plan`]: total classification of source stacks and readiness buckets
//! - [`transfer`]: per-stack state machine from download URL to unlock
//! - [`lock`]: lock scope that always attempts the unlock
//! - [`pipeline`]: sequential, isolated processing of every candidate
//! - [`access`]: batch enabling of external state access and of stacks
//! - [`cancel`]: Ctrl-C driven cancellation
//!
//! The source account is only read, apart from the explicit
//! enable-access batch. The destination is changed through lock, import and
//! unlock calls.

pub mod access;
pub mod cancel;
pub mod lock;
pub mod pipeline;
pub mod plan;
pub mod transfer;

use thiserror::Error;

use crate::discovery::DiscoveryError;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use pipeline::{MigrationPipeline, MigrationReport};
pub use plan::{classify, Disposition, MigrationPlan, ReadinessReport};
pub use transfer::{TransferError, TransferState, TransferStep};

/// Aggregate failures of migration commands.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("{failed} stacks failed to migrate")]
    PartialFailure { failed: usize, succeeded: usize },

    #[error("{failed} stacks failed to update")]
    AccessFailure { failed: usize, succeeded: usize },

    #[error("{failed} stacks failed to enable")]
    EnableFailure { failed: usize, succeeded: usize },

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}
