//! migrate::transfer
//!
//! Moves one stack's managed state from the source account to the
//! destination account.
//!
//! # State machine
//!
//! ```text
//! Pending -> DownloadUrlObtained -> UploadTargetObtained -> Streamed
//!         -> Locked -> Imported -> Succeeded
//! ```
//!
//! Any step can end in the absorbing `Failed { at, error }` state. Failures
//! before `Locked` never touch the destination lock. Once locked, the unlock
//! is always attempted and its outcome is reported next to the result
//! without changing it.
//!
//! Every remote step races the cancellation token. Taking the lock does not,
//! so a lock acquired on the server is never abandoned.

use thiserror::Error;

use super::cancel::CancelToken;
use super::lock::with_lock;
use crate::api::{ApiError, BlobError, BlobTransport, SpaceliftApi};

/// Steps of a transfer, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStep {
    DownloadUrl,
    UploadUrl,
    Stream,
    Lock,
    Import,
}

impl std::fmt::Display for TransferStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransferStep::DownloadUrl => "get download URL",
            TransferStep::UploadUrl => "get upload URL",
            TransferStep::Stream => "stream state",
            TransferStep::Lock => "lock destination stack",
            TransferStep::Import => "import state",
        };
        f.write_str(name)
    }
}

/// Progress of one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferState {
    Pending,
    DownloadUrlObtained,
    UploadTargetObtained,
    Streamed { bytes: u64 },
    Locked,
    Imported,
    Succeeded,
    Failed { at: TransferStep, error: String },
}

impl TransferState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Succeeded | TransferState::Failed { .. })
    }
}

/// Why a transfer failed.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("{step} failed: {source}")]
    Api {
        step: TransferStep,
        #[source]
        source: ApiError,
    },

    #[error("{step} failed: {source}")]
    Blob {
        step: TransferStep,
        #[source]
        source: BlobError,
    },

    #[error("cancelled during {step}")]
    Cancelled { step: TransferStep },
}

impl TransferError {
    pub fn step(&self) -> TransferStep {
        match self {
            TransferError::Api { step, .. }
            | TransferError::Blob { step, .. }
            | TransferError::Cancelled { step } => *step,
        }
    }
}

/// Everything that happened during one transfer.
#[derive(Debug)]
pub struct TransferOutcome {
    /// States reached, in order. The last entry is terminal.
    pub trail: Vec<TransferState>,
    /// Set when the transfer failed.
    pub error: Option<TransferError>,
    /// Set when the destination was locked and unlocking failed.
    pub unlock_error: Option<ApiError>,
}

impl TransferOutcome {
    fn new() -> Self {
        Self {
            trail: vec![TransferState::Pending],
            error: None,
            unlock_error: None,
        }
    }

    fn reach(&mut self, state: TransferState) {
        self.trail.push(state);
    }

    pub fn state(&self) -> &TransferState {
        // The trail always starts with Pending.
        self.trail.last().unwrap_or(&TransferState::Pending)
    }

    pub fn succeeded(&self) -> bool {
        *self.state() == TransferState::Succeeded
    }

    /// Bytes streamed, if the stream step completed.
    pub fn bytes(&self) -> Option<u64> {
        self.trail.iter().find_map(|s| match s {
            TransferState::Streamed { bytes } => Some(*bytes),
            _ => None,
        })
    }

    /// Whether the destination stack was locked at some point.
    pub fn was_locked(&self) -> bool {
        self.trail.contains(&TransferState::Locked)
    }
}

/// Runs transfers between two accounts.
pub struct StateTransfer<'a> {
    source: &'a dyn SpaceliftApi,
    destination: &'a dyn SpaceliftApi,
    blobs: &'a dyn BlobTransport,
    cancel: &'a CancelToken,
}

impl<'a> StateTransfer<'a> {
    pub fn new(
        source: &'a dyn SpaceliftApi,
        destination: &'a dyn SpaceliftApi,
        blobs: &'a dyn BlobTransport,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            source,
            destination,
            blobs,
            cancel,
        }
    }

    /// Transfer the state of `source_stack_id` into `destination_stack_id`.
    pub async fn run(&self, source_stack_id: &str, destination_stack_id: &str) -> TransferOutcome {
        let mut outcome = TransferOutcome::new();
        match self
            .steps(source_stack_id, destination_stack_id, &mut outcome)
            .await
        {
            Ok(()) => outcome.reach(TransferState::Succeeded),
            Err(error) => {
                outcome.reach(TransferState::Failed {
                    at: error.step(),
                    error: error.to_string(),
                });
                outcome.error = Some(error);
            }
        }
        outcome
    }

    async fn steps(
        &self,
        source_stack_id: &str,
        destination_stack_id: &str,
        outcome: &mut TransferOutcome,
    ) -> Result<(), TransferError> {
        let download_url = self
            .api_step(
                TransferStep::DownloadUrl,
                self.source.state_download_url(source_stack_id),
            )
            .await?;
        outcome.reach(TransferState::DownloadUrlObtained);

        let upload = self
            .api_step(TransferStep::UploadUrl, self.destination.state_upload_url())
            .await?;
        outcome.reach(TransferState::UploadTargetObtained);

        let bytes = self.stream(&download_url, &upload.url).await?;
        outcome.reach(TransferState::Streamed { bytes });

        if self.cancel.is_cancelled() {
            return Err(TransferError::Cancelled {
                step: TransferStep::Lock,
            });
        }

        let destination = self.destination;
        let cancel = self.cancel;
        let object_id = upload.object_id.as_str();
        let locked = with_lock(destination, destination_stack_id, || async move {
            match cancel
                .race(destination.import_managed_state(destination_stack_id, object_id))
                .await
            {
                Some(result) => result.map_err(|source| TransferError::Api {
                    step: TransferStep::Import,
                    source,
                }),
                None => Err(TransferError::Cancelled {
                    step: TransferStep::Import,
                }),
            }
        })
        .await
        .map_err(|source| TransferError::Api {
            step: TransferStep::Lock,
            source,
        })?;
        outcome.reach(TransferState::Locked);

        if let Err(e) = locked.unlock {
            outcome.unlock_error = Some(e);
        }
        locked.value?;
        outcome.reach(TransferState::Imported);
        Ok(())
    }

    async fn api_step<T>(
        &self,
        step: TransferStep,
        call: impl std::future::Future<Output = Result<T, ApiError>>,
    ) -> Result<T, TransferError> {
        match self.cancel.race(call).await {
            Some(result) => result.map_err(|source| TransferError::Api { step, source }),
            None => Err(TransferError::Cancelled { step }),
        }
    }

    /// Pipe the download straight into the upload.
    async fn stream(&self, download_url: &str, upload_url: &str) -> Result<u64, TransferError> {
        let blob_err = |source| TransferError::Blob {
            step: TransferStep::Stream,
            source,
        };
        let cancelled = || TransferError::Cancelled {
            step: TransferStep::Stream,
        };

        let download = self
            .cancel
            .race(self.blobs.open_download(download_url))
            .await
            .ok_or_else(cancelled)?
            .map_err(blob_err)?;

        self.cancel
            .race(self.blobs.upload(upload_url, download))
            .await
            .ok_or_else(cancelled)?
            .map_err(blob_err)
    }
}
