//! migrate::pipeline
//!
//! Sequential state migration over a classified plan.
//!
//! # Design
//!
//! Candidates are processed one at a time, in source order. A failing
//! candidate never stops the others: every candidate gets its own
//! [`TransferOutcome`] and the report aggregates them. Nothing is rolled
//! back. The run is an error if and only if at least one candidate failed.
//!
//! A dry run lists the destination stacks, classifies and prints the plan,
//! and stops there. It makes no mutating or transfer calls.

use crate::api::{BlobTransport, SpaceliftApi};
use crate::core::models::Stack;
use crate::discovery::DiscoveryService;
use crate::ui::output::{self, Verbosity};

use super::cancel::CancelToken;
use super::plan::{DestinationIndex, Disposition, MigrationPlan};
use super::transfer::{StateTransfer, TransferOutcome, TransferState};
use super::MigrationError;

/// Result of migrating one candidate.
#[derive(Debug)]
pub struct StackResult {
    pub name: String,
    pub source_id: String,
    pub destination_id: String,
    pub outcome: TransferOutcome,
}

/// Aggregate result of a migration run.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub plan: MigrationPlan,
    pub results: Vec<StackResult>,
    pub dry_run: bool,
}

impl MigrationReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// `Err` when any candidate failed.
    pub fn into_result(self) -> Result<Self, MigrationError> {
        match self.failed() {
            0 => Ok(self),
            failed => Err(MigrationError::PartialFailure {
                failed,
                succeeded: self.succeeded(),
            }),
        }
    }
}

/// Migrates managed state from a source account into a destination account.
pub struct MigrationPipeline<'a> {
    source: &'a dyn SpaceliftApi,
    destination: &'a dyn SpaceliftApi,
    blobs: &'a dyn BlobTransport,
    cancel: CancelToken,
    verbosity: Verbosity,
}

impl<'a> MigrationPipeline<'a> {
    pub fn new(
        source: &'a dyn SpaceliftApi,
        destination: &'a dyn SpaceliftApi,
        blobs: &'a dyn BlobTransport,
        verbosity: Verbosity,
    ) -> Self {
        Self {
            source,
            destination,
            blobs,
            cancel: CancelToken::never(),
            verbosity,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Plan and, unless `dry_run`, migrate `source_stacks`.
    ///
    /// Returns the report even when candidates failed; use
    /// [`MigrationReport::into_result`] to turn failures into an error.
    pub async fn run(
        &self,
        source_stacks: &[Stack],
        dry_run: bool,
    ) -> Result<MigrationReport, MigrationError> {
        output::print("Fetching destination stacks...", self.verbosity);
        let destination_stacks = DiscoveryService::new(self.destination, self.verbosity)
            .discover_stacks()
            .await?;

        let index = DestinationIndex::build(&destination_stacks);
        if index.shadowed() > 0 {
            output::warn(
                format!(
                    "{} destination stacks share a name with a later stack and will not be used",
                    index.shadowed()
                ),
                self.verbosity,
            );
        }

        let plan = MigrationPlan::build(source_stacks, &index);
        output::print(render_plan(&plan), self.verbosity);

        if dry_run {
            output::print("\nDRY RUN - No changes made", self.verbosity);
            return Ok(MigrationReport {
                plan,
                results: Vec::new(),
                dry_run: true,
            });
        }

        let results = self.execute(&plan).await;
        let report = MigrationReport {
            plan,
            results,
            dry_run: false,
        };

        output::print(
            format!(
                "\nMigration complete: {} succeeded, {} failed",
                report.succeeded(),
                report.failed()
            ),
            self.verbosity,
        );
        Ok(report)
    }

    /// Transfer every candidate of `plan`.
    pub async fn execute(&self, plan: &MigrationPlan) -> Vec<StackResult> {
        let transfer = StateTransfer::new(self.source, self.destination, self.blobs, &self.cancel);
        let total = plan.candidates().count();
        let mut results = Vec::with_capacity(total);

        for (n, entry) in plan.candidates().enumerate() {
            let Some(destination_id) = entry.destination_id() else {
                continue;
            };
            output::print(
                format!("\n[{}/{}] {}", n + 1, total, entry.stack.name),
                self.verbosity,
            );

            let outcome = transfer.run(&entry.stack.id, destination_id).await;
            for line in trail_lines(&outcome) {
                output::print(line, self.verbosity);
            }
            if let Some(e) = &outcome.unlock_error {
                output::warn(
                    format!(
                        "stack {} may still be locked in the destination: {}",
                        entry.stack.name, e
                    ),
                    self.verbosity,
                );
            }

            results.push(StackResult {
                name: entry.stack.name.clone(),
                source_id: entry.stack.id.clone(),
                destination_id: destination_id.to_string(),
                outcome,
            });
        }

        results
    }
}

/// Human-readable plan sections.
pub fn render_plan(plan: &MigrationPlan) -> String {
    let mut out = String::from("\nMigration plan:");

    let candidates: Vec<String> = plan
        .candidates()
        .map(|e| e.stack.name.clone())
        .collect();
    section(&mut out, "✓ WILL MIGRATE", &candidates);

    let skipped: Vec<String> = plan
        .skipped()
        .map(|e| match &e.disposition {
            Disposition::SkipVendor { vendor } => format!("{} ({})", e.stack.name, vendor),
            _ => format!("{} (self-managed state)", e.stack.name),
        })
        .collect();
    section(&mut out, "○ SKIPPED", &skipped);

    let missing: Vec<String> = plan
        .not_in_destination()
        .map(|e| e.stack.name.clone())
        .collect();
    section(&mut out, "⚠ NOT IN DESTINATION", &missing);

    let no_access: Vec<String> = plan.no_access().map(|e| e.stack.name.clone()).collect();
    section(&mut out, "⚠ NO EXTERNAL ACCESS", &no_access);
    if !no_access.is_empty() {
        out.push_str("\n  Run 'spacebridge state enable-access' to allow state download");
    }

    out
}

fn section(out: &mut String, title: &str, names: &[String]) {
    if names.is_empty() {
        return;
    }
    out.push_str(&format!("\n\n{} ({} stacks)\n", title, names.len()));
    out.push_str(&output::format_list(names, "  "));
}

/// One line per step reached, plus the failure and the unlock outcome.
pub fn trail_lines(outcome: &TransferOutcome) -> Vec<String> {
    let mut lines = Vec::new();
    for state in &outcome.trail {
        let line = match state {
            TransferState::DownloadUrlObtained => output::format_step(true, "Got download URL"),
            TransferState::UploadTargetObtained => output::format_step(true, "Got upload URL"),
            TransferState::Streamed { bytes } => {
                output::format_step(true, format!("Streamed state ({} bytes)", bytes))
            }
            TransferState::Locked => output::format_step(true, "Locked destination stack"),
            TransferState::Imported => output::format_step(true, "Imported state"),
            TransferState::Failed { error, .. } => output::format_step(false, error),
            TransferState::Pending | TransferState::Succeeded => continue,
        };
        lines.push(line);
    }

    if outcome.was_locked() {
        lines.push(match &outcome.unlock_error {
            None => output::format_step(true, "Unlocked destination stack"),
            Some(e) => output::format_step(false, format!("Unlock failed: {}", e)),
        });
    }
    lines
}
