//! migrate::access
//!
//! Batch stack updates that unblock a migration: enabling external state
//! access on source stacks and re-enabling disabled destination stacks.
//!
//! Both run one stack at a time. A failure is recorded and the batch moves
//! on; the caller turns a non-empty failure list into an error.

use crate::api::SpaceliftApi;
use crate::core::models::Stack;
use crate::ui::output::{self, Verbosity};

use super::cancel::CancelToken;
use super::plan::{readiness, Readiness};

/// Which update a batch applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackAction {
    EnableExternalStateAccess,
    EnableStack,
}

impl StackAction {
    fn verb(self) -> &'static str {
        match self {
            StackAction::EnableExternalStateAccess => "Enabling external state access",
            StackAction::EnableStack => "Enabling",
        }
    }
}

/// Stacks whose state is platform-managed but cannot be downloaded yet.
pub fn stacks_needing_access(stacks: &[Stack]) -> Vec<Stack> {
    stacks
        .iter()
        .filter(|s| readiness(s) == Readiness::Blocked)
        .cloned()
        .collect()
}

pub fn disabled_stacks(stacks: &[Stack]) -> Vec<Stack> {
    stacks.iter().filter(|s| s.is_disabled).cloned().collect()
}

/// Outcome of a batch update.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub updated: Vec<String>,
    /// Stack name and error message.
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.updated.len()
    }

    pub fn failed(&self) -> usize {
        self.failed.len()
    }
}

/// Apply `action` to each stack in turn.
pub async fn apply(
    api: &dyn SpaceliftApi,
    action: StackAction,
    stacks: &[Stack],
    cancel: &CancelToken,
    verbosity: Verbosity,
) -> BatchReport {
    let mut report = BatchReport::default();

    for stack in stacks {
        output::print(
            format!("{} for {}...", action.verb(), stack.name),
            verbosity,
        );

        let call = async {
            match action {
                StackAction::EnableExternalStateAccess => {
                    api.enable_external_state_access(stack).await
                }
                StackAction::EnableStack => api.enable_stack(stack).await,
            }
        };

        match cancel.race(call).await {
            Some(Ok(())) => {
                output::print(output::format_step(true, "done"), verbosity);
                report.updated.push(stack.name.clone());
            }
            Some(Err(e)) => {
                output::print(output::format_step(false, &e), verbosity);
                report.failed.push((stack.name.clone(), e.to_string()));
            }
            None => {
                output::print(output::format_step(false, "cancelled"), verbosity);
                report.failed.push((stack.name.clone(), "cancelled".to_string()));
            }
        }
    }

    report
}
