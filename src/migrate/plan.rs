//! migrate::plan
//!
//! Classification of source stacks before any state moves.
//!
//! # Design
//!
//! [`classify`] is total and checks its rules in a fixed order, so every
//! stack lands in exactly one [`Disposition`]. Destination stacks are paired
//! by exact name. When several destination stacks share a name the last one
//! listed wins; [`DestinationIndex::shadowed`] counts the losers so callers
//! can warn.
//!
//! [`readiness`] applies the source-only subset of the rules, for reporting
//! without destination credentials.

use std::collections::HashMap;

use crate::core::models::Stack;

/// What the pipeline will do with one source stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// State lives outside Spacelift.
    SkipSelfManaged,
    /// Vendor does not produce Terraform state.
    SkipVendor { vendor: String },
    /// External state access must be enabled first.
    BlockedNoAccess,
    /// No destination stack has this name.
    BlockedNotInDestination,
    /// Ready to transfer into the named destination stack.
    Candidate { destination_id: String },
}

/// Destination stacks by name.
#[derive(Debug, Default)]
pub struct DestinationIndex {
    by_name: HashMap<String, String>,
    shadowed: usize,
}

impl DestinationIndex {
    pub fn build(stacks: &[Stack]) -> Self {
        let mut by_name = HashMap::with_capacity(stacks.len());
        let mut shadowed = 0;
        for stack in stacks {
            if by_name.insert(stack.name.clone(), stack.id.clone()).is_some() {
                shadowed += 1;
            }
        }
        Self { by_name, shadowed }
    }

    /// Destination stack id for a name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Destination stacks hidden by a later stack of the same name.
    pub fn shadowed(&self) -> usize {
        self.shadowed
    }
}

/// Classify one source stack.
pub fn classify(stack: &Stack, destinations: &DestinationIndex) -> Disposition {
    if !stack.has_platform_managed_state() {
        return if stack.manages_state_file {
            Disposition::SkipVendor {
                vendor: stack.friendly_vendor().to_string(),
            }
        } else {
            Disposition::SkipSelfManaged
        };
    }
    if !stack.external_state_access_enabled {
        return Disposition::BlockedNoAccess;
    }
    match destinations.get(&stack.name) {
        Some(id) => Disposition::Candidate {
            destination_id: id.to_string(),
        },
        None => Disposition::BlockedNotInDestination,
    }
}

/// A source stack with its disposition.
#[derive(Debug, Clone)]
pub struct PlannedStack {
    pub stack: Stack,
    pub disposition: Disposition,
}

impl PlannedStack {
    pub fn destination_id(&self) -> Option<&str> {
        match &self.disposition {
            Disposition::Candidate { destination_id } => Some(destination_id),
            _ => None,
        }
    }
}

/// Classification of every source stack, in source order.
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
    pub entries: Vec<PlannedStack>,
}

impl MigrationPlan {
    pub fn build(source: &[Stack], destinations: &DestinationIndex) -> Self {
        let entries = source
            .iter()
            .map(|stack| PlannedStack {
                disposition: classify(stack, destinations),
                stack: stack.clone(),
            })
            .collect();
        Self { entries }
    }

    pub fn candidates(&self) -> impl Iterator<Item = &PlannedStack> {
        self.entries.iter().filter(|e| e.destination_id().is_some())
    }

    /// Self-managed and non-Terraform stacks.
    pub fn skipped(&self) -> impl Iterator<Item = &PlannedStack> {
        self.entries.iter().filter(|e| {
            matches!(
                e.disposition,
                Disposition::SkipSelfManaged | Disposition::SkipVendor { .. }
            )
        })
    }

    pub fn not_in_destination(&self) -> impl Iterator<Item = &PlannedStack> {
        self.entries
            .iter()
            .filter(|e| e.disposition == Disposition::BlockedNotInDestination)
    }

    pub fn no_access(&self) -> impl Iterator<Item = &PlannedStack> {
        self.entries
            .iter()
            .filter(|e| e.disposition == Disposition::BlockedNoAccess)
    }
}

/// Source-only readiness of one stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Blocked,
    Skipped,
    NotApplicable { vendor: String },
}

/// Classify without a destination: the first three rules of [`classify`].
pub fn readiness(stack: &Stack) -> Readiness {
    if !stack.has_platform_managed_state() {
        if stack.manages_state_file {
            Readiness::NotApplicable {
                vendor: stack.friendly_vendor().to_string(),
            }
        } else {
            Readiness::Skipped
        }
    } else if !stack.external_state_access_enabled {
        Readiness::Blocked
    } else {
        Readiness::Ready
    }
}

/// Stacks grouped by readiness, in source order.
#[derive(Debug, Clone, Default)]
pub struct ReadinessReport {
    pub ready: Vec<Stack>,
    pub blocked: Vec<Stack>,
    pub skipped: Vec<Stack>,
    pub not_applicable: Vec<Stack>,
}

impl ReadinessReport {
    pub fn build(stacks: &[Stack]) -> Self {
        let mut report = Self::default();
        for stack in stacks {
            let bucket = match readiness(stack) {
                Readiness::Ready => &mut report.ready,
                Readiness::Blocked => &mut report.blocked,
                Readiness::Skipped => &mut report.skipped,
                Readiness::NotApplicable { .. } => &mut report.not_applicable,
            };
            bucket.push(stack.clone());
        }
        report
    }

    pub fn total(&self) -> usize {
        self.ready.len() + self.blocked.len() + self.skipped.len() + self.not_applicable.len()
    }
}

/// Stacks placed directly in `space_id`, or all stacks for `None`.
///
/// Stacks in child spaces are not included.
pub fn stacks_in_scope(stacks: &[Stack], space_id: Option<&str>) -> Vec<Stack> {
    match space_id {
        Some(space_id) => stacks
            .iter()
            .filter(|s| s.space == space_id)
            .cloned()
            .collect(),
        None => stacks.to_vec(),
    }
}
