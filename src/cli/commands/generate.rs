//! cli::commands::generate
//!
//! Prepare a space-scoped manifest for configuration generation.
//!
//! # Design
//!
//! The command loads or discovers a manifest, applies the space filter and
//! writes two files into the output directory:
//!
//! - `manifest.json`: the scoped manifest
//! - `settings.json`: generation settings (`createDisabled`, `space`)
//!
//! Rendering configuration from them is left to an external templater.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;
use thiserror::Error;

use super::shared;
use crate::cli::Context;
use crate::core::filter::filter_by_space;
use crate::core::manifest::Manifest;
use crate::core::models::{describe_policy_type, Space};
use crate::migrate::plan::{readiness, Readiness};
use crate::ui::output;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no resources found in space '{0}'")]
    EmptyScope(String),
}

/// Generation settings written next to the manifest.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Settings<'a> {
    create_disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    space: Option<&'a str>,
}

/// Scope `manifest` to an already resolved space.
///
/// Without a space the manifest is returned unchanged.
pub fn scope_manifest(
    manifest: &Manifest,
    space: Option<&Space>,
) -> Result<Manifest, GenerateError> {
    let Some(space) = space else {
        return Ok(manifest.clone());
    };

    let scoped = filter_by_space(manifest, &space.id);
    if scoped.has_no_workload() {
        return Err(GenerateError::EmptyScope(space.name.clone()));
    }
    Ok(scoped)
}

/// Run the generate command.
pub fn generate(
    ctx: &Context,
    output_dir: &Path,
    manifest_path: Option<&Path>,
    space: Option<&str>,
    disabled: bool,
) -> Result<()> {
    let rt = shared::runtime()?;
    let manifest = rt.block_on(shared::load_or_discover(ctx, manifest_path))?;

    // Surface orphan and cycle warnings before filtering.
    let tree = shared::space_tree(ctx, &manifest.spaces);
    let selected = space
        .map(|token| shared::resolve_space(ctx, &tree, token))
        .transpose()?;

    let scoped = scope_manifest(&manifest, selected)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    scoped.save(&output_dir.join("manifest.json"))?;

    let settings = Settings {
        create_disabled: disabled,
        space: selected.map(|s| s.id.as_str()),
    };
    let settings_path = output_dir.join("settings.json");
    fs::write(&settings_path, serde_json::to_string_pretty(&settings)?)
        .with_context(|| format!("failed to write {}", settings_path.display()))?;

    output::print(render_summary(&scoped, disabled), ctx.verbosity);
    output::success(
        format!("Wrote manifest and settings to {}", output_dir.display()),
        ctx.verbosity,
    );
    Ok(())
}

/// Text summary of what generation will cover.
pub fn render_summary(manifest: &Manifest, disabled: bool) -> String {
    let summary = manifest.summary();
    let mut out = String::new();

    let _ = writeln!(out, "\nGeneration summary:");
    let _ = writeln!(out, "  Spaces:       {}", summary.spaces);
    let _ = writeln!(out, "  Contexts:     {}", summary.contexts);
    let _ = writeln!(out, "  Policies:     {}", summary.policies);
    let _ = writeln!(out, "  Stacks:       {}", summary.stacks);
    let _ = write!(
        out,
        "  Integrations: {}",
        summary.aws_integrations + summary.azure_integrations
    );

    let mut types: BTreeMap<&str, usize> = BTreeMap::new();
    for policy in &manifest.policies {
        *types.entry(policy.kind.as_str()).or_default() += 1;
    }
    if !types.is_empty() {
        let _ = write!(out, "\n\nPolicies by type:");
        for (kind, count) in types {
            let _ = write!(out, "\n  {} ({}): {}", kind, describe_policy_type(kind), count);
        }
    }

    if summary.secrets > 0 {
        let _ = write!(
            out,
            "\n\n⚠ {} secret values must be re-entered manually in the destination account",
            summary.secrets
        );
    }

    let needs_access: Vec<&str> = manifest
        .stacks
        .iter()
        .filter(|s| readiness(s) == Readiness::Blocked)
        .map(|s| s.name.as_str())
        .collect();
    if !needs_access.is_empty() {
        let _ = write!(
            out,
            "\n\n⚠ {} stacks need external state access before their state can migrate:\n{}",
            needs_access.len(),
            output::format_list(&needs_access, "  - ")
        );
    }

    if disabled {
        let autodeploy: Vec<&str> = manifest
            .stacks
            .iter()
            .filter(|s| s.autodeploy)
            .map(|s| s.name.as_str())
            .collect();
        let _ = write!(out, "\n\nStacks will be created disabled.");
        if !autodeploy.is_empty() {
            let _ = write!(
                out,
                "\nAutodeploy stacks to review before enabling ({}):\n{}",
                autodeploy.len(),
                output::format_list(&autodeploy, "  - ")
            );
        }
    }

    out
}
