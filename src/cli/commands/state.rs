//! cli::commands::state
//!
//! `state plan`, `state enable-access` and `state migrate`.
//!
//! # Design
//!
//! `plan` only reads the source side and never needs destination
//! credentials. `enable-access` changes source stacks, and only after
//! printing what it will touch. `migrate` hands off to
//! [`MigrationPipeline`], which is interrupted cleanly by Ctrl-C.

use std::path::Path;

use anyhow::Result;

use super::shared;
use crate::api::HttpBlobTransport;
use crate::cli::Context;
use crate::core::models::Stack;
use crate::migrate::access::{self, StackAction};
use crate::migrate::{CancelToken, MigrationError, MigrationPipeline, ReadinessReport};
use crate::ui::output;

/// Report migration readiness of source stacks.
pub fn plan(ctx: &Context, space: Option<&str>, manifest: Option<&Path>) -> Result<()> {
    let rt = shared::runtime()?;
    rt.block_on(plan_async(ctx, space, manifest))
}

async fn plan_async(ctx: &Context, space: Option<&str>, manifest: Option<&Path>) -> Result<()> {
    let stacks = source_stacks(ctx, space, manifest).await?;
    let report = ReadinessReport::build(&stacks);
    output::print(render_readiness(&report), ctx.verbosity);
    Ok(())
}

/// Enable external state access where it blocks migration.
pub fn enable_access(ctx: &Context, space: Option<&str>, dry_run: bool) -> Result<()> {
    let rt = shared::runtime()?;
    rt.block_on(enable_access_async(ctx, space, dry_run))
}

async fn enable_access_async(ctx: &Context, space: Option<&str>, dry_run: bool) -> Result<()> {
    let config = ctx.load_config()?;
    let api = shared::client(ctx, &config.source()?, "source")?;

    let (stacks, spaces) = shared::live_stacks(ctx, &api, space.is_some()).await?;
    let stacks = shared::scoped_stacks(ctx, &stacks, &spaces, space)?;
    let targets = access::stacks_needing_access(&stacks);

    if targets.is_empty() {
        output::success(
            "All managed stacks already have external state access enabled",
            ctx.verbosity,
        );
        return Ok(());
    }

    output::print(
        format!(
            "\nStacks needing external state access ({}):\n{}",
            targets.len(),
            output::format_list(&names(&targets), "  ")
        ),
        ctx.verbosity,
    );

    if dry_run {
        output::print("\nDRY RUN - No changes made", ctx.verbosity);
        return Ok(());
    }

    output::print("", ctx.verbosity);
    let report = access::apply(
        &api,
        StackAction::EnableExternalStateAccess,
        &targets,
        &CancelToken::ctrl_c(),
        ctx.verbosity,
    )
    .await;

    output::print(
        format!(
            "\nResults: {} enabled, {} failed",
            report.succeeded(),
            report.failed()
        ),
        ctx.verbosity,
    );

    if report.failed() > 0 {
        return Err(MigrationError::AccessFailure {
            failed: report.failed(),
            succeeded: report.succeeded(),
        }
        .into());
    }
    Ok(())
}

/// Copy managed state into same-named destination stacks.
pub fn migrate(
    ctx: &Context,
    space: Option<&str>,
    manifest: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    let rt = shared::runtime()?;
    rt.block_on(migrate_async(ctx, space, manifest, dry_run))
}

async fn migrate_async(
    ctx: &Context,
    space: Option<&str>,
    manifest: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    // Both accounts are required before anything is fetched.
    let config = ctx.load_config()?;
    let source_account = config.source()?;
    let destination_account = config.destination()?;

    let source = shared::client(ctx, &source_account, "source")?;
    let destination = shared::client(ctx, &destination_account, "destination")?;

    let stacks = match manifest {
        Some(_) => source_stacks(ctx, space, manifest).await?,
        None => {
            let (stacks, spaces) = shared::live_stacks(ctx, &source, space.is_some()).await?;
            shared::scoped_stacks(ctx, &stacks, &spaces, space)?
        }
    };

    let blobs = HttpBlobTransport::new()?;
    let report = MigrationPipeline::new(&source, &destination, &blobs, ctx.verbosity)
        .with_cancel(CancelToken::ctrl_c())
        .run(&stacks, dry_run)
        .await?;

    report.into_result()?;
    Ok(())
}

/// Source stacks in scope, from a manifest or live discovery.
async fn source_stacks(
    ctx: &Context,
    space: Option<&str>,
    manifest: Option<&Path>,
) -> Result<Vec<Stack>> {
    if let Some(path) = manifest {
        let manifest = shared::load_or_discover(ctx, Some(path)).await?;
        return shared::scoped_stacks(ctx, &manifest.stacks, &manifest.spaces, space);
    }

    let config = ctx.load_config()?;
    let api = shared::client(ctx, &config.source()?, "source")?;
    let (stacks, spaces) = shared::live_stacks(ctx, &api, space.is_some()).await?;
    shared::scoped_stacks(ctx, &stacks, &spaces, space)
}

fn names(stacks: &[Stack]) -> Vec<&str> {
    stacks.iter().map(|s| s.name.as_str()).collect()
}

/// Readiness buckets as printed by `state plan`.
pub fn render_readiness(report: &ReadinessReport) -> String {
    let mut out = String::new();

    let mut bucket = |title: &str, lines: Vec<String>| {
        if lines.is_empty() {
            return;
        }
        out.push_str(&format!("\n{} ({})\n", title, lines.len()));
        out.push_str(&output::format_list(&lines, "  "));
        out.push('\n');
    };

    let plain = |stacks: &[Stack]| -> Vec<String> { stacks.iter().map(|s| s.name.clone()).collect() };

    bucket("✓ READY TO MIGRATE", plain(&report.ready));
    bucket(
        "⚠ BLOCKED - External State Access Disabled",
        plain(&report.blocked),
    );
    bucket("○ SKIPPED - Self-Managed State", plain(&report.skipped));
    bucket(
        "○ N/A - Non-Terraform Stacks",
        report
            .not_applicable
            .iter()
            .map(|s| format!("{} ({})", s.name, s.friendly_vendor()))
            .collect(),
    );

    if !report.blocked.is_empty() {
        out.push_str("\nRun 'spacebridge state enable-access' to unblock them.\n");
    }

    out.push_str(&format!(
        "\nTotal: {} stacks | Ready: {} | Blocked: {} | Skipped: {} | N/A: {}",
        report.total(),
        report.ready.len(),
        report.blocked.len(),
        report.skipped.len(),
        report.not_applicable.len()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::VENDOR_TERRAFORM;

    fn stack(name: &str, vendor: &str, managed: bool, access: bool) -> Stack {
        serde_json::from_value(serde_json::json!({
            "id": name, "name": name, "space": "root",
            "vendorType": vendor,
            "managesStateFile": managed,
            "externalStateAccessEnabled": access,
        }))
        .unwrap()
    }

    #[test]
    fn readiness_rendering() {
        let report = ReadinessReport::build(&[
            stack("vpc", VENDOR_TERRAFORM, true, true),
            stack("dns", VENDOR_TERRAFORM, true, false),
            stack("legacy", VENDOR_TERRAFORM, false, false),
            stack("k8s", "StackConfigVendorKubernetes", true, false),
        ]);
        let text = render_readiness(&report);
        assert!(text.contains("✓ READY TO MIGRATE (1)\n  vpc"));
        assert!(text.contains("⚠ BLOCKED - External State Access Disabled (1)\n  dns"));
        assert!(text.contains("○ SKIPPED - Self-Managed State (1)\n  legacy"));
        assert!(text.contains("○ N/A - Non-Terraform Stacks (1)\n  k8s (Kubernetes)"));
        assert!(text.ends_with("Total: 4 stacks | Ready: 1 | Blocked: 1 | Skipped: 1 | N/A: 1"));
    }
}
