//! cli::commands::stacks
//!
//! `stacks enable`: turn on stacks that were created disabled in the
//! destination account.

use anyhow::Result;

use super::shared;
use crate::cli::Context;
use crate::migrate::access::{self, StackAction};
use crate::migrate::{CancelToken, MigrationError};
use crate::ui::output;

/// Enable disabled destination stacks.
pub fn enable(ctx: &Context, space: Option<&str>, dry_run: bool) -> Result<()> {
    let rt = shared::runtime()?;
    rt.block_on(enable_async(ctx, space, dry_run))
}

async fn enable_async(ctx: &Context, space: Option<&str>, dry_run: bool) -> Result<()> {
    let config = ctx.load_config()?;
    let api = shared::client(ctx, &config.destination()?, "destination")?;

    let (stacks, spaces) = shared::live_stacks(ctx, &api, space.is_some()).await?;
    let stacks = shared::scoped_stacks(ctx, &stacks, &spaces, space)?;
    let targets = access::disabled_stacks(&stacks);

    if targets.is_empty() {
        output::success("No disabled stacks found!", ctx.verbosity);
        return Ok(());
    }

    let names: Vec<&str> = targets.iter().map(|s| s.name.as_str()).collect();
    output::print(
        format!(
            "\nDisabled stacks ({}):\n{}",
            targets.len(),
            output::format_list(&names, "  ")
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
        StackAction::EnableStack,
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
        return Err(MigrationError::EnableFailure {
            failed: report.failed(),
            succeeded: report.succeeded(),
        }
        .into());
    }
    Ok(())
}
