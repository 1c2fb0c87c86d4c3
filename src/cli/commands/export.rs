//! cli::commands::export
//!
//! Write the full source manifest to a JSON file.

use std::path::Path;

use anyhow::Result;

use super::discover::print_secrets_warning;
use super::shared;
use crate::cli::Context;
use crate::ui::output;

/// Discover everything and save it to `output_path`.
pub fn export(ctx: &Context, output_path: &Path) -> Result<()> {
    let rt = shared::runtime()?;
    let manifest = rt.block_on(shared::load_or_discover(ctx, None))?;

    manifest.save(output_path)?;

    output::print(format!("\nExported:\n{}", manifest.summary()), ctx.verbosity);
    print_secrets_warning(ctx, &manifest.contexts);
    output::success(
        format!("Manifest written to {}", output_path.display()),
        ctx.verbosity,
    );
    Ok(())
}
