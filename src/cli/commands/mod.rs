//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads credentials for the account(s) it touches
//! 2. Runs discovery or the migration engine on a per-command runtime
//! 3. Formats and displays output
//!
//! Handlers never talk to the Spacelift API directly. Reads go through
//! [`crate::discovery`] and writes through [`crate::migrate`].

mod completion;
mod discover;
mod export;
mod generate;
mod shared;
mod stacks;
mod state;

pub use completion::completion;
pub use discover::discover;
pub use export::export;
pub use generate::{generate, scope_manifest, GenerateError};
pub use state::render_readiness;

use anyhow::Result;

use crate::cli::args::{Command, StacksAction, StateAction};
use crate::cli::Context;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Discover { kind } => discover::discover(ctx, kind),
        Command::Export { output } => export::export(ctx, &output),
        Command::Generate {
            output,
            manifest,
            space,
            disabled,
        } => generate::generate(
            ctx,
            &output,
            manifest.as_deref(),
            space.as_deref(),
            disabled,
        ),
        Command::State { action } => match action {
            StateAction::Plan { space, manifest } => {
                state::plan(ctx, space.as_deref(), manifest.as_deref())
            }
            StateAction::EnableAccess { space, dry_run } => {
                state::enable_access(ctx, space.as_deref(), dry_run)
            }
            StateAction::Migrate {
                space,
                manifest,
                dry_run,
            } => state::migrate(ctx, space.as_deref(), manifest.as_deref(), dry_run),
        },
        Command::Stacks { action } => match action {
            StacksAction::Enable { space, dry_run } => {
                stacks::enable(ctx, space.as_deref(), dry_run)
            }
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}
