//! cli
//!
//! Command-line interface layer for SpaceBridge.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load credentials before any network call
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, builds a
//! [`Context`] from the global flags and dispatches to
//! [`commands::dispatch`]. Handlers are synchronous and run their network
//! work on a tokio runtime created per command.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::Result;

use crate::core::config::{Config, ConfigLoadResult};
use crate::ui::output::{self, Verbosity};

/// Settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub verbosity: Verbosity,
    /// Explicit `--env-file`, if given.
    pub env_file: Option<PathBuf>,
}

impl Context {
    /// Load credentials and report where they came from.
    pub fn load_config(&self) -> Result<Config> {
        let ConfigLoadResult {
            config,
            config_path,
            env_file,
        } = Config::load(self.env_file.as_deref())?;
        if let Some(path) = config_path {
            output::debug(format!("config file: {}", path.display()), self.verbosity);
        }
        if let Some(path) = env_file {
            output::debug(format!("env file: {}", path.display()), self.verbosity);
        }
        Ok(config)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = Context {
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
        env_file: cli.env_file.clone(),
    };

    commands::dispatch(cli.command, &ctx)
}
