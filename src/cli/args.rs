//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--env-file <path>`: Read credentials from this file instead of `./.env`

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SpaceBridge - Migrate Spacelift spaces, stacks and managed state between accounts
#[derive(Parser, Debug)]
#[command(name = "spacebridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Load credentials from this env file (default: ./.env if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List resources in the source account
    #[command(
        name = "discover",
        long_about = "List resources in the source account.\n\n\
            Reads spaces, stacks, contexts or policies from the account configured \
            by SOURCE_SPACELIFT_URL and prints them as tables. Nothing is written.",
        after_help = "\
EXAMPLES:
    # Show the space hierarchy
    spacebridge discover spaces

    # Everything, including secrets that will need manual re-entry
    spacebridge discover all"
    )]
    Discover {
        #[command(subcommand)]
        kind: DiscoverKind,
    },

    /// Write the full source account manifest to a JSON file
    #[command(
        name = "export",
        after_help = "\
EXAMPLES:
    spacebridge export -o prod-account.json"
    )]
    Export {
        /// Output file
        #[arg(short, long, default_value = "manifest.json")]
        output: PathBuf,
    },

    /// Prepare a space-scoped manifest for configuration generation
    #[command(
        name = "generate",
        long_about = "Prepare a space-scoped manifest for configuration generation.\n\n\
            Loads a manifest (or discovers one from the source account), keeps only \
            the selected space, its descendants, its ancestors and every context or \
            policy its stacks reference, and writes the result to the output directory.",
        after_help = "\
EXAMPLES:
    # Scope to one space, by id, name or name-id
    spacebridge generate -s platform -o ./generated

    # Work from a saved export and create stacks disabled
    spacebridge generate -m prod-account.json --disabled"
    )]
    Generate {
        /// Output directory
        #[arg(short, long, default_value = "./generated")]
        output: PathBuf,

        /// Use a saved manifest instead of discovering
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Space id, name or name-id to scope to
        #[arg(short, long)]
        space: Option<String>,

        /// Mark stacks for creation in disabled state (safe migration mode)
        #[arg(short, long)]
        disabled: bool,
    },

    /// Inspect and migrate managed Terraform state
    #[command(name = "state")]
    State {
        #[command(subcommand)]
        action: StateAction,
    },

    /// Manage stacks in the destination account
    #[command(name = "stacks")]
    Stacks {
        #[command(subcommand)]
        action: StacksAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion for SpaceBridge commands.",
        after_help = "\
EXAMPLES:
    # Bash (add to ~/.bashrc)
    spacebridge completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    spacebridge completion zsh >> ~/.zshrc

    # Fish
    spacebridge completion fish > ~/.config/fish/completions/spacebridge.fish

    # PowerShell
    spacebridge completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Resource kinds for `discover`.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverKind {
    /// Space hierarchy as a tree
    Spaces,
    /// Stacks table
    Stacks,
    /// Contexts table, with secret counts
    Contexts,
    /// Policies table
    Policies,
    /// Every kind, plus a summary
    All,
}

/// `state` subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum StateAction {
    /// Report which stacks are ready for state migration
    Plan {
        /// Only include stacks from this space
        #[arg(short, long)]
        space: Option<String>,

        /// Use a saved manifest instead of discovering
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Enable external state access on source stacks that need it
    EnableAccess {
        /// Only include stacks from this space
        #[arg(short, long)]
        space: Option<String>,

        /// List the stacks without changing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Copy managed state into same-named destination stacks
    #[command(after_help = "\
EXAMPLES:
    # Preview which stacks would be migrated
    spacebridge state migrate --dry-run

    # Migrate one space
    spacebridge state migrate -s platform")]
    Migrate {
        /// Only include stacks from this space
        #[arg(short, long)]
        space: Option<String>,

        /// Use a saved manifest for the source stacks
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Show the plan without transferring anything
        #[arg(long)]
        dry_run: bool,
    },
}

/// `stacks` subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum StacksAction {
    /// Enable disabled stacks in the destination account
    Enable {
        /// Only include stacks from this space
        #[arg(short, long)]
        space: Option<String>,

        /// List the stacks without changing them
        #[arg(long)]
        dry_run: bool,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
