//! cli::commands::shared
//!
//! Helpers used by several command handlers.

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::api::{SpaceliftApi, SpaceliftClient};
use crate::cli::Context;
use crate::core::config::AccountConfig;
use crate::core::manifest::Manifest;
use crate::core::models::{Space, Stack};
use crate::core::spaces::SpaceTree;
use crate::discovery::DiscoveryService;
use crate::migrate::plan::stacks_in_scope;
use crate::ui::output;

/// Runtime for one command's network work.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start async runtime")
}

/// Client for an account, logging which key is used.
pub fn client(ctx: &Context, account: &AccountConfig, label: &str) -> Result<SpaceliftClient> {
    let api = SpaceliftClient::from_account(account)
        .with_context(|| format!("failed to create {} API client", label))?;
    output::debug(
        format!("{} account: {} (key {})", label, api.base_url(), api.key_id()),
        ctx.verbosity,
    );
    Ok(api)
}

/// Load a saved manifest, or discover one from the source account.
pub async fn load_or_discover(ctx: &Context, manifest: Option<&Path>) -> Result<Manifest> {
    if let Some(path) = manifest {
        output::print(
            format!("Loading manifest from {}...", path.display()),
            ctx.verbosity,
        );
        return Ok(Manifest::load(path)?);
    }

    let config = ctx.load_config()?;
    let source = client(ctx, &config.source()?, "source")?;
    output::print("Discovering resources...", ctx.verbosity);
    Ok(DiscoveryService::new(&source, ctx.verbosity)
        .discover_all()
        .await?)
}

/// Build the space tree, warning about orphans and cycles.
pub fn space_tree(ctx: &Context, spaces: &[Space]) -> SpaceTree {
    let tree = SpaceTree::build(spaces);
    for orphan in tree.orphans() {
        output::warn(
            format!(
                "space {} has unknown parent {}; treating it as a root",
                orphan.space_id, orphan.missing_parent
            ),
            ctx.verbosity,
        );
    }
    if let Some(id) = tree.find_cycle() {
        output::warn(
            format!("space hierarchy contains a cycle through {}", id),
            ctx.verbosity,
        );
    }
    tree
}

/// Resolve a `-s` token and announce the selected space.
pub fn resolve_space<'t>(ctx: &Context, tree: &'t SpaceTree, token: &str) -> Result<&'t Space> {
    let space = tree.resolve_filter_token(token)?;
    output::print(
        format!("Filtering to space: {} (ID: {})", space.name, space.id),
        ctx.verbosity,
    );
    Ok(space)
}

/// Stacks placed directly in the `-s` space, or all stacks.
pub fn scoped_stacks(
    ctx: &Context,
    stacks: &[Stack],
    spaces: &[Space],
    token: Option<&str>,
) -> Result<Vec<Stack>> {
    let Some(token) = token else {
        return Ok(stacks.to_vec());
    };
    let tree = space_tree(ctx, spaces);
    let space_id = resolve_space(ctx, &tree, token)?.id.clone();
    Ok(stacks_in_scope(stacks, Some(&space_id)))
}

/// Stacks and spaces of one account, fetched live.
pub async fn live_stacks(
    ctx: &Context,
    api: &SpaceliftClient,
    need_spaces: bool,
) -> Result<(Vec<Stack>, Vec<Space>)> {
    let discovery = DiscoveryService::new(api, ctx.verbosity);
    let spaces = if need_spaces {
        discovery.discover_spaces().await?
    } else {
        Vec::new()
    };
    let stacks = discovery.discover_stacks().await?;
    Ok((stacks, spaces))
}
