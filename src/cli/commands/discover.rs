//! cli::commands::discover
//!
//! Print resources of the source account.

use anyhow::Result;

use super::shared;
use crate::cli::args::DiscoverKind;
use crate::cli::Context;
use crate::core::manifest::Manifest;
use crate::core::models::{Context as SpaceliftContext, Policy, Stack};
use crate::core::spaces::SpaceTree;
use crate::discovery::DiscoveryService;
use crate::ui::{output, table};

/// List resources of one kind, or all of them.
pub fn discover(ctx: &Context, kind: DiscoverKind) -> Result<()> {
    let rt = shared::runtime()?;
    rt.block_on(discover_async(ctx, kind))
}

async fn discover_async(ctx: &Context, kind: DiscoverKind) -> Result<()> {
    let config = ctx.load_config()?;
    let api = shared::client(ctx, &config.source()?, "source")?;
    let discovery = DiscoveryService::new(&api, ctx.verbosity);

    match kind {
        DiscoverKind::Spaces => {
            let spaces = discovery.discover_spaces().await?;
            let tree = shared::space_tree(ctx, &spaces);
            print_spaces(ctx, &tree);
        }
        DiscoverKind::Stacks => {
            let stacks = discovery.discover_stacks().await?;
            output::print(stacks_table(&stacks), ctx.verbosity);
        }
        DiscoverKind::Contexts => {
            let contexts = discovery.discover_contexts().await?;
            output::print(contexts_table(&contexts), ctx.verbosity);
            print_secrets_warning(ctx, &contexts);
        }
        DiscoverKind::Policies => {
            let policies = discovery.discover_policies().await?;
            output::print(policies_table(&policies), ctx.verbosity);
        }
        DiscoverKind::All => {
            let manifest = discovery.discover_all().await?;
            print_all(ctx, &manifest);
        }
    }

    Ok(())
}

fn print_spaces(ctx: &Context, tree: &SpaceTree) {
    output::print(tree.render(), ctx.verbosity);
    output::print(
        format!("\nTotal: {} spaces", tree.spaces().len()),
        ctx.verbosity,
    );
}

fn print_all(ctx: &Context, manifest: &Manifest) {
    output::print("\n=== Spaces ===", ctx.verbosity);
    let tree = shared::space_tree(ctx, &manifest.spaces);
    print_spaces(ctx, &tree);

    output::print("\n=== Stacks ===", ctx.verbosity);
    output::print(stacks_table(&manifest.stacks), ctx.verbosity);

    output::print("\n=== Contexts ===", ctx.verbosity);
    output::print(contexts_table(&manifest.contexts), ctx.verbosity);

    output::print("\n=== Policies ===", ctx.verbosity);
    output::print(policies_table(&manifest.policies), ctx.verbosity);

    output::print(
        format!("\nSummary:\n{}", manifest.summary()),
        ctx.verbosity,
    );
    print_secrets_warning(ctx, &manifest.contexts);
}

pub(crate) fn stacks_table(stacks: &[Stack]) -> String {
    let mut table = table::resource_table(&["ID", "Name", "Space", "Repository", "Branch"]);
    for s in stacks {
        table.add_row(vec![
            s.id.clone(),
            s.name.clone(),
            s.space.clone(),
            table::truncate(&s.repository, 40),
            s.branch.clone(),
        ]);
    }
    table.to_string()
}

pub(crate) fn contexts_table(contexts: &[SpaceliftContext]) -> String {
    let mut table = table::resource_table(&["ID", "Name", "Space", "Config Items", "Secrets"]);
    for c in contexts {
        table.add_row(vec![
            c.id.clone(),
            c.name.clone(),
            c.space.clone(),
            c.config.len().to_string(),
            c.secrets().count().to_string(),
        ]);
    }
    table.to_string()
}

pub(crate) fn policies_table(policies: &[Policy]) -> String {
    let mut table = table::resource_table(&["ID", "Name", "Type", "Space"]);
    for p in policies {
        table.add_row(vec![
            p.id.clone(),
            p.name.clone(),
            p.kind.clone(),
            p.space.clone(),
        ]);
    }
    table.to_string()
}

/// Warn about write-only values that cannot be exported.
pub(crate) fn print_secrets_warning(ctx: &Context, contexts: &[SpaceliftContext]) {
    let with_secrets: Vec<&SpaceliftContext> = contexts
        .iter()
        .filter(|c| c.secrets().next().is_some())
        .collect();
    if with_secrets.is_empty() {
        return;
    }

    let total: usize = with_secrets.iter().map(|c| c.secrets().count()).sum();
    output::warn(
        format!(
            "{} secret values cannot be read and must be re-entered in the destination account:",
            total
        ),
        ctx.verbosity,
    );
    for context in with_secrets {
        let ids: Vec<&str> = context.secrets().map(|e| e.id.as_str()).collect();
        output::warn(format!("  {}: {}", context.name, ids.join(", ")), ctx.verbosity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_table_shows_type() {
        let policy: Policy = serde_json::from_value(serde_json::json!({
            "id": "p1", "name": "Approve", "space": "root", "type": "APPROVAL", "body": ""
        }))
        .unwrap();
        let table = policies_table(&[policy]);
        let header: Vec<&str> = table.lines().next().unwrap().split_whitespace().collect();
        assert_eq!(header, vec!["ID", "Name", "Type", "Space"]);
        assert!(table.lines().nth(1).unwrap().contains("APPROVAL"));
    }

    #[test]
    fn context_table_counts_secrets() {
        let ctx: SpaceliftContext = serde_json::from_value(serde_json::json!({
            "id": "c", "name": "aws-creds", "space": "root",
            "config": [
                {"id": "REGION", "type": "ENVIRONMENT_VARIABLE", "value": "eu-west-1", "writeOnly": false},
                {"id": "TOKEN", "type": "ENVIRONMENT_VARIABLE", "writeOnly": true}
            ]
        }))
        .unwrap();
        let table = contexts_table(&[ctx]);
        let row = table.lines().nth(1).unwrap();
        let cells: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(cells, vec!["c", "aws-creds", "root", "2", "1"]);
    }

    #[test]
    fn stack_table_truncates_repository() {
        let stack: Stack = serde_json::from_value(serde_json::json!({
            "id": "vpc", "name": "vpc", "space": "root",
            "repository": "acme-corporation/platform-infrastructure-modules",
            "branch": "main"
        }))
        .unwrap();
        let table = stacks_table(&[stack]);
        let cells: Vec<&str> = table.lines().nth(1).unwrap().split_whitespace().collect();
        assert_eq!(
            cells,
            vec!["vpc", "vpc", "root", "acme-corporation/platform-infrastruct...", "main"]
        );
    }
}
