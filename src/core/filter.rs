//! core::filter
//!
//! Projection of a manifest onto one space subtree.
//!
//! # Design
//!
//! The projection keeps everything needed to recreate the subtree in another
//! account:
//!
//! - the target space, its descendants, and its ancestors up to `root`
//! - stacks living in those spaces
//! - contexts and policies living in those spaces, plus any context or policy
//!   an included stack is attached to, wherever it lives, together with the
//!   ancestor chain of its space
//! - integrations declared in an included space or in an ancestor of the
//!   target (inherited from above)
//!
//! Integrations use a wider inclusion set than the other resources: the
//! included spaces plus the target's ancestors and `root`.

use std::collections::HashSet;

use super::manifest::Manifest;
use super::models::ROOT_SPACE_ID;
use super::spaces::SpaceTree;

/// Filter a manifest down to the subtree rooted at `space_id`.
///
/// `space_id` must already be resolved. An empty id returns a copy of the
/// input. Every output list keeps its input order.
pub fn filter_by_space(manifest: &Manifest, space_id: &str) -> Manifest {
    if space_id.is_empty() {
        return manifest.clone();
    }

    let tree = SpaceTree::build(&manifest.spaces);
    let target_chain = tree.ancestor_chain(space_id);

    let mut included: HashSet<String> = tree.descendant_closure(space_id);
    included.insert(space_id.to_string());
    included.extend(target_chain.iter().cloned());

    let mut ancestors: HashSet<String> = target_chain.into_iter().collect();
    ancestors.insert(ROOT_SPACE_ID.to_string());

    let stacks: Vec<_> = manifest
        .stacks
        .iter()
        .filter(|s| included.contains(&s.space))
        .cloned()
        .collect();

    let required_contexts: HashSet<String> = stacks
        .iter()
        .flat_map(|s| s.attached_contexts.iter().map(|a| a.context_id.clone()))
        .collect();
    let required_policies: HashSet<String> = stacks
        .iter()
        .flat_map(|s| s.attached_policies.iter().map(|a| a.policy_id.clone()))
        .collect();

    // Attached resources outside the subtree still need their space path.
    let referenced_spaces = manifest
        .contexts
        .iter()
        .filter(|c| required_contexts.contains(&c.id))
        .map(|c| c.space.as_str())
        .chain(
            manifest
                .policies
                .iter()
                .filter(|p| required_policies.contains(&p.id))
                .map(|p| p.space.as_str()),
        );
    for owner in referenced_spaces {
        included.extend(tree.ancestor_chain(owner));
    }

    Manifest {
        source_url: manifest.source_url.clone(),
        spaces: manifest
            .spaces
            .iter()
            .filter(|s| included.contains(&s.id))
            .cloned()
            .collect(),
        contexts: manifest
            .contexts
            .iter()
            .filter(|c| included.contains(&c.space) || required_contexts.contains(&c.id))
            .cloned()
            .collect(),
        policies: manifest
            .policies
            .iter()
            .filter(|p| included.contains(&p.space) || required_policies.contains(&p.id))
            .cloned()
            .collect(),
        aws_integrations: manifest
            .aws_integrations
            .iter()
            .filter(|i| included.contains(&i.space) || ancestors.contains(&i.space))
            .cloned()
            .collect(),
        azure_integrations: manifest
            .azure_integrations
            .iter()
            .filter(|i| included.contains(&i.space) || ancestors.contains(&i.space))
            .cloned()
            .collect(),
        stacks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest() -> Manifest {
        serde_json::from_value(json!({
            "sourceUrl": "https://acme.app.spacelift.io",
            "spaces": [
                {"id": "root", "name": "root"},
                {"id": "infra", "name": "infra", "parentSpace": "root"},
                {"id": "infra-prod", "name": "infra-prod", "parentSpace": "infra"},
                {"id": "infra-dev", "name": "infra-dev", "parentSpace": "infra"},
                {"id": "shared", "name": "shared", "parentSpace": "root"},
                {"id": "shared-secrets", "name": "shared-secrets", "parentSpace": "shared"}
            ],
            "stacks": [
                {"id": "vpc", "name": "vpc", "space": "infra-prod",
                 "attachedContexts": [{"id": "a1", "contextId": "ctx-secrets", "priority": 1}],
                 "attachedPolicies": [{"id": "p1", "policyId": "pol-shared"}]},
                {"id": "dev-vpc", "name": "dev-vpc", "space": "infra-dev"}
            ],
            "contexts": [
                {"id": "ctx-prod", "name": "prod", "space": "infra-prod"},
                {"id": "ctx-secrets", "name": "secrets", "space": "shared-secrets"},
                {"id": "ctx-dev", "name": "dev", "space": "infra-dev"}
            ],
            "policies": [
                {"id": "pol-shared", "name": "shared", "space": "shared", "type": "PLAN"},
                {"id": "pol-dev", "name": "dev", "space": "infra-dev", "type": "PLAN"}
            ],
            "awsIntegrations": [
                {"id": "aws-root", "name": "root", "roleArn": "arn", "space": "root"},
                {"id": "aws-infra", "name": "infra", "roleArn": "arn", "space": "infra"},
                {"id": "aws-dev", "name": "dev", "roleArn": "arn", "space": "infra-dev"},
                {"id": "aws-shared", "name": "shared", "roleArn": "arn", "space": "shared"}
            ],
            "azureIntegrations": [
                {"id": "az-prod", "name": "prod", "tenantId": "t", "space": "infra-prod"}
            ]
        }))
        .unwrap()
    }

    fn ids<T>(items: &[T], id: impl Fn(&T) -> &str) -> Vec<String> {
        items.iter().map(|i| id(i).to_string()).collect()
    }

    #[test]
    fn empty_target_is_identity() {
        let m = manifest();
        assert_eq!(filter_by_space(&m, ""), m);
    }

    #[test]
    fn ancestors_are_kept_but_siblings_are_not() {
        let out = filter_by_space(&manifest(), "infra-prod");
        let spaces = ids(&out.spaces, |s| s.id.as_str());
        assert!(spaces.contains(&"infra-prod".to_string()));
        assert!(spaces.contains(&"infra".to_string()));
        assert!(spaces.contains(&"root".to_string()));
        assert!(!spaces.contains(&"infra-dev".to_string()));
        assert_eq!(ids(&out.stacks, |s| s.id.as_str()), vec!["vpc"]);
    }

    #[test]
    fn attached_context_pulls_in_its_space_chain() {
        let out = filter_by_space(&manifest(), "infra-prod");
        assert_eq!(
            ids(&out.contexts, |c| c.id.as_str()),
            vec!["ctx-prod", "ctx-secrets"]
        );
        let spaces = ids(&out.spaces, |s| s.id.as_str());
        assert!(spaces.contains(&"shared-secrets".to_string()));
        assert!(spaces.contains(&"shared".to_string()));
    }

    #[test]
    fn attached_policy_is_included_across_spaces() {
        let out = filter_by_space(&manifest(), "infra-prod");
        assert_eq!(ids(&out.policies, |p| p.id.as_str()), vec!["pol-shared"]);
    }

    #[test]
    fn integrations_follow_included_or_ancestor_spaces() {
        let out = filter_by_space(&manifest(), "infra-prod");
        // "shared" became included through the attached context chain.
        assert_eq!(
            ids(&out.aws_integrations, |i| i.id.as_str()),
            vec!["aws-root", "aws-infra", "aws-shared"]
        );
        assert_eq!(ids(&out.azure_integrations, |i| i.id.as_str()), vec!["az-prod"]);
    }

    #[test]
    fn root_filter_keeps_everything_connected() {
        let m = manifest();
        let out = filter_by_space(&m, "root");
        assert_eq!(out, m);
    }

    #[test]
    fn filtering_twice_is_stable() {
        let once = filter_by_space(&manifest(), "infra-prod");
        let twice = filter_by_space(&once, "infra-prod");
        assert_eq!(once, twice);
    }
}
