//! Property-based tests for the space hierarchy and manifest filtering.
//!
//! These tests use proptest to verify invariants hold across randomly
//! generated, randomly ordered space trees.

use proptest::prelude::*;

use spacebridge::core::filter::filter_by_space;
use spacebridge::core::manifest::Manifest;
use spacebridge::core::models::{Space, Stack, ROOT_SPACE_ID};
use spacebridge::core::spaces::SpaceTree;

fn space_id(n: usize) -> String {
    if n == 0 {
        ROOT_SPACE_ID.to_string()
    } else {
        format!("space-{:02}", n)
    }
}

fn space(n: usize, parent: Option<usize>) -> Space {
    serde_json::from_value(serde_json::json!({
        "id": space_id(n),
        "name": format!("name{}", n),
        "parentSpace": parent.map(space_id),
    }))
    .unwrap()
}

fn stack(n: usize, space: usize) -> Stack {
    serde_json::from_value(serde_json::json!({
        "id": format!("stack-{}", n),
        "name": format!("stack-{}", n),
        "space": space_id(space),
    }))
    .unwrap()
}

/// Strategy for a rooted tree of up to 12 spaces, listed in random order.
///
/// Space `i` has a parent `j < i`, so the hierarchy is always acyclic.
fn space_tree() -> impl Strategy<Value = Vec<Space>> {
    (1usize..12)
        .prop_flat_map(|n| {
            let parents: Vec<BoxedStrategy<usize>> =
                (1..n).map(|i| (0..i).boxed()).collect();
            (Just(n), parents)
        })
        .prop_map(|(n, parents)| {
            let mut spaces = vec![space(0, None)];
            for i in 1..n {
                spaces.push(space(i, Some(parents[i - 1])));
            }
            spaces
        })
        .prop_shuffle()
}

/// Strategy for a manifest over a random tree, with stacks in random spaces.
fn manifest() -> impl Strategy<Value = Manifest> {
    space_tree().prop_flat_map(|spaces| {
        let n = spaces.len();
        prop::collection::vec(0..n, 0..20).prop_map(move |homes| {
            let mut manifest = Manifest::new("https://acme.app.spacelift.io");
            manifest.spaces = spaces.clone();
            manifest.stacks = homes
                .iter()
                .enumerate()
                .map(|(i, home)| stack(i, *home))
                .collect();
            manifest
        })
    })
}

proptest! {
    #[test]
    fn root_closure_is_every_other_space(spaces in space_tree()) {
        let tree = SpaceTree::build(&spaces);
        let closure = tree.descendant_closure(ROOT_SPACE_ID);

        prop_assert_eq!(closure.len(), spaces.len() - 1);
        prop_assert!(!closure.contains(ROOT_SPACE_ID));
    }

    #[test]
    fn closure_members_have_target_as_ancestor(spaces in space_tree(), pick in any::<prop::sample::Index>()) {
        let tree = SpaceTree::build(&spaces);
        let target = &spaces[pick.index(spaces.len())].id;

        let closure = tree.descendant_closure(target);
        prop_assert!(!closure.contains(target));
        for id in &closure {
            prop_assert!(tree.ancestor_chain(id).contains(target));
        }

        // Conversely, every space below the target is in the closure.
        for s in &spaces {
            if &s.id != target && tree.ancestor_chain(&s.id).contains(target) {
                prop_assert!(closure.contains(&s.id));
            }
        }
    }

    #[test]
    fn ancestor_chain_ends_at_root(spaces in space_tree(), pick in any::<prop::sample::Index>()) {
        let tree = SpaceTree::build(&spaces);
        let target = &spaces[pick.index(spaces.len())].id;

        let chain = tree.ancestor_chain(target);
        prop_assert_eq!(&chain[0], target);
        prop_assert_eq!(chain.last().map(String::as_str), Some(ROOT_SPACE_ID));
    }

    #[test]
    fn filtering_is_idempotent(manifest in manifest(), pick in any::<prop::sample::Index>()) {
        let target = manifest.spaces[pick.index(manifest.spaces.len())].id.clone();

        let once = filter_by_space(&manifest, &target);
        let twice = filter_by_space(&once, &target);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn filtered_stacks_keep_order_and_stay_in_scope(manifest in manifest(), pick in any::<prop::sample::Index>()) {
        let target = manifest.spaces[pick.index(manifest.spaces.len())].id.clone();
        let tree = SpaceTree::build(&manifest.spaces);
        let mut scope = tree.descendant_closure(&target);
        scope.extend(tree.ancestor_chain(&target));

        let filtered = filter_by_space(&manifest, &target);

        let expected: Vec<&Stack> = manifest
            .stacks
            .iter()
            .filter(|s| scope.contains(&s.space))
            .collect();
        let actual: Vec<&Stack> = filtered.stacks.iter().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn filtering_by_root_keeps_everything(manifest in manifest()) {
        let filtered = filter_by_space(&manifest, ROOT_SPACE_ID);
        prop_assert_eq!(filtered.stacks.len(), manifest.stacks.len());
        prop_assert_eq!(filtered.spaces.len(), manifest.spaces.len());
    }
}
