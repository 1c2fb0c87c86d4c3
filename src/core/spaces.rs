//! core::spaces
//!
//! Space hierarchy representation and queries.
//!
//! # Architecture
//!
//! Spaces form a forest where:
//! - Nodes are spaces, stored once in discovery order
//! - Edges point from child to parent (the space's `parentSpace`)
//! - `root` is the account root and has no parent
//!
//! The tree keeps the flat space list plus an id index and a child
//! adjacency list, built in one pass by [`SpaceTree::build`].
//!
//! # Invariants
//!
//! - A space whose parent is empty becomes a root
//! - A space whose parent is not in the snapshot also becomes a root, and is
//!   recorded in [`SpaceTree::orphans`] so callers can warn about it
//! - Closure queries terminate on cyclic input

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::models::{Space, ROOT_SPACE_ID};

/// A filter token matched no space.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpaceLookupError {
    #[error("space not found: {0}")]
    NotFound(String),
}

/// A space whose declared parent is missing from the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanedSpace {
    pub space_id: String,
    pub missing_parent: String,
}

/// The space forest of one account.
#[derive(Debug, Default)]
pub struct SpaceTree {
    /// Spaces in discovery order.
    spaces: Vec<Space>,
    /// Space id to position in `spaces`. First occurrence wins.
    index: HashMap<String, usize>,
    /// Child ids per parent id, in discovery order.
    children: HashMap<String, Vec<String>>,
    /// Spaces treated as roots, in discovery order.
    roots: Vec<String>,
    orphans: Vec<OrphanedSpace>,
}

impl SpaceTree {
    /// Build the tree from a flat space list.
    pub fn build(spaces: &[Space]) -> Self {
        let mut index = HashMap::with_capacity(spaces.len());
        for (i, space) in spaces.iter().enumerate() {
            index.entry(space.id.clone()).or_insert(i);
        }

        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        let mut roots = Vec::new();
        let mut orphans = Vec::new();

        for space in spaces {
            match space.parent_id() {
                None => roots.push(space.id.clone()),
                Some(parent) if index.contains_key(parent) => {
                    children
                        .entry(parent.to_string())
                        .or_default()
                        .push(space.id.clone());
                }
                Some(parent) => {
                    roots.push(space.id.clone());
                    orphans.push(OrphanedSpace {
                        space_id: space.id.clone(),
                        missing_parent: parent.to_string(),
                    });
                }
            }
        }

        Self {
            spaces: spaces.to_vec(),
            index,
            children,
            roots,
            orphans,
        }
    }

    /// Look up a space by id.
    pub fn get(&self, id: &str) -> Option<&Space> {
        self.index.get(id).map(|&i| &self.spaces[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All spaces in discovery order.
    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    /// Resolved parent of a space. `None` for roots and orphans.
    pub fn parent(&self, id: &str) -> Option<&str> {
        self.get(id)
            .and_then(|s| s.parent_id())
            .filter(|p| self.contains(p))
    }

    /// Direct children of a space, in discovery order.
    pub fn children(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Spaces that fell back to being roots because their parent is unknown.
    pub fn orphans(&self) -> &[OrphanedSpace] {
        &self.orphans
    }

    /// All spaces below `space_id`, excluding `space_id` itself.
    ///
    /// Repeats a pass over every space, adding any space whose parent is
    /// already included, until a pass adds nothing. The result does not depend
    /// on discovery order.
    ///
    /// # Example
    ///
    /// ```
    /// use spacebridge::core::models::Space;
    /// use spacebridge::core::spaces::SpaceTree;
    ///
    /// let space = |id: &str, parent: Option<&str>| Space {
    ///     id: id.into(),
    ///     name: id.into(),
    ///     description: String::new(),
    ///     parent_space: parent.map(Into::into),
    ///     inherit_entities: false,
    ///     labels: vec![],
    /// };
    /// // Child listed before its parent.
    /// let tree = SpaceTree::build(&[
    ///     space("prod", Some("infra")),
    ///     space("infra", Some("root")),
    ///     space("root", None),
    /// ]);
    ///
    /// let below_root = tree.descendant_closure("root");
    /// assert!(below_root.contains("infra"));
    /// assert!(below_root.contains("prod"));
    /// assert!(!below_root.contains("root"));
    /// ```
    pub fn descendant_closure(&self, space_id: &str) -> HashSet<String> {
        let mut included: HashSet<String> = HashSet::new();
        included.insert(space_id.to_string());

        let mut changed = true;
        while changed {
            changed = false;
            for space in &self.spaces {
                if included.contains(&space.id) {
                    continue;
                }
                if space.parent_id().is_some_and(|p| included.contains(p)) {
                    included.insert(space.id.clone());
                    changed = true;
                }
            }
        }

        included.remove(space_id);
        included
    }

    /// `space_id` followed by its parent, grandparent, and so on.
    ///
    /// The walk ends at `root`, or at the first space whose parent is not in
    /// the snapshot. The chain always starts with `space_id`.
    pub fn ancestor_chain(&self, space_id: &str) -> Vec<String> {
        let mut chain = vec![space_id.to_string()];
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(space_id);

        let mut current = space_id;
        while current != ROOT_SPACE_ID {
            let Some(parent) = self.parent(current) else {
                break;
            };
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent.to_string());
            current = parent;
        }

        chain
    }

    /// Resolve a user supplied space token to a space id.
    ///
    /// Tries, in order:
    /// 1. exact id
    /// 2. exact name (case-sensitive, first match in discovery order)
    /// 3. `<name>-<id>`: every hyphen from the right, testing whether the
    ///    suffix after it is a known id
    pub fn resolve_filter_token(&self, token: &str) -> Result<&Space, SpaceLookupError> {
        if let Some(space) = self.get(token) {
            return Ok(space);
        }

        if let Some(space) = self.spaces.iter().find(|s| s.name == token) {
            return Ok(space);
        }

        for (pos, _) in token.rmatch_indices('-') {
            if let Some(space) = self.get(&token[pos + 1..]) {
                return Ok(space);
            }
        }

        Err(SpaceLookupError::NotFound(token.to_string()))
    }

    /// Find a parent-pointer cycle.
    ///
    /// Returns `Some(space_id)` for a space on a cycle.
    pub fn find_cycle(&self) -> Option<String> {
        let mut visited = HashSet::new();
        let mut path = HashSet::new();

        for space in &self.spaces {
            if self.has_cycle_from(&space.id, &mut visited, &mut path) {
                return Some(space.id.clone());
            }
        }
        None
    }

    fn has_cycle_from<'a>(
        &'a self,
        id: &'a str,
        visited: &mut HashSet<&'a str>,
        path: &mut HashSet<&'a str>,
    ) -> bool {
        if path.contains(id) {
            return true;
        }
        if !visited.insert(id) {
            return false;
        }

        path.insert(id);
        if let Some(parent) = self.parent(id) {
            if self.has_cycle_from(parent, visited, path) {
                return true;
            }
        }
        path.remove(id);
        false
    }

    /// Render the forest as an indented tree, one space per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut visited = HashSet::new();
        for root in &self.roots {
            self.render_node(&mut out, root, "", true, true, &mut visited);
        }
        out
    }

    fn render_node<'a>(
        &'a self,
        out: &mut String,
        id: &'a str,
        prefix: &str,
        is_last: bool,
        is_top: bool,
        visited: &mut HashSet<&'a str>,
    ) {
        if !visited.insert(id) {
            return;
        }
        let Some(space) = self.get(id) else {
            return;
        };

        if is_top {
            out.push_str(&format_space(space));
        } else {
            let connector = if is_last { "└── " } else { "├── " };
            out.push_str(prefix);
            out.push_str(connector);
            out.push_str(&format_space(space));
        }
        out.push('\n');

        let child_prefix = if is_top {
            String::new()
        } else if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        let kids = self.children(id);
        for (i, child) in kids.iter().enumerate() {
            self.render_node(out, child, &child_prefix, i + 1 == kids.len(), false, visited);
        }
    }
}

fn format_space(space: &Space) -> String {
    let mut info = space.id.clone();
    if !space.name.is_empty() && space.name != space.id {
        info.push_str(&format!(" ({})", space.name));
    }
    if !space.labels.is_empty() {
        info.push_str(&format!(" [{}]", space.labels.join(", ")));
    }
    info
}
