//! Tree builder: flat rows to a single rooted tree

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, warn};

use crate::domain::arena::{NodeData, TreeArena};
use crate::domain::error::{DomainError, TreeResult};
use crate::domain::row::{FieldSelectors, Row};

/// Constructs a validated tree from sanitized rows.
///
/// Duplicate identifiers keep the first row; later ones are dropped and
/// remembered in [`TreeBuilder::duplicates`].
pub struct TreeBuilder {
    relationship_cache: HashMap<String, Vec<usize>>,
    visited_ids: HashSet<String>,
    duplicates: Vec<String>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            relationship_cache: HashMap::new(),
            visited_ids: HashSet::new(),
            duplicates: Vec::new(),
        }
    }

    /// Identifiers seen more than once during the last build.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    #[instrument(level = "debug", skip(self, rows), fields(rows = rows.len()))]
    pub fn build(&mut self, rows: &[&Row], selectors: &FieldSelectors) -> TreeResult<TreeArena> {
        // Reset state for a fresh build
        self.relationship_cache.clear();
        self.visited_ids.clear();
        self.duplicates.clear();

        let nodes = self.collect_nodes(rows, selectors);
        if nodes.is_empty() {
            return Ok(TreeArena::new());
        }

        let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        for node in &nodes {
            if let Some(parent) = &node.parent_id {
                if !known.contains(parent.as_str()) {
                    return Err(DomainError::UnresolvedParent {
                        id: node.id.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        let roots: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent_id.is_none())
            .map(|(pos, _)| pos)
            .collect();
        let root = match roots.as_slice() {
            [root] => *root,
            [] => {
                // Every node has a resolvable parent: following them must loop.
                return Err(DomainError::CycleDetected(loop_member(&nodes, &nodes[0].id)));
            }
            _ => {
                return Err(DomainError::MultipleRoots {
                    roots: roots.iter().map(|&pos| nodes[pos].id.clone()).collect(),
                })
            }
        };

        for (pos, node) in nodes.iter().enumerate() {
            if let Some(parent) = &node.parent_id {
                self.relationship_cache
                    .entry(parent.clone())
                    .or_default()
                    .push(pos);
            }
        }

        let tree = self.build_tree(&nodes, root)?;

        if tree.len() < nodes.len() {
            // Nodes not reachable from the root lead into a loop.
            let stray = nodes
                .iter()
                .find(|n| !tree.contains(&n.id))
                .map(|n| loop_member(&nodes, &n.id))
                .unwrap_or_default();
            return Err(DomainError::CycleDetected(stray));
        }

        debug!(
            "build: {} nodes, depth {}, {} duplicates",
            tree.len(),
            tree.depth(),
            self.duplicates.len()
        );
        Ok(tree)
    }

    fn collect_nodes(&mut self, rows: &[&Row], selectors: &FieldSelectors) -> Vec<NodeData> {
        let mut seen = HashSet::new();
        let mut nodes = Vec::with_capacity(rows.len());

        for row in rows {
            let id = row.text(&selectors.id);
            if !seen.insert(id.clone()) {
                warn!("duplicate identifier {:?}, keeping first row", id);
                self.duplicates.push(id);
                continue;
            }

            let parent = row.value(&selectors.parent);
            let parent_id = (!parent.is_empty()).then(|| parent.canonical());

            let label = row.value(&selectors.label);
            let label = if label.is_empty() {
                id.clone()
            } else {
                label.canonical()
            };

            nodes.push(NodeData {
                id,
                parent_id,
                label,
                source_id: row.value(&selectors.id).clone(),
            });
        }
        nodes
    }

    #[instrument(level = "debug", skip(self, nodes))]
    fn build_tree(&mut self, nodes: &[NodeData], root: usize) -> TreeResult<TreeArena> {
        let mut tree = TreeArena::new();
        let mut stack = vec![(root, None)];

        while let Some((pos, parent_idx)) = stack.pop() {
            let node = &nodes[pos];
            // Check for cycles
            if !self.visited_ids.insert(node.id.clone()) {
                return Err(DomainError::CycleDetected(node.id.clone()));
            }

            let current_idx = tree.insert_node(node.clone(), parent_idx);

            // Add children to stack, reversed so they are inserted in input order
            if let Some(children) = self.relationship_cache.get(&node.id) {
                for &child in children.iter().rev() {
                    stack.push((child, Some(current_idx)));
                }
            }
        }

        Ok(tree)
    }
}

/// Follows parent links from `start` until an id repeats; that id lies on the loop.
///
/// Only called once every parent is known to resolve.
fn loop_member(nodes: &[NodeData], start: &str) -> String {
    let parents: HashMap<&str, &str> = nodes
        .iter()
        .filter_map(|n| n.parent_id.as_deref().map(|parent| (n.id.as_str(), parent)))
        .collect();

    let mut seen = HashSet::new();
    let mut current = start;
    while seen.insert(current) {
        match parents.get(current) {
            Some(&parent) => current = parent,
            None => break,
        }
    }
    current.to_string()
}
