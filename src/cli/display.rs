//! Text rendering of a hierarchy for the terminal.

use std::collections::HashMap;

use generational_arena::Index;
use itertools::Itertools;
use termtree::Tree;

use crate::domain::{Layout, TreeArena};

/// Labels as an indented text tree; None for an empty hierarchy.
pub fn render_labels(tree: &TreeArena) -> Option<String> {
    let labels = label_tree(tree)?;
    let text = labels.to_string();
    release(labels);
    Some(text)
}

/// Label tree assembled bottom-up, children before parents.
fn label_tree(tree: &TreeArena) -> Option<Tree<String>> {
    let root = tree.root()?;
    let mut finished: HashMap<Index, Tree<String>> = HashMap::with_capacity(tree.len());
    for (idx, node) in tree.iter_postorder() {
        let leaves: Vec<Tree<String>> = node
            .children
            .iter()
            .filter_map(|child| finished.remove(child))
            .collect();
        finished.insert(idx, Tree::new(node.data.to_string()).with_leaves(leaves));
    }
    finished.remove(&root)
}

/// Tears a nested tree down level by level; the derived drop recurses per level.
fn release(tree: Tree<String>) {
    let mut pending = vec![tree];
    while let Some(mut next) = pending.pop() {
        pending.append(&mut next.leaves);
    }
}

/// One line per positioned node: id, depth and coordinates.
pub fn layout_lines(layout: &Layout) -> String {
    layout
        .nodes
        .iter()
        .map(|n| format!("{}\tdepth={}\tx={}\ty={}", n.id, n.depth, n.x, n.y))
        .join("\n")
}
