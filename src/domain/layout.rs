//! Tidy tree layout: positions for nodes, curves for edges.
//!
//! The depth axis is horizontal (`x = depth * level_width`). Along the order
//! axis leaves take consecutive slots `node_height` apart in left-to-right
//! order and every parent sits at the mean of its children, which keeps
//! subtrees from overlapping. The result is translated so the root is at the
//! origin.

use std::collections::HashMap;

use generational_arena::Index;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::arena::TreeArena;

/// Spacing constants for the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Minimum vertical gap between neighbouring leaves
    pub node_height: f64,
    /// Horizontal gap between depth levels
    pub level_width: f64,
    /// Radius of the node marker; edges stop at its rim
    pub marker_radius: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_height: 26.0,
            level_width: 200.0,
            marker_radius: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A node with its assigned coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub id: String,
    pub parent_id: Option<String>,
    pub label: String,
    pub depth: usize,
    /// Depth axis
    pub x: f64,
    /// Order axis
    pub y: f64,
}

impl PositionedNode {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Cubic Bézier connecting a parent to one child.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Curve {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

/// Parent → child relation with its drawn curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub curve: Curve,
}

impl Edge {
    /// SVG path data for the curve.
    pub fn svg_path(&self) -> String {
        let Curve {
            start,
            control1,
            control2,
            end,
        } = self.curve;
        format!(
            "M{},{} C{},{} {},{} {},{}",
            start.x, start.y, control1.x, control1.y, control2.x, control2.y, end.x, end.y
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Positioned nodes (pre-order) and edges (pre-order of their target).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Layout {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<Edge>,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Bounding box of all node positions, None for an empty layout.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.nodes.first()?.position();
        let bounds = self.nodes.iter().skip(1).fold(
            Bounds {
                min: first,
                max: first,
            },
            |b, n| Bounds {
                min: Point::new(b.min.x.min(n.x), b.min.y.min(n.y)),
                max: Point::new(b.max.x.max(n.x), b.max.y.max(n.y)),
            },
        );
        Some(bounds)
    }
}

pub struct LayoutEngine {
    config: LayoutConfig,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    #[instrument(level = "debug", skip(self, tree), fields(nodes = tree.len()))]
    pub fn layout(&self, tree: &TreeArena) -> Layout {
        let Some(root) = tree.root() else {
            return Layout::default();
        };

        let depths = Self::depths(tree);
        let order = self.order_axis(tree);
        let shift = order.get(&root).copied().unwrap_or(0.0);

        let mut positions: HashMap<Index, Point> = HashMap::with_capacity(tree.len());
        let mut nodes = Vec::with_capacity(tree.len());
        for (idx, node) in tree.iter() {
            let depth = depths.get(&idx).copied().unwrap_or(0);
            let x = depth as f64 * self.config.level_width;
            let y = order.get(&idx).copied().unwrap_or(0.0) - shift;
            positions.insert(idx, Point::new(x, y));
            nodes.push(PositionedNode {
                id: node.data.id.clone(),
                parent_id: node.data.parent_id.clone(),
                label: node.data.label.clone(),
                depth,
                x,
                y,
            });
        }

        let edges: Vec<Edge> = tree
            .iter()
            .filter_map(|(idx, node)| {
                let parent_idx = node.parent?;
                let parent = tree.get_node(parent_idx)?;
                let from = *positions.get(&parent_idx)?;
                let to = *positions.get(&idx)?;
                Some(Edge {
                    source: parent.data.id.clone(),
                    target: node.data.id.clone(),
                    curve: self.curve(from, to),
                })
            })
            .collect();

        debug!("layout: {} nodes, {} edges", nodes.len(), edges.len());
        Layout { nodes, edges }
    }

    fn depths(tree: &TreeArena) -> HashMap<Index, usize> {
        let mut depths = HashMap::with_capacity(tree.len());
        // Pre-order guarantees the parent is assigned first.
        for (idx, node) in tree.iter() {
            let depth = node
                .parent
                .and_then(|p| depths.get(&p))
                .map_or(0, |d| d + 1);
            depths.insert(idx, depth);
        }
        depths
    }

    /// Unshifted order-axis coordinate per node.
    fn order_axis(&self, tree: &TreeArena) -> HashMap<Index, f64> {
        let mut order = HashMap::with_capacity(tree.len());
        let mut next_slot = 0usize;
        // Post-order meets leaves in the same left-to-right order as pre-order
        // and finishes all children before their parent.
        for (idx, node) in tree.iter_postorder() {
            let y = if node.children.is_empty() {
                let y = next_slot as f64 * self.config.node_height;
                next_slot += 1;
                y
            } else {
                let sum: f64 = node.children.iter().filter_map(|c| order.get(c)).sum();
                sum / node.children.len() as f64
            };
            order.insert(idx, y);
        }
        order
    }

    fn curve(&self, parent: Point, child: Point) -> Curve {
        let r = self.config.marker_radius;
        let start = Point::new(parent.x + r, parent.y);
        let end = Point::new(child.x - r, child.y);
        let mid = (start.x + end.x) / 2.0;
        Curve {
            start,
            control1: Point::new(mid, start.y),
            control2: Point::new(mid, end.y),
            end,
        }
    }
}
