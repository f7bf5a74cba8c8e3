//! Domain layer: rows, tree construction and layout
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod error;
pub mod layout;
pub mod row;
pub mod sanitize;
pub mod selection;

pub use arena::{NodeData, TreeArena, TreeNode};
pub use builder::TreeBuilder;
pub use error::{DomainError, TreeResult};
pub use layout::{Bounds, Curve, Edge, Layout, LayoutConfig, LayoutEngine, Point, PositionedNode};
pub use row::{FieldSelectors, Row, Scalar};
pub use sanitize::sanitize_rows;
pub use selection::{SelectionCommand, SelectionUpdate};
