//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Structural errors: the rows cannot form a single rooted tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("multiple roots found: {}", roots.join(", "))]
    MultipleRoots { roots: Vec<String> },

    #[error("cycle detected in hierarchy at: {0}")]
    CycleDetected(String),

    #[error("unresolved parent {parent:?} referenced by {id:?}")]
    UnresolvedParent { id: String, parent: String },
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;
