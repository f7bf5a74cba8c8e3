//! Selection commands pushed back to the host when a node is picked

use serde::{Deserialize, Serialize};

use crate::domain::row::Scalar;

/// How the host combines the new selection with its current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionUpdate {
    #[default]
    Replace,
    Add,
    Remove,
}

/// Select the marks whose `field` equals `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionCommand {
    pub field: String,
    /// The clicked node's identifier as the row carried it
    pub value: Scalar,
    pub update: SelectionUpdate,
}

impl SelectionCommand {
    pub fn replace(field: impl Into<String>, value: Scalar) -> Self {
        Self {
            field: field.into(),
            value,
            update: SelectionUpdate::Replace,
        }
    }
}
