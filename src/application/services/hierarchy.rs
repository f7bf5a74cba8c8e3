//! Hierarchy service
//!
//! Runs the full pipeline for one render: load rows, sanitize, build, lay out.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    sanitize_rows, FieldSelectors, Layout, LayoutConfig, LayoutEngine, Row, SelectionCommand,
    TreeArena, TreeBuilder,
};
use crate::infrastructure::traits::FileSystem;

/// Everything one render produced.
#[derive(Debug)]
pub struct RenderedTree {
    pub tree: TreeArena,
    pub layout: Layout,
    /// Rows removed by the sanitizer
    pub dropped_rows: usize,
    /// Identifiers that appeared more than once (first row kept)
    pub duplicates: Vec<String>,
}

/// Service turning row sets into laid-out trees.
pub struct HierarchyService {
    fs: Arc<dyn FileSystem>,
}

impl HierarchyService {
    /// Create a new hierarchy service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read rows from a JSON array of objects.
    #[instrument(level = "debug", skip(self))]
    pub fn load_rows(&self, path: &Path) -> ApplicationResult<Vec<Row>> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::RowSource {
                path: path.to_path_buf(),
                message: "not a file".to_string(),
            });
        }
        let content = self.fs.read_to_string(path).with_path_context("read rows", path)?;
        let rows: Vec<Row> =
            serde_json::from_str(&content).map_err(|e| ApplicationError::RowSource {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        debug!("load_rows: {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    /// Sanitize, build and lay out a row set.
    ///
    /// Structural errors are returned as is; nothing partial is produced.
    #[instrument(level = "debug", skip(self, rows), fields(rows = rows.len()))]
    pub fn render(
        &self,
        rows: &[Row],
        selectors: &FieldSelectors,
        layout: LayoutConfig,
    ) -> ApplicationResult<RenderedTree> {
        let kept = sanitize_rows(rows, selectors);
        let dropped_rows = rows.len() - kept.len();

        let mut builder = TreeBuilder::new();
        let tree = builder.build(&kept, selectors)?;
        let layout = LayoutEngine::new(layout).layout(&tree);

        Ok(RenderedTree {
            tree,
            layout,
            dropped_rows,
            duplicates: builder.duplicates().to_vec(),
        })
    }

    /// Load and render in one step.
    pub fn render_file(
        &self,
        path: &Path,
        selectors: &FieldSelectors,
        layout: LayoutConfig,
    ) -> ApplicationResult<RenderedTree> {
        let rows = self.load_rows(path)?;
        self.render(&rows, selectors, layout)
    }

    /// Selection command for a clicked node.
    pub fn select(
        &self,
        rendered: &RenderedTree,
        selectors: &FieldSelectors,
        node_id: &str,
    ) -> ApplicationResult<SelectionCommand> {
        let (_, node) = rendered
            .tree
            .find(node_id)
            .ok_or_else(|| ApplicationError::NodeNotFound(node_id.to_string()))?;
        Ok(SelectionCommand::replace(
            selectors.id.clone(),
            node.data.source_id.clone(),
        ))
    }
}
