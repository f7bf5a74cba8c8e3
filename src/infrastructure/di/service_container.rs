//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{HierarchyService, WatchService};
use crate::config::Settings;
use crate::infrastructure::svg::{SvgRenderer, SvgStyle};
use crate::infrastructure::traits::{
    FileSystem, RealFileSystem, SelectionSink, StdoutSelectionSink,
};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Where node selections go
    pub selections: Arc<dyn SelectionSink>,

    pub hierarchy: Arc<HierarchyService>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(StdoutSelectionSink),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        selections: Arc<dyn SelectionSink>,
    ) -> Self {
        let settings = Arc::new(settings);
        let hierarchy = Arc::new(HierarchyService::new(fs.clone()));

        Self {
            settings,
            fs,
            selections,
            hierarchy,
        }
    }

    pub fn svg_renderer(&self) -> SvgRenderer {
        SvgRenderer::new(SvgStyle::default(), &self.settings.layout_config())
    }

    pub fn watch_service(&self) -> WatchService {
        WatchService::new(self.fs.clone(), self.hierarchy.clone(), self.svg_renderer())
    }
}
