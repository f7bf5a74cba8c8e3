//! Watch service
//!
//! Rebuilds the diagram whenever the row source changes. Bursts of changes
//! are debounced into one rebuild; a failed rebuild leaves the previous
//! output in place.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, info, instrument, warn};

use crate::application::debounce::Debouncer;
use crate::application::services::HierarchyService;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{FieldSelectors, LayoutConfig};
use crate::infrastructure::svg::SvgRenderer;
use crate::infrastructure::traits::FileSystem;

/// Last successfully rendered output and the most recent failure.
#[derive(Debug, Default)]
pub struct RenderState {
    current: Option<String>,
    last_error: Option<String>,
    renders: usize,
}

impl RenderState {
    /// Replace the output; clears the last error.
    pub fn accept(&mut self, output: String) {
        self.current = Some(output);
        self.last_error = None;
        self.renders += 1;
    }

    /// Record a failed rebuild; the current output stays untouched.
    pub fn reject(&mut self, error: &ApplicationError) {
        self.last_error = Some(error.to_string());
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Number of successful renders.
    pub fn renders(&self) -> usize {
        self.renders
    }
}

/// What happened on one turn of the watch loop.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    Rendered { nodes: usize },
    Kept { error: String },
    Idle,
}

#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub rows: PathBuf,
    pub output: PathBuf,
    pub selectors: FieldSelectors,
    pub layout: LayoutConfig,
    pub debounce: Duration,
    pub poll_interval: Duration,
}

pub struct WatchService {
    fs: Arc<dyn FileSystem>,
    hierarchy: Arc<HierarchyService>,
    renderer: SvgRenderer,
}

impl WatchService {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        hierarchy: Arc<HierarchyService>,
        renderer: SvgRenderer,
    ) -> Self {
        Self {
            fs,
            hierarchy,
            renderer,
        }
    }

    /// Rebuild once and update `state` and the output file.
    pub fn rebuild(&self, options: &WatchOptions, state: &mut RenderState) -> WatchEvent {
        let result = self
            .hierarchy
            .render_file(&options.rows, &options.selectors, options.layout)
            .and_then(|rendered| {
                let svg = self.renderer.render(&rendered.layout);
                self.fs
                    .write(&options.output, &svg)
                    .with_path_context("write output", &options.output)?;
                Ok((svg, rendered.layout.nodes.len()))
            });

        match result {
            Ok((svg, nodes)) => {
                info!("rendered {} nodes to {}", nodes, options.output.display());
                state.accept(svg);
                WatchEvent::Rendered { nodes }
            }
            Err(e) if e.is_structural() => {
                warn!("rows do not form a tree, keeping previous output: {}", e);
                state.reject(&e);
                WatchEvent::Kept {
                    error: e.to_string(),
                }
            }
            Err(e) => {
                warn!("rebuild failed, keeping previous output: {}", e);
                state.reject(&e);
                WatchEvent::Kept {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Poll the row source until `observer` returns false.
    ///
    /// Renders once immediately, then after every debounced burst of changes.
    #[instrument(level = "debug", skip(self, observer))]
    pub fn run<F>(&self, options: &WatchOptions, mut observer: F) -> ApplicationResult<RenderState>
    where
        F: FnMut(&WatchEvent) -> bool,
    {
        let mut state = RenderState::default();
        let mut debouncer = Debouncer::new(options.debounce);
        let mut last_modified = self.modified(options);

        let mut event = self.rebuild(options, &mut state);
        while observer(&event) {
            std::thread::sleep(options.poll_interval);
            let now = Instant::now();

            let modified = self.modified(options);
            if modified != last_modified {
                debug!("row source changed");
                last_modified = modified;
                debouncer.notify(now);
            }

            event = if debouncer.poll(now) {
                self.rebuild(options, &mut state)
            } else {
                WatchEvent::Idle
            };
        }
        Ok(state)
    }

    fn modified(&self, options: &WatchOptions) -> Option<SystemTime> {
        self.fs.modified(&options.rows).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_failure_after_success_when_rejecting_then_keeps_previous_output() {
        let mut state = RenderState::default();
        state.accept("<svg>v1</svg>".to_string());

        let error = ApplicationError::NodeNotFound("X".into());
        state.reject(&error);

        assert_eq!(state.current(), Some("<svg>v1</svg>"));
        assert_eq!(state.last_error(), Some("node not found: X"));
        assert_eq!(state.renders(), 1);
    }

    #[test]
    fn given_success_after_failure_when_accepting_then_clears_error() {
        let mut state = RenderState::default();
        state.reject(&ApplicationError::NodeNotFound("X".into()));
        state.accept("<svg/>".to_string());
        assert!(state.last_error().is_none());
    }
}
