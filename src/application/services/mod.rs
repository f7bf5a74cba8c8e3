//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, SelectionSink)
//! but are themselves concrete structs, not traits.

mod hierarchy;
mod watch;

pub use hierarchy::{HierarchyService, RenderedTree};
pub use watch::{RenderState, WatchEvent, WatchOptions, WatchService};
