//! rowtree: turn flat parent/child row tables into laid-out, selectable
//! tree diagrams.
//!
//! Pipeline: [`domain::sanitize_rows`] → [`domain::TreeBuilder`] →
//! [`domain::LayoutEngine`] → [`infrastructure::svg::SvgRenderer`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
