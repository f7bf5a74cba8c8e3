//! Path context for I/O results.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Attaches the failed action and the path it touched to an `io::Error`.
pub trait IoResultExt<T> {
    /// `fs.read_to_string(&rows).with_path_context("read rows", &rows)?`
    fn with_path_context(self, action: &'static str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &'static str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Io {
            action,
            path: path.to_path_buf(),
            source,
        })
    }
}
