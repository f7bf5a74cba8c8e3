//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::fs::Permissions;
use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;

use crate::domain::SelectionCommand;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Last modification time.
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Receiver of node selections (the host's selection mechanism).
pub trait SelectionSink: Send + Sync {
    fn send(&self, command: &SelectionCommand) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    /// Writes through a temp file in the target directory, so readers never
    /// see a half-written document.
    ///
    /// A replaced file keeps its mode; a new one gets what `File::create` would give.
    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        self.ensure_parent(path)?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let existing = std::fs::metadata(path).ok().map(|meta| meta.permissions());

        let mut builder = tempfile::Builder::new();
        if let Some(permissions) = existing.clone().or_else(new_file_permissions) {
            builder.permissions(permissions);
        }
        let mut tmp = builder.tempfile_in(dir)?;
        if let Some(permissions) = existing {
            // creation is subject to the umask
            tmp.as_file().set_permissions(permissions)?;
        }
        tmp.write_all(content.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}

/// Writes each selection as one JSON line to stdout.
#[derive(Debug, Default)]
pub struct StdoutSelectionSink;

impl SelectionSink for StdoutSelectionSink {
    fn send(&self, command: &SelectionCommand) -> io::Result<()> {
        let line = serde_json::to_string(command)?;
        let mut out = io::stdout().lock();
        writeln!(out, "{}", line)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_missing_parent_dir_when_writing_then_creates_it() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out/nested/tree.svg");

        RealFileSystem.write(&target, "<svg/>").unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "<svg/>");
        assert!(RealFileSystem.modified(&target).is_ok());
    }

    #[test]
    fn given_existing_file_when_writing_then_replaces_content() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("tree.svg");
        std::fs::write(&target, "old").unwrap();

        RealFileSystem.write(&target, "new").unwrap();

        assert_eq!(RealFileSystem.read_to_string(&target).unwrap(), "new");
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn given_new_file_when_writing_then_mode_matches_plain_create() {
        let temp = TempDir::new().unwrap();
        let plain = temp.path().join("plain.svg");
        std::fs::write(&plain, "<svg/>").unwrap();
        let target = temp.path().join("tree.svg");

        RealFileSystem.write(&target, "<svg/>").unwrap();

        assert_eq!(mode(&target), mode(&plain));
        assert_ne!(mode(&target), 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn given_existing_file_when_overwriting_then_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("tree.svg");
        std::fs::write(&target, "old").unwrap();
        std::fs::set_permissions(&target, Permissions::from_mode(0o640)).unwrap();

        RealFileSystem.write(&target, "new").unwrap();

        assert_eq!(mode(&target), 0o640);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
    }
}
