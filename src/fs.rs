//! Filesystem seam for the structure document, source files and config.
//!
//! Everything that touches disk on behalf of a request goes through
//! [`FileSystem`] so the loader and the HTTP handlers can be exercised
//! against an in-memory tree.

use std::io;
use std::path::Path;

pub trait FileSystem: Send + Sync {
    /// Read the entire contents of a file as text. Bytes that aren't valid
    /// UTF-8 become U+FFFD rather than failing the read.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write content to a file, creating it if it doesn't exist.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

/// The real disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Shared instance for commands that don't take an injected filesystem.
pub fn default_fs() -> &'static RealFs {
    static INSTANCE: RealFs = RealFs;
    &INSTANCE
}
