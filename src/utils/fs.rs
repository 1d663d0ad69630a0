//! File system utility functions
//!
//! Provides safe file operations with proper error handling.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, instrument};

/// Utility struct for file system operations
#[derive(Debug)]
pub struct FileSystemUtils;

impl FileSystemUtils {
    /// Create a new file system utilities instance
    pub fn new() -> Self {
        Self
    }

    /// Copy `src` to `dst` with the source permissions, creating the parent
    /// of `dst`. Symlinks are followed, so versioned `.so` links land as
    /// regular files.
    pub fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<u64> {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes_copied = fs::copy(src, dst)?;
        fs::set_permissions(dst, fs::metadata(src)?.permissions())?;

        debug!("Copied {} ({} bytes)", src.display(), bytes_copied);
        Ok(bytes_copied)
    }

    /// Create a single directory, failing if it already exists
    pub fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    /// Create directories recursively
    pub fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    /// Remove a file; `Ok(false)` when there was nothing to remove
    pub fn remove_file_if_exists(&self, path: &Path) -> io::Result<bool> {
        ignore_not_found(fs::remove_file(path))
    }

    /// Remove a directory tree; `Ok(false)` when there was nothing to remove
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn remove_dir_all_if_exists(&self, path: &Path) -> io::Result<bool> {
        let removed = ignore_not_found(fs::remove_dir_all(path))?;
        debug!("Removed tree: {}", removed);
        Ok(removed)
    }

    /// Write `contents` to `path`, creating the parent directory
    pub fn write_file(&self, path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }
}

fn ignore_not_found(result: io::Result<()>) -> io::Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

impl Default for FileSystemUtils {
    fn default() -> Self {
        Self::new()
    }
}
