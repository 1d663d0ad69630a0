//! Package root staging
//!
//! Lays out the installed filesystem image consumed by `dpkg-deb`:
//!
//! ```text
//! <pkg_root>/
//! ├── DEBIAN/control
//! └── usr/lib/<shared libraries>
//! ```
//!
//! The root is owned by a [`StagingDir`] guard from the moment it is created,
//! so it disappears on every exit path, including errors while staging.

use crate::{
    config::StagingConfig,
    error::{DebError, Result},
    utils::fs::FileSystemUtils,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Package root created by this run
///
/// Removes the directory tree when dropped unless [`StagingDir::remove`] has
/// already done so.
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
    library_count: usize,
    removed: bool,
}

impl StagingDir {
    /// Create `path`, failing if anything already exists there.
    ///
    /// An existing directory belongs to someone else and is never touched.
    pub fn create<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        match FileSystemUtils::new().create_dir(&path) {
            Ok(()) => {
                debug!("Created package root: {}", path.display());
                Ok(Self {
                    path,
                    library_count: 0,
                    removed: false,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(DebError::staging_exists(path))
            }
            Err(e) => Err(DebError::file_system("create directory", path, e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of library files copied into `usr/lib`
    pub fn library_count(&self) -> usize {
        self.library_count
    }

    /// Remove the tree now, reporting failures to the caller
    pub fn remove(mut self) -> Result<()> {
        self.removed = true;
        FileSystemUtils::new()
            .remove_dir_all_if_exists(&self.path)
            .map(|_| info!("Removed package root: {}", self.path.display()))
            .map_err(|e| DebError::file_system("remove directory", self.path.clone(), e))
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match FileSystemUtils::new().remove_dir_all_if_exists(&self.path) {
            Ok(_) => debug!("Cleaned up package root: {}", self.path.display()),
            Err(e) => warn!(
                "Failed to clean up package root {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Populates a fresh package root with libraries and the control file
pub struct Stager {
    config: StagingConfig,
    fs_utils: FileSystemUtils,
}

impl Stager {
    /// Create a new stager
    pub fn new(config: StagingConfig) -> Self {
        Self {
            fs_utils: FileSystemUtils::new(),
            config,
        }
    }

    /// Create the package root and fill it
    #[instrument(skip(self, control))]
    pub fn stage(&self, control: &str) -> Result<StagingDir> {
        let mut staging = StagingDir::create(&self.config.pkg_root)?;
        info!("Staging package in: {}", staging.path().display());

        staging.library_count = self.copy_libraries(staging.path())?;
        self.write_control(staging.path(), control)?;

        Ok(staging)
    }

    /// Find the library files matching the configured pattern
    pub fn find_libraries(&self) -> Result<Vec<PathBuf>> {
        let pattern = library_glob(&self.config.lib_dir, &self.config.lib_pattern);
        debug!("Searching libraries with pattern: {}", pattern);

        let paths = glob::glob(&pattern).map_err(|e| {
            DebError::config(format!("Invalid library pattern {}: {}", pattern, e))
        })?;

        let mut libraries = Vec::new();
        for path_result in paths {
            match path_result {
                Ok(path) if path.is_file() => libraries.push(path),
                Ok(path) => debug!("Skipping non-file match: {}", path.display()),
                Err(e) => warn!("Error reading library path: {}", e),
            }
        }

        libraries.sort();
        Ok(libraries)
    }

    fn copy_libraries(&self, root: &Path) -> Result<usize> {
        let lib_dest = root.join("usr").join("lib");
        self.fs_utils
            .create_dir_all(&lib_dest)
            .map_err(|e| DebError::file_system("create directory", lib_dest.clone(), e))?;

        let libraries = self.find_libraries()?;
        if libraries.is_empty() {
            warn!(
                "No library files matching {} found in {}",
                self.config.lib_pattern,
                self.config.lib_dir.display()
            );
        }

        for library in &libraries {
            let Some(file_name) = library.file_name() else {
                continue;
            };
            let destination = lib_dest.join(file_name);
            self.fs_utils
                .copy_file(library, &destination)
                .map_err(|e| DebError::file_system("copy", library.clone(), e))?;
            info!("  Copied: {} -> {}", library.display(), destination.display());
        }

        Ok(libraries.len())
    }

    fn write_control(&self, root: &Path, control: &str) -> Result<()> {
        let control_path = root.join("DEBIAN").join("control");
        self.fs_utils
            .write_file(&control_path, control)
            .map_err(|e| DebError::file_system("write", control_path.clone(), e))?;
        debug!("Wrote control file: {}", control_path.display());
        Ok(())
    }
}

/// Join the escaped directory with the file pattern so only the pattern
/// carries wildcards
fn library_glob(lib_dir: &Path, lib_pattern: &str) -> String {
    let dir = glob::Pattern::escape(&lib_dir.to_string_lossy());
    if dir.is_empty() {
        lib_pattern.to_string()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), lib_pattern)
    }
}
