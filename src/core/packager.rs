//! Debian package building
//!
//! Hands a staged package root to `fakeroot dpkg-deb --build`.

use crate::{
    config::Config,
    core::control::PackageOptions,
    error::{DebError, Result},
    utils::{fs::FileSystemUtils, process::ProcessRunner},
};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Invokes the external packaging tool
pub struct Packager {
    config: Config,
    process_runner: ProcessRunner,
    fs_utils: FileSystemUtils,
}

impl Packager {
    /// Create a new packager with the given configuration
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            process_runner: ProcessRunner::new(config.debug),
            fs_utils: FileSystemUtils::new(),
            config,
        }
    }

    /// Path the artifact for `options` is written to
    pub fn artifact_path(&self, options: &PackageOptions) -> PathBuf {
        self.config.packager.output_dir.join(options.artifact_name())
    }

    /// Build the .deb from `pkg_root` and return its path
    #[instrument(skip(self, options), fields(version = %options.version))]
    pub fn build(&self, pkg_root: &Path, options: &PackageOptions) -> Result<PathBuf> {
        let artifact = self.artifact_path(options);
        info!("Building package: {}", artifact.display());

        let (cmd, mut args) = self.config.get_packager_cmd();
        args.push(pkg_root.to_string_lossy().into_owned());
        args.push(artifact.to_string_lossy().into_owned());
        let args_str: Vec<&str> = args.iter().map(String::as_str).collect();

        // A file already at this path belongs to an earlier run.
        let preexisting = std::fs::symlink_metadata(&artifact).is_ok();
        if preexisting {
            warn!("Overwriting existing artifact: {}", artifact.display());
        }

        if let Err(e) = self.process_runner.run_command(&cmd, &args_str) {
            if !preexisting {
                self.discard_partial_artifact(&artifact);
            }
            return Err(e);
        }

        if !artifact.is_file() {
            return Err(DebError::artifact(
                format!("{} exited successfully but produced no package", cmd),
                artifact,
            ));
        }

        info!("Package built successfully: {}", artifact.display());
        Ok(artifact)
    }

    fn discard_partial_artifact(&self, artifact: &Path) {
        match self.fs_utils.remove_file_if_exists(artifact) {
            Ok(true) => warn!("Removed partial artifact: {}", artifact.display()),
            Ok(false) => {}
            Err(e) => warn!(
                "Could not remove partial artifact {}: {}",
                artifact.display(),
                e
            ),
        }
    }
}
