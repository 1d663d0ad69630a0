//! Configuration management for the Debian packager
//!
//! The defaults encode the single libnovile/debian7/amd64 profile; command
//! line flags may override paths and the packaging command, never the profile
//! shape itself.

use crate::{
    cli::{Args, Command},
    error::DebError,
};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Enable debug logging
    pub debug: bool,
    /// File carrying the `VERSION = x.y.z` line
    pub version_source: PathBuf,
    /// Literal text preceding the version number
    pub version_prefix: String,
    /// Optional control template file replacing the built-in one
    pub control_template: Option<PathBuf>,
    /// Static package metadata
    pub package: PackageConfig,
    /// Staging configuration
    pub staging: StagingConfig,
    /// Packaging tool configuration
    pub packager: PackagerConfig,
}

/// Static package metadata, combined with the extracted version into
/// [`PackageOptions`](crate::core::PackageOptions)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageConfig {
    /// Debian package name
    pub name: String,
    /// Target architecture
    pub architecture: String,
    /// Distribution label embedded in the artifact name
    pub build_system: String,
    pub maintainer: String,
    pub section: String,
    pub description: String,
    /// Runtime dependencies written to the `Depends` field
    pub depends: Vec<String>,
}

/// Staging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Package root; must not exist before a run
    pub pkg_root: PathBuf,
    /// Directory holding the prebuilt shared libraries
    pub lib_dir: PathBuf,
    /// Glob matched against file names inside `lib_dir`
    pub lib_pattern: String,
}

/// Packaging tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagerConfig {
    /// Program to execute
    pub program: String,
    /// Arguments placed before the package root and artifact path
    pub args: Vec<String>,
    /// Directory receiving the .deb artifact
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            version_source: PathBuf::from("../pro/novile.pro"),
            version_prefix: "VERSION = ".to_string(),
            control_template: None,
            package: PackageConfig::default(),
            staging: StagingConfig::default(),
            packager: PackagerConfig::default(),
        }
    }
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: "libnovile".to_string(),
            architecture: "amd64".to_string(),
            build_system: "debian7".to_string(),
            maintainer: "Yury Kapoyko <yury.kapoyko@gmail.com>".to_string(),
            section: "misc".to_string(),
            description: "Library files for Novile (https://github.com/tucnak/novile)".to_string(),
            depends: vec![
                "libqt4-core".to_string(),
                "libqt4-gui".to_string(),
                "libqt4-webkit".to_string(),
            ],
        }
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            pkg_root: PathBuf::from("pkg_root"),
            lib_dir: PathBuf::from("../lib"),
            lib_pattern: "*.so*".to_string(),
        }
    }
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            program: "fakeroot".to_string(),
            args: vec!["dpkg-deb".to_string(), "--build".to_string()],
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Create configuration from command line arguments
    pub fn from_args(args: &Args) -> Result<Self, DebError> {
        let mut config = Self {
            debug: args.debug,
            control_template: args.template.clone(),
            ..Self::default()
        };

        if let Some(source) = &args.source {
            config.version_source = source.clone();
        }
        if let Some(prefix) = &args.version_prefix {
            config.version_prefix = prefix.clone();
        }

        if let Command::Build {
            lib_dir,
            lib_pattern,
            pkg_root,
            output_dir,
            packager,
            packager_args,
        } = &args.command
        {
            if let Some(dir) = lib_dir {
                config.staging.lib_dir = dir.clone();
            }
            if let Some(pattern) = lib_pattern {
                config.staging.lib_pattern = pattern.clone();
            }
            if let Some(root) = pkg_root {
                config.staging.pkg_root = root.clone();
            }
            if let Some(dir) = output_dir {
                config.packager.output_dir = dir.clone();
            }
            // A replacement program does not inherit the dpkg-deb arguments.
            if let Some(program) = packager {
                config.packager.program = program.clone();
                config.packager.args = packager_args.clone();
            } else if !packager_args.is_empty() {
                config.packager.args = packager_args.clone();
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), DebError> {
        if self.version_prefix.is_empty() {
            return Err(DebError::validation("Version prefix must not be empty"));
        }

        let package = &self.package;
        for (field, value) in [
            ("package name", &package.name),
            ("architecture", &package.architecture),
            ("build system", &package.build_system),
        ] {
            if value.is_empty() {
                return Err(DebError::validation(format!("The {field} must not be empty")));
            }
        }

        if !is_valid_package_name(&package.name) {
            return Err(DebError::validation(format!(
                "Invalid Debian package name: {}",
                package.name
            )));
        }

        if !is_disposable_root(&self.staging.pkg_root) {
            return Err(DebError::validation(format!(
                "Refusing to use {} as the package root",
                self.staging.pkg_root.display()
            )));
        }

        if self.staging.lib_pattern.is_empty() {
            return Err(DebError::validation("Library pattern must not be empty"));
        }
        glob::Pattern::new(&self.staging.lib_pattern).map_err(|e| {
            DebError::config(format!(
                "Invalid library pattern {}: {e}",
                self.staging.lib_pattern
            ))
        })?;

        if self.packager.program.is_empty() {
            return Err(DebError::validation("Packaging program must not be empty"));
        }

        Ok(())
    }

    /// Get packaging command with its fixed arguments
    pub fn get_packager_cmd(&self) -> (String, Vec<String>) {
        (self.packager.program.clone(), self.packager.args.clone())
    }
}

/// Debian policy: lowercase alphanumerics plus `+ - .`, at least two
/// characters, starting with an alphanumeric.
fn is_valid_package_name(name: &str) -> bool {
    name.len() >= 2
        && name.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
}

/// The package root is removed recursively, so it has to name a real
/// directory below its parent rather than `.`, `..` or a filesystem root.
fn is_disposable_root(path: &Path) -> bool {
    matches!(path.components().next_back(), Some(Component::Normal(_)))
}
