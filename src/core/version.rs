//! Package version extraction
//!
//! Reads the upstream version from a project file without evaluating it and
//! derives the Debian revision from the trailing release marker.

use crate::error::{DebError, Result};
use regex::bytes::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, instrument};

/// Debian revision derived from the marker following the upstream version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Revision {
    /// No marker
    Release,
    /// Trailing `+`
    PreRelease,
    /// Trailing `-`
    PostRelease,
}

impl Revision {
    /// Map the optional marker character to a revision
    pub fn from_marker(marker: Option<&[u8]>) -> Self {
        match marker {
            Some(b"+") => Self::PreRelease,
            Some(b"-") => Self::PostRelease,
            _ => Self::Release,
        }
    }

    /// Numeric revision code used in the package version
    pub const fn code(self) -> u8 {
        match self {
            Self::Release => 0,
            Self::PreRelease => 1,
            Self::PostRelease => 2,
        }
    }
}

/// Full package version, `<major>.<minor>.<patch>-<revision>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVersion {
    /// Upstream `major.minor.patch`
    pub upstream: String,
    pub revision: Revision,
}

impl PackageVersion {
    pub fn new(upstream: impl Into<String>, revision: Revision) -> Self {
        Self {
            upstream: upstream.into(),
            revision,
        }
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.upstream, self.revision.code())
    }
}

/// Finds the first `<prefix><major>.<minor>.<patch>[+|-]` in a file
///
/// Matching works on raw bytes, so sources with non-UTF-8 comments are fine.
pub struct VersionExtractor {
    re_version: Regex,
}

impl VersionExtractor {
    /// Create an extractor for a literal prefix such as `VERSION = `
    pub fn new(prefix: &str) -> Result<Self> {
        let pattern = format!(r"{}([0-9]+\.[0-9]+\.[0-9]+)([+-])?", regex::escape(prefix));
        let re_version = Regex::new(&pattern)
            .map_err(|e| DebError::config(format!("Failed to compile regex: {}", e)))?;
        Ok(Self { re_version })
    }

    /// Read `path` and extract the package version
    #[instrument(skip(self))]
    pub fn extract<P: AsRef<Path> + fmt::Debug>(&self, path: P) -> Result<PackageVersion> {
        let path = path.as_ref();
        debug!("Reading version from: {}", path.display());

        let content = std::fs::read(path).map_err(|e| {
            DebError::version_source_io("Failed to read version source", path, e)
        })?;

        self.extract_from_bytes(&content).ok_or_else(|| {
            DebError::version_source(
                format!(
                    "No version matching '{}' found in {}",
                    self.re_version.as_str(),
                    path.display()
                ),
                path,
            )
        })
    }

    /// Extract the package version from already loaded text
    pub fn extract_from_str(&self, content: &str) -> Option<PackageVersion> {
        self.extract_from_bytes(content.as_bytes())
    }

    /// Extract the package version from raw file contents
    pub fn extract_from_bytes(&self, content: &[u8]) -> Option<PackageVersion> {
        let cap = self.re_version.captures(content)?;
        // The version group only matches ASCII digits and dots.
        let upstream = String::from_utf8_lossy(cap.get(1)?.as_bytes()).into_owned();
        let revision = Revision::from_marker(cap.get(2).map(|m| m.as_bytes()));

        let version = PackageVersion::new(upstream, revision);
        debug!("Extracted version {} (revision {:?})", version, revision);
        Some(version)
    }
}
