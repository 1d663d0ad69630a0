//! Core functionality for Debian packaging
//!
//! Contains version extraction, control manifest rendering, package root
//! staging, the `dpkg-deb` invocation and the run pipeline tying them
//! together.

pub mod control;
pub mod packager;
pub mod pipeline;
pub mod stager;
pub mod version;

pub use control::{ControlTemplate, PackageOptions};
pub use packager::Packager;
pub use pipeline::{Pipeline, RunReport, RunState};
pub use stager::{Stager, StagingDir};
pub use version::{PackageVersion, Revision, VersionExtractor};
