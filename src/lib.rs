//! # novile-deb
//!
//! Packages the prebuilt libnovile shared library into a Debian binary
//! package. The version is read from the qmake project file, the control
//! manifest is rendered from a template, the libraries are staged into a
//! throwaway package root and `fakeroot dpkg-deb --build` produces the `.deb`.
//!
//! ## Example
//!
//! ```no_run
//! use novile_deb::{config::Config, core::Pipeline};
//!
//! let mut pipeline = Pipeline::new(Config::default());
//! let report = pipeline.run()?;
//! println!("Built {}", report.artifact.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with appropriate verbosity
///
/// Logs go to stderr so that `version` and `control` output stays clean.
pub fn setup_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
