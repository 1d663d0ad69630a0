//! Command implementations for the CLI

use crate::{cli::Command, config::Config, core::Pipeline};
use anyhow::Context;
use tracing::{info, instrument};

/// Execute the appropriate command based on CLI arguments
#[instrument(skip(config))]
pub fn execute_command(config: &Config, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Build { .. } => execute_build_command(config),
        Command::Version => execute_version_command(config),
        Command::Control => execute_control_command(config),
    }
}

/// Execute the build command
#[instrument(skip(config))]
fn execute_build_command(config: &Config) -> anyhow::Result<()> {
    info!("Building Debian package...");

    let mut pipeline = Pipeline::new(config.clone());
    let report = pipeline.run().with_context(|| {
        let state = pipeline.failed_in().unwrap_or(pipeline.state());
        format!("Packaging run failed in state '{}'", state)
    })?;

    info!(
        "Build completed successfully. Packaged {} library file(s) as {}",
        report.library_count,
        report.artifact.display()
    );

    Ok(())
}

/// Execute the version command
#[instrument(skip(config))]
fn execute_version_command(config: &Config) -> anyhow::Result<()> {
    let options = Pipeline::new(config.clone())
        .package_options()
        .context("Failed to extract package version")?;

    println!("{}", options.version);
    Ok(())
}

/// Execute the control command
#[instrument(skip(config))]
fn execute_control_command(config: &Config) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(config.clone());
    let options = pipeline
        .package_options()
        .context("Failed to extract package version")?;
    let control = pipeline
        .render_control(&options)
        .context("Failed to render control manifest")?;

    print!("{control}");
    Ok(())
}
