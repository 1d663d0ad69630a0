//! Command-line argument parsing and validation

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// make-deb - Packages the prebuilt libnovile library into a .deb
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "make-deb")]
pub struct Args {
    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// File containing the VERSION line [default: ../pro/novile.pro]
    #[arg(long, global = true, value_name = "FILE")]
    pub source: Option<PathBuf>,

    /// Literal text preceding the version number [default: "VERSION = "]
    #[arg(long = "version-prefix", global = true, value_name = "PREFIX")]
    pub version_prefix: Option<String>,

    /// Control template file replacing the built-in one
    #[arg(long, global = true, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stage the library files and build the .deb package
    Build {
        /// Directory holding the prebuilt libraries [default: ../lib]
        #[arg(long = "lib-dir", value_name = "DIR")]
        lib_dir: Option<PathBuf>,

        /// Glob for library file names [default: *.so*]
        #[arg(long = "lib-pattern", value_name = "GLOB")]
        lib_pattern: Option<String>,

        /// Package root used for staging; must not exist [default: pkg_root]
        #[arg(long = "pkg-root", value_name = "DIR")]
        pkg_root: Option<PathBuf>,

        /// Directory receiving the .deb [default: current directory]
        #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Packaging program [default: fakeroot]
        #[arg(long, value_name = "PROGRAM")]
        packager: Option<String>,

        /// Argument passed to the packaging program before the package root
        /// and artifact path; repeatable [default: dpkg-deb --build]
        #[arg(
            long = "packager-arg",
            value_name = "ARG",
            allow_hyphen_values = true
        )]
        packager_args: Vec<String>,
    },

    /// Print the package version extracted from the source file
    Version,

    /// Print the rendered control manifest
    Control,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    Args::parse()
}
