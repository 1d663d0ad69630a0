//! Utility modules for common functionality
//!
//! Provides reusable utilities for file operations and process execution.

pub mod fs;
pub mod process;

pub use fs::FileSystemUtils;
pub use process::ProcessRunner;
