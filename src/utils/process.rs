//! Process execution utilities
//!
//! Provides safe process execution with proper error handling and logging.

use crate::error::{DebError, Result};
use std::process::{Command, Stdio};
use tracing::{debug, info, instrument};

/// Utility for running external processes
#[derive(Debug)]
pub struct ProcessRunner {
    debug: bool,
}

impl ProcessRunner {
    /// Create a new process runner
    #[must_use]
    pub const fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Run a command with arguments, inheriting stdout/stderr
    #[instrument(skip(self))]
    pub fn run_command(&self, command: &str, args: &[&str]) -> Result<()> {
        let cmd_str = if args.is_empty() {
            command.to_string()
        } else {
            format!("{} {}", command, args.join(" "))
        };

        if self.debug {
            debug!("Running command: {}", cmd_str);
        } else {
            info!("+ {}", cmd_str);
        }

        let status = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| DebError::process_spawn(cmd_str.clone(), e))?;

        if !status.success() {
            return Err(DebError::process(cmd_str, status.code()));
        }

        debug!("Command completed successfully");
        Ok(())
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(false)
    }
}
