//! Process-execution collaborator for rendered commands.

use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::{debug, error, instrument};

/// Abstraction over running a rendered command line.
pub trait ProcessRunner {
    /// Run `command` to completion.
    ///
    /// Returns the exit code, `None` when the child exited without one, and an
    /// error when the command could not be spawned.
    fn run(&self, command: &str) -> Result<Option<i32>>;
}

/// Runs commands through the host shell with inherited stdio, so the invoked
/// tool's own output stays visible.
///
/// Blocks until the child exits; there is no timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
    fn shell_command(command: &str) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }
    }
}

impl ProcessRunner for ShellRunner {
    #[instrument(skip(self))]
    fn run(&self, command: &str) -> Result<Option<i32>> {
        let mut cmd = Self::shell_command(command);
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        debug!("spawning shell");
        let status = match cmd.status() {
            Ok(status) => status,
            Err(e) => {
                error!(err = %e, "failed to spawn command");
                return Err(e).context("spawn command");
            }
        };
        debug!(exit_code = ?status.code(), "command finished");
        Ok(status.code())
    }
}
