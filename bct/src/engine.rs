//! Per-file command execution with optional fallback copy.

use std::path::Path;

use tracing::{debug, instrument};

use crate::core::types::{CommandStatus, EntryOutcome, Fallback, UNKNOWN_EXIT_CODE};
use crate::io::fs::Filesystem;
use crate::io::process::ProcessRunner;
use crate::io::run_log::RunLog;

/// Runs rendered commands and recovers from failures by copying the source.
pub struct ExecutionEngine<'a, P: ProcessRunner, F: Filesystem> {
    runner: &'a P,
    fs: &'a F,
    copy_on_error: bool,
}

impl<'a, P: ProcessRunner, F: Filesystem> ExecutionEngine<'a, P, F> {
    pub fn new(runner: &'a P, fs: &'a F, copy_on_error: bool) -> Self {
        Self {
            runner,
            fs,
            copy_on_error,
        }
    }

    /// Run `command` synchronously and classify the result.
    ///
    /// Spawn failures are classified like a non-zero exit.
    #[instrument(skip(self, log))]
    pub fn execute<L: RunLog>(&self, command: &str, log: &mut L) -> CommandStatus {
        match self.runner.run(command) {
            Ok(code) => CommandStatus::from_exit_code(code),
            Err(e) => {
                log.error(&format!("Cannot start command: {e:#}"));
                CommandStatus::Failed {
                    code: UNKNOWN_EXIT_CODE,
                }
            }
        }
    }

    /// Copy `source` to `dest` if copy-on-error is enabled.
    ///
    /// A failed copy is logged and reported through the return value only.
    pub fn on_failure<L: RunLog>(&self, source: &Path, dest: &Path, log: &mut L) -> Fallback {
        if !self.copy_on_error {
            return Fallback::Disabled;
        }
        log.info(&format!(
            "Attempting to copy source file: {} -> {}",
            source.display(),
            dest.display()
        ));
        match self.fs.copy_file(source, dest) {
            Ok(()) => {
                log.info(&format!(
                    "Copy successful: {} -> {}",
                    source.display(),
                    dest.display()
                ));
                Fallback::Copied
            }
            Err(e) => {
                log.error(&format!(
                    "Failed to copy file {} -> {}: {e}",
                    source.display(),
                    dest.display()
                ));
                Fallback::CopyFailed
            }
        }
    }

    /// Execute one file's command and apply the failure policy.
    pub fn run_entry<L: RunLog>(
        &self,
        command: &str,
        source: &Path,
        dest: &Path,
        log: &mut L,
    ) -> EntryOutcome {
        log.info(&format!("Executing: {command}"));
        let status = self.execute(command, log);
        let fallback = match status {
            CommandStatus::Succeeded => {
                log.info(&format!("Command executed successfully: {}", source.display()));
                Fallback::Disabled
            }
            CommandStatus::Failed { code } => {
                log.error(&format!(
                    "Command execution failed (code: {code}): {}",
                    source.display()
                ));
                log.command_error(command, source, code);
                self.on_failure(source, dest, log)
            }
        };
        let outcome = EntryOutcome::attempted(status, fallback);
        debug!(?outcome, "entry finished");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::fs::StdFilesystem;
    use crate::io::run_log::LogLevel;
    use crate::test_support::{MemoryLog, ScriptedRunner};
    use std::fs;

    #[test]
    fn success_does_not_copy() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("a.txt");
        fs::write(&source, "a").expect("write");
        let dest = temp.path().join("out/a.txt");

        let runner = ScriptedRunner::succeeding();
        let engine = ExecutionEngine::new(&runner, &StdFilesystem, true);
        let mut log = MemoryLog::default();

        let outcome = engine.run_entry("echo ok", &source, &dest, &mut log);
        assert_eq!(outcome, EntryOutcome::Succeeded);
        assert!(!dest.exists());
        assert!(log.command_errors.is_empty());
    }

    #[test]
    fn failure_with_copy_on_error_copies_source() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("a.txt");
        fs::write(&source, "payload").expect("write");
        let dest = temp.path().join("out/nested/a.txt");

        let runner = ScriptedRunner::failing_on(&["convert"]);
        let engine = ExecutionEngine::new(&runner, &StdFilesystem, true);
        let mut log = MemoryLog::default();

        let outcome = engine.run_entry("convert a.txt", &source, &dest, &mut log);
        assert_eq!(outcome, EntryOutcome::FailedFallbackCopied);
        assert_eq!(fs::read_to_string(&dest).expect("read"), "payload");
        assert_eq!(log.command_errors.len(), 1);
        assert_eq!(log.command_errors[0].code, 1);
        assert_eq!(log.command_errors[0].command, "convert a.txt");
    }

    #[test]
    fn failure_without_copy_on_error_leaves_dest_empty() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("a.txt");
        fs::write(&source, "payload").expect("write");
        let dest = temp.path().join("out/a.txt");

        let runner = ScriptedRunner::failing_on(&["convert"]);
        let engine = ExecutionEngine::new(&runner, &StdFilesystem, false);
        let mut log = MemoryLog::default();

        let outcome = engine.run_entry("convert a.txt", &source, &dest, &mut log);
        assert_eq!(outcome, EntryOutcome::FailedNoFallback);
        assert!(!dest.exists());
        assert!(!log.contains("Attempting to copy"));
    }

    #[test]
    fn failed_copy_is_reported_not_raised() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("missing.txt");
        let dest = temp.path().join("out/missing.txt");

        let runner = ScriptedRunner::failing_on(&["convert"]);
        let engine = ExecutionEngine::new(&runner, &StdFilesystem, true);
        let mut log = MemoryLog::default();

        let outcome = engine.run_entry("convert missing.txt", &source, &dest, &mut log);
        assert_eq!(outcome, EntryOutcome::FailedFallbackFailed);
        assert!(log.contains("Failed to copy file"));
        assert_eq!(log.count(LogLevel::Error), 2);
    }

    #[test]
    fn spawn_failure_is_classified_as_failure() {
        let runner = ScriptedRunner::spawn_error_on(&["nope"]);
        let engine = ExecutionEngine::new(&runner, &StdFilesystem, false);
        let mut log = MemoryLog::default();

        let status = engine.execute("nope", &mut log);
        assert_eq!(
            status,
            CommandStatus::Failed {
                code: UNKNOWN_EXIT_CODE
            }
        );
        assert!(log.contains("Cannot start command"));
    }
}
