//! Shared deterministic types for batch core logic.

use serde::Serialize;

/// Exit code recorded when the child produced none (spawn failure, signal).
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// Classification of one external command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum CommandStatus {
    Succeeded,
    /// Non-zero exit, termination without an exit code, or spawn failure.
    Failed { code: i32 },
}

impl CommandStatus {
    /// Any non-zero exit is a failure; partial-success codes are not special.
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => CommandStatus::Succeeded,
            Some(code) => CommandStatus::Failed { code },
            None => CommandStatus::Failed {
                code: UNKNOWN_EXIT_CODE,
            },
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, CommandStatus::Succeeded)
    }
}

/// Result of the fallback-copy step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// Copy-on-error is off.
    Disabled,
    Copied,
    CopyFailed,
}

/// Terminal state of a manifest entry after one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOutcome {
    /// Directories are mirrored up front and never executed.
    Directory,
    /// Skipped by the exclusion list; carries the fallback-copy result.
    Excluded(Fallback),
    Succeeded,
    FailedFallbackCopied,
    FailedFallbackFailed,
    FailedNoFallback,
}

impl EntryOutcome {
    /// Terminal state for an attempted entry.
    pub fn attempted(status: CommandStatus, fallback: Fallback) -> Self {
        match (status, fallback) {
            (CommandStatus::Succeeded, _) => EntryOutcome::Succeeded,
            (CommandStatus::Failed { .. }, Fallback::Copied) => EntryOutcome::FailedFallbackCopied,
            (CommandStatus::Failed { .. }, Fallback::CopyFailed) => {
                EntryOutcome::FailedFallbackFailed
            }
            (CommandStatus::Failed { .. }, Fallback::Disabled) => EntryOutcome::FailedNoFallback,
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            EntryOutcome::FailedFallbackCopied
                | EntryOutcome::FailedFallbackFailed
                | EntryOutcome::FailedNoFallback
        )
    }
}
