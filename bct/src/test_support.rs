//! Test-only collaborators: scripted process runner, in-memory log, tree builder.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::io::process::ProcessRunner;
use crate::io::run_log::{LogLevel, RunLog};

/// Failed command captured by [`MemoryLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandErrorRecord {
    pub command: String,
    pub file: PathBuf,
    pub code: i32,
}

/// [`RunLog`] that keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    pub entries: Vec<(LogLevel, String)>,
    pub command_errors: Vec<CommandErrorRecord>,
}

impl MemoryLog {
    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, msg)| msg.as_str()).collect()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.entries.iter().filter(|(lvl, _)| *lvl == level).count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|(_, msg)| msg.contains(needle))
    }

    /// Messages containing `needle`, in log order.
    pub fn matching(&self, needle: &str) -> Vec<&str> {
        self.entries
            .iter()
            .map(|(_, msg)| msg.as_str())
            .filter(|msg| msg.contains(needle))
            .collect()
    }
}

impl RunLog for MemoryLog {
    fn log(&mut self, level: LogLevel, message: &str) {
        self.entries.push((level, message.to_string()));
    }

    fn command_error(&mut self, command: &str, file: &Path, code: i32) {
        self.command_errors.push(CommandErrorRecord {
            command: command.to_string(),
            file: file.to_path_buf(),
            code,
        });
    }
}

/// [`ProcessRunner`] that never spawns anything.
///
/// A command exits with `fail_code` when it contains one of `fail_on`, errors
/// as a spawn failure when it contains one of `spawn_error_on`, and exits 0
/// otherwise. Every command is recorded.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    pub fail_on: Vec<String>,
    pub spawn_error_on: Vec<String>,
    pub fail_code: i32,
    pub commands: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing_on(needles: &[&str]) -> Self {
        Self {
            fail_on: needles.iter().map(|s| s.to_string()).collect(),
            fail_code: 1,
            ..Self::default()
        }
    }

    pub fn spawn_error_on(needles: &[&str]) -> Self {
        Self {
            spawn_error_on: needles.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, command: &str) -> Result<Option<i32>> {
        self.commands.borrow_mut().push(command.to_string());
        if self.spawn_error_on.iter().any(|n| command.contains(n)) {
            return Err(anyhow!("scripted spawn failure"));
        }
        if self.fail_on.iter().any(|n| command.contains(n)) {
            return Ok(Some(self.fail_code));
        }
        Ok(Some(0))
    }
}

/// Create files (content = their relative path) and `dir/` entries under `root`.
pub fn write_tree(root: &Path, entries: &[&str]) -> Result<()> {
    fs::create_dir_all(root)?;
    for entry in entries {
        if let Some(dir) = entry.strip_suffix('/') {
            fs::create_dir_all(root.join(dir))?;
            continue;
        }
        let path = root.join(entry);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, entry)?;
    }
    Ok(())
}
