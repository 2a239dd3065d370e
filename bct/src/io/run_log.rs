//! Product run logs (`bct.log` and `error.log`).
//!
//! These are user-facing audit artifacts, separate from the `tracing`
//! diagnostics set up in [`crate::logging`]. Sinks are acquired once when the
//! run starts and released (footer + flush) when the [`FileRunLog`] is dropped.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const RUN_LOG_FILE: &str = "bct.log";
pub const ERROR_LOG_FILE: &str = "error.log";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Whether existing log files are truncated or appended to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    Overwrite,
    #[default]
    Append,
}

/// Where run log messages are echoed besides the log files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleEcho {
    Off,
    /// INFO to stdout, warnings and errors to stderr.
    #[default]
    Stdout,
    /// Everything to stderr, keeping stdout free for machine-readable output.
    Stderr,
}

/// Logging context passed explicitly through a run.
pub trait RunLog {
    fn log(&mut self, level: LogLevel, message: &str);

    /// Record a failed command in the error log.
    fn command_error(&mut self, command: &str, file: &Path, code: i32);

    fn info(&mut self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warning(&mut self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    fn error(&mut self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// [`RunLog`] writing timestamped lines to files in a log directory, and
/// optionally echoing messages to the console.
pub struct FileRunLog {
    run_log: Option<BufWriter<File>>,
    error_log: Option<BufWriter<File>>,
    echo: ConsoleEcho,
}

impl FileRunLog {
    /// Open both sinks under `dir`.
    ///
    /// A sink that cannot be opened is reported and skipped; the run proceeds
    /// without it.
    pub fn open(dir: &Path, mode: LogMode, echo: ConsoleEcho) -> Self {
        if let Err(e) = fs::create_dir_all(dir) {
            warn!(dir = %dir.display(), err = %e, "cannot create log directory");
        }
        let mut run_log = open_sink(&dir.join(RUN_LOG_FILE), mode);
        let mut error_log = open_sink(&dir.join(ERROR_LOG_FILE), mode);

        let now = timestamp();
        if let Some(sink) = run_log.as_mut() {
            write_line(sink, &format!("=== BCT Log Started at {now} ==="));
        }
        if let Some(sink) = error_log.as_mut() {
            write_line(sink, &format!("=== BCT Error Log Started at {now} ==="));
        }

        Self {
            run_log,
            error_log,
            echo,
        }
    }

    pub fn paths(dir: &Path) -> (PathBuf, PathBuf) {
        (dir.join(RUN_LOG_FILE), dir.join(ERROR_LOG_FILE))
    }
}

impl RunLog for FileRunLog {
    fn log(&mut self, level: LogLevel, message: &str) {
        debug!(target: "bct::run", %level, "{message}");
        match (self.echo, level) {
            (ConsoleEcho::Off, _) => {}
            (ConsoleEcho::Stdout, LogLevel::Info) => println!("{message}"),
            (ConsoleEcho::Stdout, _) => eprintln!("{level}: {message}"),
            (ConsoleEcho::Stderr, LogLevel::Info) => eprintln!("{message}"),
            (ConsoleEcho::Stderr, _) => eprintln!("{level}: {message}"),
        }
        if let Some(sink) = self.run_log.as_mut() {
            write_line(sink, &format!("[{}] [{level}] {message}", timestamp()));
        }
    }

    fn command_error(&mut self, command: &str, file: &Path, code: i32) {
        if let Some(sink) = self.error_log.as_mut() {
            let record = format!(
                "[{}] Command failed: {command}\nFile: {}\nError code: {code}\n",
                timestamp(),
                file.display()
            );
            write_line(sink, &record);
        }
    }
}

impl Drop for FileRunLog {
    fn drop(&mut self) {
        let now = timestamp();
        if let Some(sink) = self.run_log.as_mut() {
            write_line(sink, &format!("=== BCT Log Ended at {now} ===\n"));
        }
        if let Some(sink) = self.error_log.as_mut() {
            write_line(sink, &format!("=== BCT Error Log Ended at {now} ===\n"));
        }
    }
}

fn open_sink(path: &Path, mode: LogMode) -> Option<BufWriter<File>> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        LogMode::Overwrite => options.write(true).truncate(true),
        LogMode::Append => options.append(true),
    };
    match options.open(path) {
        Ok(file) => Some(BufWriter::new(file)),
        Err(e) => {
            eprintln!("Warning: Cannot open log file {}", path.display());
            warn!(path = %path.display(), err = %e, "cannot open log file");
            None
        }
    }
}

/// Write one line and flush so the file is current if the run is killed.
fn write_line(sink: &mut BufWriter<File>, line: &str) {
    let result = writeln!(sink, "{line}").and_then(|()| sink.flush());
    if let Err(e) = result {
        warn!(err = %e, "failed to write log line");
    }
}

fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
