//! Batch Command Tree (BCT) CLI.
//!
//! Mirrors an input directory tree into an output tree and runs a command
//! template on every file, e.g. `bct run in out -c "ffmpeg -i %i %o.mp4"`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bct::batch::{BatchRequest, run_batch};
use bct::core::exclusion::ExclusionList;
use bct::core::template::CommandTemplate;
use bct::exit_codes;
use bct::io::config::{BatchConfig, DEFAULT_CONFIG_FILE, load_config};
use bct::io::fs::StdFilesystem;
use bct::io::process::ShellRunner;
use bct::io::run_log::{ConsoleEcho, FileRunLog, LogMode, RunLog};
use bct::logging;
use bct::mirror::render_tree;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bct",
    version,
    about = "Mirror a directory tree while running a command on every file"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Mirror INPUT into OUTPUT, running the command template on each file.
    Run(RunArgs),
    /// Print the file tree under PATH.
    Tree {
        path: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Folder to process.
    input: PathBuf,
    /// Destination root; created if missing.
    output: PathBuf,
    /// Command template: `%i` is the quoted input file, `%o` the quoted output
    /// path without extension.
    #[arg(short, long)]
    command: String,
    /// Extensions to skip, separated by spaces, commas or semicolons.
    #[arg(short, long)]
    exclude: Option<String>,
    /// Copy the source file to the output tree when its command fails.
    #[arg(long)]
    copy_on_error: bool,
    /// Directory for `bct.log` and `error.log`.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[arg(long, value_enum)]
    log_mode: Option<LogMode>,
    /// Config file (defaults to `bct.toml` when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Do not echo log messages to the console.
    #[arg(short, long)]
    quiet: bool,
    /// Print the run summary as JSON on stdout; log echo moves to stderr.
    #[arg(long)]
    json: bool,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => cmd_run(args),
        Command::Tree { path } => cmd_tree(&path),
    }
}

fn cmd_run(args: RunArgs) -> Result<i32> {
    let cfg = resolve_config(&args)?;
    let request = BatchRequest {
        input_root: args.input,
        output_root: args.output,
        template: CommandTemplate::new(args.command),
        exclusions: ExclusionList::parse(&cfg.exclude),
        copy_on_error: cfg.copy_on_error,
    };

    let echo = match (cfg.quiet, args.json) {
        (true, _) => ConsoleEcho::Off,
        (false, true) => ConsoleEcho::Stderr,
        (false, false) => ConsoleEcho::Stdout,
    };
    let mut log = FileRunLog::open(&cfg.log_dir, cfg.log_mode, echo);
    let summary = match run_batch(&StdFilesystem, &ShellRunner, &request, &mut log) {
        Ok(summary) => summary,
        Err(err) => {
            log.error(&format!("{err:#}"));
            return Err(err);
        }
    };
    drop(log);

    if args.json {
        let payload = serde_json::to_string_pretty(&summary).context("serialize summary")?;
        println!("{payload}");
    }
    Ok(exit_codes::OK)
}

fn cmd_tree(path: &Path) -> Result<i32> {
    if !path.is_dir() {
        bail!("not a directory: {}", path.display());
    }
    print!("{}", render_tree(&StdFilesystem, path));
    Ok(exit_codes::OK)
}

/// Config file values overridden by command-line flags.
fn resolve_config(args: &RunArgs) -> Result<BatchConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            load_config(path)?
        }
        None => load_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    if let Some(exclude) = &args.exclude {
        cfg.exclude = exclude.clone();
    }
    if args.copy_on_error {
        cfg.copy_on_error = true;
    }
    if let Some(dir) = &args.log_dir {
        cfg.log_dir = dir.clone();
    }
    if let Some(mode) = args.log_mode {
        cfg.log_mode = mode;
    }
    if args.quiet {
        cfg.quiet = true;
    }
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(cli: Cli) -> RunArgs {
        match cli.command {
            Command::Run(args) => args,
            Command::Tree { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn parse_run_minimal() {
        let cli = Cli::parse_from(["bct", "run", "in", "out", "-c", "echo %i"]);
        let args = run_args(cli);
        assert_eq!(args.input, PathBuf::from("in"));
        assert_eq!(args.output, PathBuf::from("out"));
        assert_eq!(args.command, "echo %i");
        assert!(!args.copy_on_error);
        assert!(args.log_mode.is_none());
    }

    #[test]
    fn parse_run_all_flags() {
        let cli = Cli::parse_from([
            "bct",
            "run",
            "in",
            "out",
            "--command",
            "ffmpeg -i %i %o.mp4",
            "--exclude",
            "jpg,png",
            "--copy-on-error",
            "--log-dir",
            "logs",
            "--log-mode",
            "overwrite",
            "--quiet",
            "--json",
        ]);
        let args = run_args(cli);
        assert_eq!(args.exclude.as_deref(), Some("jpg,png"));
        assert!(args.copy_on_error);
        assert_eq!(args.log_mode, Some(LogMode::Overwrite));
        assert!(args.quiet);
        assert!(args.json);
    }

    #[test]
    fn parse_tree() {
        let cli = Cli::parse_from(["bct", "tree", "some/dir"]);
        assert!(matches!(cli.command, Command::Tree { path } if path == Path::new("some/dir")));
    }

    #[test]
    fn flags_override_config_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = temp.path().join("custom.toml");
        std::fs::write(&config, "exclude = \"txt\"\ncopy_on_error = false\n").expect("write");

        let cli = Cli::parse_from([
            "bct",
            "run",
            "in",
            "out",
            "-c",
            "echo",
            "--config",
            config.to_str().expect("utf8"),
            "--exclude",
            "md",
            "--copy-on-error",
        ]);
        let cfg = resolve_config(&run_args(cli)).expect("resolve");
        assert_eq!(cfg.exclude, "md");
        assert!(cfg.copy_on_error);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let cli = Cli::parse_from([
            "bct",
            "run",
            "in",
            "out",
            "-c",
            "echo",
            "--config",
            "/definitely/not/here.toml",
        ]);
        assert!(resolve_config(&run_args(cli)).is_err());
    }
}
