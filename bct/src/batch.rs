//! Orchestration for a full `bct run`.
//!
//! A run has two strictly ordered phases: the destination directory skeleton
//! is mirrored first, then every file in the manifest is handled in discovery
//! order (exclusion check, render, execute, fallback, progress). Per-file
//! failures are logged and never abort the run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{info, instrument};

use crate::core::accountant::{RunAccountant, RunCounters};
use crate::core::exclusion::ExclusionList;
use crate::core::manifest::ManifestEntry;
use crate::core::template::{CommandTemplate, is_quotable, output_base_name};
use crate::core::types::{EntryOutcome, Fallback};
use crate::engine::ExecutionEngine;
use crate::io::fs::Filesystem;
use crate::io::process::ProcessRunner;
use crate::io::run_log::RunLog;
use crate::mirror::{build_manifest, mirror_directories};

/// Inputs for one batch run.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Source tree to walk.
    pub input_root: PathBuf,
    /// Destination root; created if missing.
    pub output_root: PathBuf,
    pub template: CommandTemplate,
    pub exclusions: ExclusionList,
    /// Copy the source file to its mirrored path when a command fails, and
    /// for excluded files.
    pub copy_on_error: bool,
}

/// Aggregate result of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    #[serde(flatten)]
    pub counters: RunCounters,
    pub directories: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub fallback_copies: usize,
    pub fallback_failures: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Directory => self.directories += 1,
            EntryOutcome::Excluded(fallback) => self.record_fallback(fallback),
            EntryOutcome::Succeeded => self.succeeded += 1,
            EntryOutcome::FailedFallbackCopied => {
                self.failed += 1;
                self.fallback_copies += 1;
            }
            EntryOutcome::FailedFallbackFailed => {
                self.failed += 1;
                self.fallback_failures += 1;
            }
            EntryOutcome::FailedNoFallback => self.failed += 1,
        }
    }

    fn record_fallback(&mut self, fallback: Fallback) {
        match fallback {
            Fallback::Copied => self.fallback_copies += 1,
            Fallback::CopyFailed => self.fallback_failures += 1,
            Fallback::Disabled => {}
        }
    }
}

/// Check the hard-stop conditions before any work begins.
///
/// The input root must be an existing, listable directory and the output root
/// must be creatable. An output root inside the input root is rejected because
/// mirroring would recurse into its own output; this is checked before the
/// output root is created so a rejected run leaves nothing behind.
pub fn preflight<F: Filesystem>(fs: &F, request: &BatchRequest) -> Result<()> {
    let input = &request.input_root;
    if !fs.exists(input) {
        bail!(
            "input path does not exist or cannot be accessed: {}",
            input.display()
        );
    }
    if !fs.is_dir(input) {
        bail!("input path is not a directory: {}", input.display());
    }
    fs.list(input)
        .with_context(|| format!("input path cannot be read: {}", input.display()))?;

    let input_abs = fs
        .canonicalize(input)
        .with_context(|| format!("resolve {}", input.display()))?;
    let output_abs = resolve_prospective(fs, &request.output_root)?;
    if output_abs.starts_with(&input_abs) {
        bail!(
            "output path {} must not be inside input path {}",
            request.output_root.display(),
            input.display()
        );
    }

    fs.create_dir_all(&request.output_root)
        .with_context(|| format!("create output directory {}", request.output_root.display()))?;
    Ok(())
}

/// Absolute form of a path that may not exist yet: the nearest existing
/// ancestor is canonicalized and the missing components are appended.
fn resolve_prospective<F: Filesystem>(fs: &F, path: &Path) -> Result<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();
    while !fs.exists(existing) {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }
    let base = if existing.as_os_str().is_empty() {
        Path::new(".")
    } else {
        existing
    };
    let mut resolved = fs
        .canonicalize(base)
        .with_context(|| format!("resolve {}", path.display()))?;
    for name in missing.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

/// Run the whole batch: preflight, manifest, mirror, then per-file processing.
///
/// Only preflight failures are returned as errors.
#[instrument(skip_all, fields(input = %request.input_root.display(), output = %request.output_root.display()))]
pub fn run_batch<F, P, L>(
    fs: &F,
    runner: &P,
    request: &BatchRequest,
    log: &mut L,
) -> Result<RunSummary>
where
    F: Filesystem,
    P: ProcessRunner,
    L: RunLog,
{
    preflight(fs, request)?;
    log.info(&format!(
        "Batch run: {} -> {}",
        request.input_root.display(),
        request.output_root.display()
    ));
    log.info(&format!("Command template: {}", request.template));
    if !request.template.has_input_token() {
        log.warning("Command template has no %i placeholder; every file runs the same command");
    }

    let manifest = build_manifest(fs, &request.input_root, log);
    mirror_directories(fs, &request.input_root, &request.output_root, log);

    let engine = ExecutionEngine::new(runner, fs, request.copy_on_error);
    let mut accountant = RunAccountant::for_manifest(&manifest);
    let mut summary = RunSummary::default();

    log.info("Starting file processing...");
    for entry in &manifest {
        let outcome = process_entry(entry, request, &engine, &mut accountant, log);
        summary.record(outcome);
    }

    summary.counters = accountant.counters();
    log.info(&format!(
        "Processing completed: {} processed, {} excluded, {} failed",
        summary.counters.processed_files, summary.counters.excluded_files, summary.failed
    ));
    info!(?summary, "batch finished");
    Ok(summary)
}

fn process_entry<F, P, L>(
    entry: &ManifestEntry,
    request: &BatchRequest,
    engine: &ExecutionEngine<'_, P, F>,
    accountant: &mut RunAccountant,
    log: &mut L,
) -> EntryOutcome
where
    F: Filesystem,
    P: ProcessRunner,
    L: RunLog,
{
    if entry.is_directory {
        return EntryOutcome::Directory;
    }
    let source = entry.path.as_path();
    let display = source.display().to_string();
    let dest = request.output_root.join(entry.relative_to(&request.input_root));

    if request.exclusions.matches(&entry.file_name()) {
        log.info(&accountant.excluding_line(&display));
        accountant.record_excluded();
        log.info(&accountant.progress_line());
        let fallback = engine.on_failure(source, &dest, log);
        log.info(&accountant.progress_line());
        return EntryOutcome::Excluded(fallback);
    }

    log.info(&accountant.processing_line(&display));
    let output_dir = dest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| request.output_root.clone());
    if !is_quotable(&display) || !is_quotable(&output_dir.to_string_lossy()) {
        log.warning(&format!(
            "Path contains a double quote, rendered command may be malformed: {display}"
        ));
    }
    let command = request
        .template
        .render(source, &output_dir, &output_base_name(source));
    let outcome = engine.run_entry(&command, source, &dest, log);
    accountant.record_processed();
    log.info(&accountant.progress_line());
    outcome
}
