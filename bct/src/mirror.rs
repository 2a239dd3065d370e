//! Source tree discovery and destination skeleton mirroring.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::core::manifest::{Manifest, ManifestEntry};
use crate::io::fs::{DirCreation, Filesystem};
use crate::io::run_log::RunLog;

/// Canonical directories from the walk root down to the current directory.
///
/// Symlinked directories are followed, so a link resolving to one of its own
/// ancestors would otherwise recurse until the OS gives up.
struct WalkStack {
    canonical: Vec<PathBuf>,
}

impl WalkStack {
    fn new<F: Filesystem>(fs: &F, root: &Path) -> Self {
        Self {
            canonical: vec![fs.canonicalize(root).unwrap_or_else(|_| root.to_path_buf())],
        }
    }

    /// Enter `dir`; false when it resolves to an ancestor and must be skipped.
    fn enter<F: Filesystem>(&mut self, fs: &F, dir: &Path) -> bool {
        let resolved = fs.canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        if self.canonical.contains(&resolved) {
            return false;
        }
        self.canonical.push(resolved);
        true
    }

    fn leave(&mut self) {
        self.canonical.pop();
    }
}

/// Walk `source_root` depth-first and collect every file and directory.
///
/// Each directory entry is appended before its contents, and its contents
/// before the directory's later siblings. Unreadable directories and
/// directories that loop back to an ancestor are logged and skipped; an
/// unreadable root yields an empty manifest.
#[instrument(skip_all, fields(root = %source_root.display()))]
pub fn build_manifest<F: Filesystem, L: RunLog>(
    fs: &F,
    source_root: &Path,
    log: &mut L,
) -> Manifest {
    let mut manifest = Manifest::new();
    let mut stack = WalkStack::new(fs, source_root);
    collect_entries(fs, source_root, &mut manifest, &mut stack, log);
    debug!(
        entries = manifest.len(),
        files = manifest.file_count(),
        "manifest built"
    );
    manifest
}

fn collect_entries<F: Filesystem, L: RunLog>(
    fs: &F,
    dir: &Path,
    manifest: &mut Manifest,
    stack: &mut WalkStack,
    log: &mut L,
) {
    let entries = match fs.list(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log.warning(&format!("Cannot read directory {}: {e}", dir.display()));
            return;
        }
    };
    for entry in entries {
        let path = dir.join(&entry.name);
        if !entry.is_directory {
            manifest.push(ManifestEntry::file(path));
            continue;
        }
        if !stack.enter(fs, &path) {
            log.warning(&format!(
                "Skipping directory cycle {}",
                path.display()
            ));
            continue;
        }
        manifest.push(ManifestEntry::directory(&path));
        collect_entries(fs, &path, manifest, stack, log);
        stack.leave();
    }
}

/// Recreate every directory under `source_root` beneath `dest_root`.
///
/// Existing destination directories are accepted, so repeated runs are
/// harmless. Other creation failures are logged as warnings and the walk
/// continues; files bound for such directories fail later on their own.
/// Directories looping back to an ancestor are not mirrored.
#[instrument(skip_all, fields(source = %source_root.display(), dest = %dest_root.display()))]
pub fn mirror_directories<F: Filesystem, L: RunLog>(
    fs: &F,
    source_root: &Path,
    dest_root: &Path,
    log: &mut L,
) {
    let mut stack = WalkStack::new(fs, source_root);
    mirror_level(fs, source_root, dest_root, &mut stack, log);
}

fn mirror_level<F: Filesystem, L: RunLog>(
    fs: &F,
    source_dir: &Path,
    dest_dir: &Path,
    stack: &mut WalkStack,
    log: &mut L,
) {
    let entries = match fs.list(source_dir) {
        Ok(entries) => entries,
        Err(e) => {
            log.warning(&format!(
                "Cannot read directory {}: {e}",
                source_dir.display()
            ));
            return;
        }
    };
    for entry in entries.iter().filter(|entry| entry.is_directory) {
        let source = source_dir.join(&entry.name);
        if !stack.enter(fs, &source) {
            debug!(dir = %source.display(), "not mirroring directory cycle");
            continue;
        }
        let target = dest_dir.join(&entry.name);
        match fs.create_dir(&target) {
            Ok(DirCreation::Created) => debug!(dir = %target.display(), "created directory"),
            Ok(DirCreation::AlreadyExists) => {}
            Err(e) => log.warning(&format!(
                "Cannot create directory {}: {e}",
                target.display()
            )),
        }
        mirror_level(fs, &source, &target, stack, log);
        stack.leave();
    }
}

/// Indented listing of the tree under `root`: two spaces per level,
/// directories rendered as `[name]/`, cycles as `[name]/ (cycle)`.
pub fn render_tree<F: Filesystem>(fs: &F, root: &Path) -> String {
    let mut out = String::new();
    let mut stack = WalkStack::new(fs, root);
    render_level(fs, root, 0, &mut stack, &mut out);
    out
}

fn render_level<F: Filesystem>(
    fs: &F,
    dir: &Path,
    depth: usize,
    stack: &mut WalkStack,
    out: &mut String,
) {
    let Ok(entries) = fs.list(dir) else {
        return;
    };
    for entry in entries {
        out.push_str(&"  ".repeat(depth));
        if !entry.is_directory {
            out.push_str(&entry.name);
            out.push('\n');
            continue;
        }
        let path = dir.join(&entry.name);
        if !stack.enter(fs, &path) {
            out.push_str(&format!("[{}]/ (cycle)\n", entry.name));
            continue;
        }
        out.push_str(&format!("[{}]/\n", entry.name));
        render_level(fs, &path, depth + 1, stack, out);
        stack.leave();
    }
}
