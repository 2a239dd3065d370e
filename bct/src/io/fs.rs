//! Filesystem collaborator: enumeration, directory creation and copies.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

/// One name returned by a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_directory: bool,
}

/// Successful outcomes of a single-level directory creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirCreation {
    Created,
    AlreadyExists,
}

/// Abstraction over the host filesystem.
///
/// Listings never include the `.` and `..` pseudo-entries.
pub trait Filesystem {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;

    /// Create one directory level. Existing directories are not an error.
    fn create_dir(&self, path: &Path) -> io::Result<DirCreation>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Copy `source` over `dest`, creating missing parent directories.
    fn copy_file(&self, source: &Path, dest: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// [`Filesystem`] backed by `std::fs`.
///
/// Listings are sorted by name so that discovery order is reproducible across
/// hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFilesystem;

impl Filesystem for StdFilesystem {
    #[instrument(skip(self), fields(dir = %dir.display()))]
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == "." || name == ".." {
                continue;
            }
            // Follow symlinks so a link to a directory is walked like one.
            let is_directory = fs::metadata(entry.path())
                .map(|meta| meta.is_dir())
                .unwrap_or(false);
            entries.push(DirEntryInfo { name, is_directory });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = entries.len(), "listed directory");
        Ok(entries)
    }

    fn create_dir(&self, path: &Path) -> io::Result<DirCreation> {
        match fs::create_dir(path) {
            Ok(()) => Ok(DirCreation::Created),
            Err(err) if err.kind() == ErrorKind::AlreadyExists && path.is_dir() => {
                Ok(DirCreation::AlreadyExists)
            }
            Err(err) => Err(err),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn copy_file(&self, source: &Path, dest: &Path) -> io::Result<()> {
        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, dest)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}
