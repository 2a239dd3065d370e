//! Batch configuration loaded from `bct.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::io::run_log::LogMode;

pub const DEFAULT_CONFIG_FILE: &str = "bct.toml";

/// Defaults for `bct run` (TOML). Command-line flags take precedence.
///
/// Missing fields default to the values of [`BatchConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BatchConfig {
    /// Extensions to skip, e.g. `"jpg, png; txt"`.
    pub exclude: String,

    /// Copy the source file to the mirrored destination when its command fails.
    pub copy_on_error: bool,

    /// Directory receiving `bct.log` and `error.log`.
    pub log_dir: PathBuf,

    pub log_mode: LogMode,

    /// Suppress console echo of run log messages.
    pub quiet: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            exclude: String::new(),
            copy_on_error: false,
            log_dir: PathBuf::from("."),
            log_mode: LogMode::Append,
            quiet: false,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.log_dir.as_os_str().is_empty() {
            return Err(anyhow!("log_dir must not be empty"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `BatchConfig::default()`.
pub fn load_config(path: &Path) -> Result<BatchConfig> {
    if !path.exists() {
        let cfg = BatchConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BatchConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, BatchConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bct.toml");
        fs::write(&path, "exclude = \"jpg png\"\nlog_mode = \"overwrite\"\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.exclude, "jpg png");
        assert_eq!(cfg.log_mode, LogMode::Overwrite);
        assert!(!cfg.copy_on_error);
        assert_eq!(cfg.log_dir, PathBuf::from("."));
    }

    #[test]
    fn empty_log_dir_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bct.toml");
        fs::write(&path, "log_dir = \"\"\n").expect("write");

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("log_dir"));
    }

    #[test]
    fn unknown_log_mode_fails_to_parse() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bct.toml");
        fs::write(&path, "log_mode = \"rotate\"\n").expect("write");

        assert!(load_config(&path).is_err());
    }
}
