//! Batch Command Tree: mirror a directory tree while running a command on
//! every file.
//!
//! The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (manifest, exclusion, template
//!   rendering, progress accounting). No I/O.
//! - **[`io`]**: Side-effecting collaborators (filesystem, process execution,
//!   run logs, config) behind traits so runs can be driven by fakes in tests.
//!
//! Orchestration modules ([`mirror`], [`engine`], [`batch`]) combine the two
//! to implement the CLI.

pub mod batch;
pub mod core;
pub mod engine;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod mirror;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
