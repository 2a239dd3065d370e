//! Side-effecting collaborators for batch runs.

pub mod config;
pub mod fs;
pub mod process;
pub mod run_log;
