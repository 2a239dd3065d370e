//! Stable exit codes for bct CLI commands.

/// The run visited every file, whatever the per-file outcomes were.
pub const OK: i32 = 0;
/// Invalid arguments or config, unreadable input root, or unwritable output root.
pub const INVALID: i32 = 1;
