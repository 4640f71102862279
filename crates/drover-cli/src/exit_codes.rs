//! Process exit codes
//!
//! Pipelines only see the number, so each class of failure gets its own.

/// A step failed: helm exited non-zero, could not be started, or the command is unknown
pub const STEP_FAILURE: i32 = 1;

/// The plugin settings are unusable: conflicting, missing, or malformed
pub const CONFIG_ERROR: i32 = 2;

/// A file could not be read or written
pub const IO_ERROR: i32 = 5;
