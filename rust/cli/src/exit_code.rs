//! Process exit codes returned by [`crate::run`].

pub const SUCCESS: i32 = 0;

/// Usage errors, invalid input and failed commands.
pub const ERROR: i32 = 2;

/// Interrupted by the user (Ctrl+C convention).
pub const INTERRUPTED: i32 = 130;
