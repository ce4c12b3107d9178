//! Exit codes for the `doctonote` CLI.
//!
//! `--strict` runs that served a fallback exit with
//! [`ResolutionError::exit_code`](doctonote_core::ResolutionError::exit_code).

pub const SUCCESS: i32 = 0;
pub const CONFIG_ERROR: i32 = 2; // Bad config, unreadable input or store
