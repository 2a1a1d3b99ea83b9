//! CLI command implementations
//!
//! Each command returns the process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success (including runs with per-file failures), dry run or nothing to do |
//! | 2 | Configuration error |
//! | 3 | Run aborted by the circuit breaker |
//! | 4 | Initialization failure (warehouse, HTTP client) |
//! | 5 | Fatal error |
//! | 130 | Interrupted |

pub mod download;
pub mod init;
pub mod status;
pub mod validate;

/// Exit code for a successful command
pub const EXIT_OK: i32 = 0;
/// Exit code for configuration problems
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for a run stopped by the circuit breaker
pub const EXIT_ABORTED: i32 = 3;
/// Exit code for initialization failures
pub const EXIT_INIT: i32 = 4;
/// Exit code for fatal errors
pub const EXIT_FATAL: i32 = 5;
/// Exit code for an interrupted run
pub const EXIT_INTERRUPTED: i32 = 130;
