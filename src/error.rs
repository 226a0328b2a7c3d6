//! Custom error types for the driver.
//!
//! This module defines the primary error type, `TicError`, for the entire
//! crate. Using the `thiserror` crate, it provides a centralized and
//! consistent way to distinguish the three layers a call can fail in:
//!
//! - **`ProgramNotFound`**: the `ticcmd` executable is not installed or not
//!   on the search path. Fatal, surfaced immediately, never retried.
//! - **`Command`**: the tool ran but exited non-zero (device unplugged,
//!   parameter rejected by the firmware, USB permission failure). Carries
//!   the exit code and the captured stderr text so callers can report the
//!   firmware's own message.
//! - **`Parse`**: the tool exited zero but its stdout did not match the
//!   expected format for the query. The driver never returns a
//!   partially-populated or fabricated status in this case.
//!
//! `Io`, `Config`, and `Configuration` cover subprocess I/O, config-file
//! parsing, and semantic config validation respectively. By using `#[from]`,
//! `TicError` can be seamlessly created from underlying error types with
//! the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for results using the driver error type.
pub type TicResult<T> = std::result::Result<T, TicError>;

/// Error type for all fallible operations in this crate.
#[derive(Error, Debug)]
pub enum TicError {
    /// The external executable could not be found on the search path.
    #[error("program '{}' not found; is the Pololu Tic software installed?", .0.display())]
    ProgramNotFound(PathBuf),

    /// The external tool exited with a non-zero status.
    ///
    /// `exit_code` is `None` when the child was killed by a signal.
    #[error("ticcmd exited with {code}: {stderr}", code = display_exit(.exit_code))]
    Command {
        /// Exit code reported by the subprocess, if it exited normally.
        exit_code: Option<i32>,
        /// Captured stderr text, trimmed.
        stderr: String,
    },

    /// Status output did not match the expected `field: value` format.
    #[error("failed to parse status output: {0}")]
    Parse(String),

    /// Subprocess I/O error other than a missing executable.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration parsed but contained an invalid value.
    #[error("configuration validation error: {0}")]
    Configuration(String),
}

fn display_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {c}"),
        None => "signal".to_string(),
    }
}
