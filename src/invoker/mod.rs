//! Process-boundary abstraction for the vendor CLI.
//!
//! This module contains implementations of the [`Invoker`] trait, the seam
//! between the driver and the external `ticcmd` executable. The real
//! [`ProcessInvoker`] spawns a child process; the [`MockInvoker`] replays
//! scripted outputs and records argument lists for tests.

pub mod mock_invoker;
pub mod process_invoker;

pub use mock_invoker::MockInvoker;
pub use process_invoker::ProcessInvoker;

use std::path::{Path, PathBuf};

use crate::error::TicResult;

/// One command-line call: program name plus argument list.
///
/// Constructed immediately before execution and discarded after the call
/// returns; it carries no state of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Path or name of the executable to run.
    pub program: PathBuf,
    /// Arguments, in order, excluding the program name.
    pub args: Vec<String>,
}

impl Invocation {
    /// Build an invocation from anything iterable as argument strings.
    pub fn new<I, S>(program: &Path, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_path_buf(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Render the call as a single loggable line.
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Captured result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOutput {
    /// Captured stdout, decoded as UTF-8 (lossy).
    pub stdout: String,
    /// Captured stderr, decoded as UTF-8 (lossy).
    pub stderr: String,
    /// Exit code, or `None` if the child was killed by a signal.
    pub exit_code: Option<i32>,
}

impl InvocationOutput {
    /// Whether the child exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes one command-line invocation synchronously.
///
/// Implementations block the calling thread until the subprocess (or its
/// stand-in) completes, and must spawn at most one child per call.
pub trait Invoker: Send + Sync {
    /// Run the invocation and capture its output and exit status.
    fn run(&self, invocation: &Invocation) -> TicResult<InvocationOutput>;
}

// Lets tests hand the controller a shared handle to a MockInvoker and keep
// another for assertions.
impl<T: Invoker + ?Sized> Invoker for std::sync::Arc<T> {
    fn run(&self, invocation: &Invocation) -> TicResult<InvocationOutput> {
        (**self).run(invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_display() {
        let inv = Invocation::new(Path::new("ticcmd"), ["-d", "12345", "--energize"]);
        assert_eq!(inv.display(), "ticcmd -d 12345 --energize");
    }

    #[test]
    fn test_output_success() {
        let out = InvocationOutput {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: Some(0),
        };
        assert!(out.success());

        let failed = InvocationOutput {
            exit_code: Some(1),
            ..out.clone()
        };
        assert!(!failed.success());

        let signalled = InvocationOutput {
            exit_code: None,
            ..out
        };
        assert!(!signalled.success());
    }
}
