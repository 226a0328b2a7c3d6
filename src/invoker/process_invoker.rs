//! Real subprocess invoker built on `std::process::Command`.

use std::io::ErrorKind;
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{TicError, TicResult};

use super::{Invocation, InvocationOutput, Invoker};

/// Spawns the vendor CLI as a child process and waits for it to exit.
///
/// Each call spawns exactly one child, blocks until it exits, and drains
/// both pipes before returning; `Command::output` reaps the child on every
/// exit path. There is no timeout: a hang in the external tool propagates
/// as a hang in the caller.
#[derive(Debug, Default, Clone)]
pub struct ProcessInvoker;

impl ProcessInvoker {
    /// Create a new process invoker.
    pub fn new() -> Self {
        Self
    }
}

impl Invoker for ProcessInvoker {
    fn run(&self, invocation: &Invocation) -> TicResult<InvocationOutput> {
        debug!("running: {}", invocation.display());

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    TicError::ProgramNotFound(invocation.program.clone())
                } else {
                    TicError::Io(e)
                }
            })?;

        let result = InvocationOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };

        debug!(
            "exit {:?}, {} bytes stdout, {} bytes stderr",
            result.exit_code,
            result.stdout.len(),
            result.stderr.len()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_missing_program_maps_to_program_not_found() {
        let invoker = ProcessInvoker::new();
        let inv = Invocation::new(Path::new("definitely-not-a-real-ticcmd"), ["--status"]);

        match invoker.run(&inv) {
            Err(TicError::ProgramNotFound(program)) => {
                assert_eq!(program, Path::new("definitely-not-a-real-ticcmd"));
            }
            other => panic!("expected ProgramNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_captures_stdout_and_exit_code() {
        // `true` is universally available and exits 0 with no output.
        let invoker = ProcessInvoker::new();
        let inv = Invocation::new(Path::new("true"), Vec::<String>::new());

        let out = invoker.run(&inv).unwrap();
        assert!(out.success());
        assert!(out.stdout.is_empty());
    }
}
