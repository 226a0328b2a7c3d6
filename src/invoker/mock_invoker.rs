//! Scripted invoker for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::TicResult;

use super::{Invocation, InvocationOutput, Invoker};

/// Test double that replays scripted outputs and records every invocation.
///
/// Responses are consumed in FIFO order; once the script is exhausted the
/// mock keeps answering with an empty success, which keeps multi-call
/// sequences (power-up guards and the like) easy to script.
#[derive(Debug, Default)]
pub struct MockInvoker {
    responses: Mutex<VecDeque<InvocationOutput>>,
    calls: Mutex<Vec<Invocation>>,
}

impl MockInvoker {
    /// Create a mock with an empty script; every call succeeds silently.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response with the given stdout.
    pub fn push_stdout(&self, stdout: &str) {
        self.push_response(InvocationOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        });
    }

    /// Queue a failing response with the given exit code and stderr.
    pub fn push_failure(&self, exit_code: i32, stderr: &str) {
        self.push_response(InvocationOutput {
            stdout: String::new(),
            stderr: stderr.to_string(),
            exit_code: Some(exit_code),
        });
    }

    /// Queue an arbitrary response.
    pub fn push_response(&self, output: InvocationOutput) {
        lock_ignoring_poison(&self.responses).push_back(output);
    }

    /// Every invocation recorded so far, in call order.
    pub fn calls(&self) -> Vec<Invocation> {
        lock_ignoring_poison(&self.calls).clone()
    }

    /// Argument list of the recorded call at `index`.
    pub fn args_of_call(&self, index: usize) -> Option<Vec<String>> {
        lock_ignoring_poison(&self.calls)
            .get(index)
            .map(|inv| inv.args.clone())
    }
}

// A poisoned lock still holds the recorded calls.
fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl Invoker for MockInvoker {
    fn run(&self, invocation: &Invocation) -> TicResult<InvocationOutput> {
        lock_ignoring_poison(&self.calls).push(invocation.clone());

        let output = lock_ignoring_poison(&self.responses)
            .pop_front()
            .unwrap_or(InvocationOutput {
                stdout: String::new(),
                stderr: String::new(),
                exit_code: Some(0),
            });

        Ok(output)
    }
}
