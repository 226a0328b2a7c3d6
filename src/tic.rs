//! The Tic device handle.
//!
//! [`TicController`] exposes one method per supported `ticcmd` operation.
//! Each call builds an argument list, runs the tool once through the
//! configured [`Invoker`], and either parses stdout (status queries) or
//! checks the exit status (commands). The controller itself is stateless:
//! it holds only its settings, and every result reflects the hardware's
//! live state at call time.
//!
//! Range limits are not checked in software beyond the parameter types;
//! out-of-range values pass through and come back as a
//! [`TicError::Command`] carrying the firmware's stderr message.

use std::fmt;

use log::debug;

use crate::config::TicSettings;
use crate::error::{TicError, TicResult};
use crate::invoker::{Invocation, Invoker, ProcessInvoker};
use crate::status::Status;

/// Microstepping mode of the driver.
///
/// The numeric CLI token is microsteps per full step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// Full steps.
    Full,
    /// 1/2 step.
    Half,
    /// 1/4 step.
    Quarter,
    /// 1/8 step.
    Eighth,
    /// 1/16 step.
    Sixteenth,
    /// 1/32 step.
    ThirtySecond,
    /// 1/64 step.
    SixtyFourth,
    /// 1/128 step.
    OneTwentyEighth,
    /// 1/256 step.
    TwoFiftySixth,
}

impl StepMode {
    const ALL: [StepMode; 9] = [
        StepMode::Full,
        StepMode::Half,
        StepMode::Quarter,
        StepMode::Eighth,
        StepMode::Sixteenth,
        StepMode::ThirtySecond,
        StepMode::SixtyFourth,
        StepMode::OneTwentyEighth,
        StepMode::TwoFiftySixth,
    ];

    /// CLI token for `--step-mode`: microsteps per full step.
    pub fn cli_token(self) -> &'static str {
        match self {
            Self::Full => "1",
            Self::Half => "2",
            Self::Quarter => "4",
            Self::Eighth => "8",
            Self::Sixteenth => "16",
            Self::ThirtySecond => "32",
            Self::SixtyFourth => "64",
            Self::OneTwentyEighth => "128",
            Self::TwoFiftySixth => "256",
        }
    }

    /// Next finer mode, if any.
    pub fn finer(self) -> Option<Self> {
        let idx = Self::ALL.iter().position(|m| *m == self)?;
        Self::ALL.get(idx + 1).copied()
    }

    /// Next coarser mode, if any.
    pub fn coarser(self) -> Option<Self> {
        let idx = Self::ALL.iter().position(|m| *m == self)?;
        idx.checked_sub(1).and_then(|i| Self::ALL.get(i)).copied()
    }
}

impl fmt::Display for StepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1/{}", self.cli_token())
    }
}

/// Homing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the forward limit switch.
    Forward,
    /// Toward the reverse limit switch.
    Reverse,
}

impl Direction {
    fn cli_token(self) -> &'static str {
        match self {
            Self::Forward => "fwd",
            Self::Reverse => "rev",
        }
    }
}

/// Handle for one Tic controller, driven through the vendor CLI.
///
/// When [`TicSettings::serial`] is set, every invocation is prefixed with
/// `-d <serial>` so the right unit is addressed when several are attached.
pub struct TicController {
    settings: TicSettings,
    invoker: Box<dyn Invoker>,
}

impl TicController {
    /// Create a controller that spawns the real CLI.
    pub fn new(settings: TicSettings) -> TicResult<Self> {
        settings.validate()?;
        Ok(Self::with_invoker(settings, Box::new(ProcessInvoker::new())))
    }

    /// Create a controller with a custom invoker (used by tests).
    pub fn with_invoker(settings: TicSettings, invoker: Box<dyn Invoker>) -> Self {
        Self { settings, invoker }
    }

    /// The settings this handle was constructed with.
    pub fn settings(&self) -> &TicSettings {
        &self.settings
    }

    fn invocation(&self, args: &[&str]) -> Invocation {
        let mut full_args: Vec<String> = Vec::with_capacity(args.len() + 2);
        if let Some(serial) = &self.settings.serial {
            full_args.push("-d".to_string());
            full_args.push(serial.clone());
        }
        full_args.extend(args.iter().map(|a| (*a).to_string()));
        Invocation::new(&self.settings.program, full_args)
    }

    /// Run a sub-command that is expected to produce no output.
    fn command(&self, args: &[&str]) -> TicResult<()> {
        let output = self.invoker.run(&self.invocation(args))?;

        if !output.success() {
            return Err(TicError::Command {
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        // Some tool versions chat on success; nothing in it is parseable.
        if !output.stdout.is_empty() {
            debug!("ignoring stdout from {:?}: {}", args, output.stdout.trim());
        }
        Ok(())
    }

    /// Read the controller's live variables.
    pub fn status(&self) -> TicResult<Status> {
        let output = self.invoker.run(&self.invocation(&["--status", "--full"]))?;

        if !output.success() {
            return Err(TicError::Command {
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Status::parse(&output.stdout)
    }

    /// Energize the stepper motor coils and clear the
    /// "intentionally de-energized" error bit.
    pub fn energize(&self) -> TicResult<()> {
        self.command(&["--energize"])
    }

    /// De-energize the coils. Sets the "position uncertain" flag and the
    /// "intentionally de-energized" error bit.
    pub fn deenergize(&self) -> TicResult<()> {
        self.command(&["--deenergize"])
    }

    /// Clear the "safe start violation" error for 200 ms, allowing the
    /// system to start up if no other errors are present.
    pub fn exit_safe_start(&self) -> TicResult<()> {
        self.command(&["--exit-safe-start"])
    }

    /// Stop the motor and set the "safe start violation" error bit.
    pub fn enter_safe_start(&self) -> TicResult<()> {
        self.command(&["--enter-safe-start"])
    }

    /// Set the target position in microsteps.
    pub fn set_target_position(&self, position: i32) -> TicResult<()> {
        self.command(&["--position", &position.to_string()])
    }

    /// Set the target velocity in microsteps per 10,000 s.
    pub fn set_target_velocity(&self, velocity: i64) -> TicResult<()> {
        self.command(&["--velocity", &velocity.to_string()])
    }

    /// Stop the motor abruptly, ignoring the deceleration limit, and hold.
    /// Sets the "position uncertain" flag.
    pub fn halt_and_hold(&self) -> TicResult<()> {
        self.command(&["--halt-and-hold"])
    }

    /// Stop the motor abruptly and overwrite the "Current position"
    /// variable. Clears the "position uncertain" flag.
    pub fn halt_and_set_position(&self, position: i32) -> TicResult<()> {
        self.command(&["--halt-and-set-position", &position.to_string()])
    }

    /// Drive toward the limit switch in the given direction until homed.
    pub fn home(&self, direction: Direction) -> TicResult<()> {
        self.command(&["--home", direction.cli_token()])
    }

    /// Reload settings from non-volatile memory, halt the motor, and put
    /// the controller in its reset state.
    pub fn reset(&self) -> TicResult<()> {
        self.command(&["--reset"])
    }

    /// Reset the command timeout, preventing a "command timeout" error for
    /// some time.
    pub fn reset_command_timeout(&self) -> TicResult<()> {
        self.command(&["--reset-command-timeout"])
    }

    /// Temporarily set the maximum speed, in microsteps per 10,000 s
    /// (0 to 500,000,000). Reverted on the next reset.
    pub fn set_max_speed(&self, speed: u32) -> TicResult<()> {
        self.command(&["--max-speed", &speed.to_string()])
    }

    /// Temporarily set the starting speed, in microsteps per 10,000 s:
    /// the fastest speed at which instant acceleration is allowed.
    pub fn set_starting_speed(&self, speed: u32) -> TicResult<()> {
        self.command(&["--starting-speed", &speed.to_string()])
    }

    /// Temporarily set the maximum acceleration, in steps per second per
    /// 100 s (values below 100 are treated as 100 by the firmware).
    pub fn set_max_accel(&self, accel: u32) -> TicResult<()> {
        self.command(&["--max-accel", &accel.to_string()])
    }

    /// Temporarily set the maximum deceleration, in steps per second per
    /// 100 s (0 means "use the max acceleration value").
    pub fn set_max_decel(&self, decel: u32) -> TicResult<()> {
        self.command(&["--max-decel", &decel.to_string()])
    }

    /// Temporarily set the microstepping mode.
    pub fn set_step_mode(&self, mode: StepMode) -> TicResult<()> {
        self.command(&["--step-mode", mode.cli_token()])
    }
}
