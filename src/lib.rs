//! Driver for Pololu Tic stepper-motor controllers, built on the vendor's
//! `ticcmd` command-line utility.
//!
//! Every operation runs `ticcmd` once as a blocking subprocess: the driver
//! builds an argument list, waits for the tool to exit, and either checks
//! the exit status (commands) or parses the line-oriented stdout (status
//! queries). All device state lives in the hardware; the driver holds
//! nothing but its configuration.
//!
//! ```no_run
//! use tic_driver::{TicController, TicSettings};
//!
//! # fn main() -> tic_driver::TicResult<()> {
//! let tic = TicController::new(TicSettings::with_serial("00123456"))?;
//! tic.energize()?;
//! tic.exit_safe_start()?;
//! tic.set_target_position(1000)?;
//! let status = tic.status()?;
//! println!("at {} ({})", status.current_position, status.operation_state);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod invoker;
pub mod motion;
pub mod status;
pub mod tic;

pub use config::TicSettings;
pub use error::{TicError, TicResult};
pub use motion::{Motion, MotionSettings, PowerGuard};
pub use status::{OperationState, Status};
pub use tic::{Direction, StepMode, TicController};
