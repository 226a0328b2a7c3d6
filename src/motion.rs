//! Convenience layer for jog-style motion.
//!
//! [`Motion`] wraps a [`TicController`] with a software position cursor,
//! bounds checking, and the power-up/power-down choreography most setups
//! want: energize and exit safe start before a move, re-enter safe start
//! and de-energize afterwards. The choreography itself is a scoped RAII
//! guard, [`PowerGuard`], so the teardown half runs on every exit path.
//!
//! ## Configuration Example
//!
//! ```toml
//! [motion]
//! min_position = -2000
//! max_position = 2000
//! velocity = 10000
//! move_size = 200
//! step_mode = "half"
//! power_up_down = true
//! safe_start = true
//! ```

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{TicError, TicResult};
use crate::tic::{StepMode, TicController};

/// Settings for the motion convenience layer.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct MotionSettings {
    /// Lower bound for position moves, in microsteps.
    pub min_position: i32,
    /// Upper bound for position moves, in microsteps.
    pub max_position: i32,
    /// Default velocity for continuous moves, microsteps per 10,000 s.
    pub velocity: i64,
    /// Distance of one jog, in microsteps.
    pub move_size: i32,
    /// Initial microstepping mode.
    pub step_mode: StepMode,
    /// Energize before each move and de-energize after.
    pub power_up_down: bool,
    /// Exit safe start before each move and re-enter after.
    pub safe_start: bool,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            min_position: -2000,
            max_position: 2000,
            velocity: 10_000,
            move_size: 200,
            step_mode: StepMode::Half,
            power_up_down: true,
            safe_start: true,
        }
    }
}

/// Scoped power-up: energizes and exits safe start on construction,
/// re-enters safe start and de-energizes on drop.
///
/// Teardown failures cannot be surfaced from `Drop`, so they are logged
/// at warn level instead.
pub struct PowerGuard<'a> {
    controller: &'a TicController,
    energize: bool,
    safe_start: bool,
}

impl<'a> PowerGuard<'a> {
    /// Power the system up according to the flags.
    pub fn power_up(
        controller: &'a TicController,
        energize: bool,
        safe_start: bool,
    ) -> TicResult<Self> {
        if energize {
            controller.energize()?;
        }
        if safe_start {
            controller.exit_safe_start()?;
        }
        Ok(Self {
            controller,
            energize,
            safe_start,
        })
    }
}

impl Drop for PowerGuard<'_> {
    fn drop(&mut self) {
        if self.safe_start {
            if let Err(e) = self.controller.enter_safe_start() {
                warn!("failed to re-enter safe start: {e}");
            }
        }
        if self.energize {
            if let Err(e) = self.controller.deenergize() {
                warn!("failed to de-energize: {e}");
            }
        }
    }
}

/// Jog-style motion wrapper with a software position cursor.
///
/// The cursor tracks where moves have been commanded to, not where the
/// motor measurably is; use [`TicController::status`] for the live value.
pub struct Motion {
    controller: TicController,
    settings: MotionSettings,
    position: i32,
    step_mode: StepMode,
}

impl Motion {
    /// Wrap a controller with the given motion settings.
    pub fn new(controller: TicController, settings: MotionSettings) -> Self {
        let step_mode = settings.step_mode;
        Self {
            controller,
            settings,
            position: 0,
            step_mode,
        }
    }

    /// The underlying controller, for operations this layer does not cover.
    pub fn controller(&self) -> &TicController {
        &self.controller
    }

    /// Last commanded position.
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Current microstepping mode as commanded through this wrapper.
    pub fn step_mode(&self) -> StepMode {
        self.step_mode
    }

    /// Move to an absolute position, rejecting targets outside the
    /// configured bounds.
    pub fn move_to(&mut self, position: i32) -> TicResult<()> {
        if position <= self.settings.min_position || position >= self.settings.max_position {
            return Err(TicError::Configuration(format!(
                "target position {position} outside ({}, {})",
                self.settings.min_position, self.settings.max_position
            )));
        }

        let guard = PowerGuard::power_up(
            &self.controller,
            self.settings.power_up_down,
            self.settings.safe_start,
        )?;
        self.controller.set_target_position(position)?;
        drop(guard);

        self.position = position;
        debug!("position cursor now {position}");
        Ok(())
    }

    /// Jog up by one `move_size`.
    pub fn move_up(&mut self) -> TicResult<()> {
        self.move_to(self.position + self.settings.move_size)
    }

    /// Jog down by one `move_size`.
    pub fn move_down(&mut self) -> TicResult<()> {
        self.move_to(self.position - self.settings.move_size)
    }

    /// Start a continuous move at the given velocity. The position cursor
    /// is not meaningful afterwards until the next absolute move.
    pub fn move_continuous(&self, velocity: i64) -> TicResult<()> {
        let guard = PowerGuard::power_up(
            &self.controller,
            self.settings.power_up_down,
            self.settings.safe_start,
        )?;
        self.controller.set_target_velocity(velocity)?;
        drop(guard);
        Ok(())
    }

    /// Continuous move forward at the configured default velocity.
    pub fn move_up_continuous(&self) -> TicResult<()> {
        self.move_continuous(self.settings.velocity)
    }

    /// Continuous move backward at the configured default velocity.
    pub fn move_down_continuous(&self) -> TicResult<()> {
        self.move_continuous(-self.settings.velocity)
    }

    /// Switch to a specific microstepping mode.
    pub fn set_step_mode(&mut self, mode: StepMode) -> TicResult<()> {
        self.controller.set_step_mode(mode)?;
        self.step_mode = mode;
        Ok(())
    }

    /// Switch to the next finer microstepping mode.
    pub fn increase_step_size(&mut self) -> TicResult<()> {
        let mode = self.step_mode.finer().ok_or_else(|| {
            TicError::Configuration(format!("already at finest step mode {}", self.step_mode))
        })?;
        self.set_step_mode(mode)
    }

    /// Switch to the next coarser microstepping mode.
    pub fn decrease_step_size(&mut self) -> TicResult<()> {
        let mode = self.step_mode.coarser().ok_or_else(|| {
            TicError::Configuration(format!("already at coarsest step mode {}", self.step_mode))
        })?;
        self.set_step_mode(mode)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::TicSettings;
    use crate::invoker::MockInvoker;

    fn motion_with_mock(settings: MotionSettings) -> (Motion, Arc<MockInvoker>) {
        let mock = Arc::new(MockInvoker::new());
        let controller =
            TicController::with_invoker(TicSettings::default(), Box::new(mock.clone()));
        (Motion::new(controller, settings), mock)
    }

    fn flags(calls: &[crate::invoker::Invocation]) -> Vec<String> {
        calls.iter().map(|c| c.args[0].clone()).collect()
    }

    #[test]
    fn test_move_wraps_in_power_guard() {
        let (mut motion, mock) = motion_with_mock(MotionSettings::default());
        motion.move_to(100).unwrap();

        assert_eq!(
            flags(&mock.calls()),
            vec![
                "--energize",
                "--exit-safe-start",
                "--position",
                "--enter-safe-start",
                "--deenergize",
            ]
        );
        assert_eq!(motion.position(), 100);
    }

    #[test]
    fn test_move_without_power_choreography() {
        let settings = MotionSettings {
            power_up_down: false,
            safe_start: false,
            ..MotionSettings::default()
        };
        let (mut motion, mock) = motion_with_mock(settings);
        motion.move_to(100).unwrap();

        assert_eq!(flags(&mock.calls()), vec!["--position"]);
    }

    #[test]
    fn test_out_of_bounds_move_rejected_without_invocation() {
        let (mut motion, mock) = motion_with_mock(MotionSettings::default());

        assert!(matches!(
            motion.move_to(5000),
            Err(TicError::Configuration(_))
        ));
        assert!(mock.calls().is_empty());
        assert_eq!(motion.position(), 0);
    }

    #[test]
    fn test_jog_up_and_down() {
        let (mut motion, _mock) = motion_with_mock(MotionSettings::default());
        motion.move_up().unwrap();
        assert_eq!(motion.position(), 200);
        motion.move_up().unwrap();
        assert_eq!(motion.position(), 400);
        motion.move_down().unwrap();
        assert_eq!(motion.position(), 200);
    }

    #[test]
    fn test_continuous_move_uses_configured_velocity() {
        let (motion, mock) = motion_with_mock(MotionSettings::default());
        motion.move_down_continuous().unwrap();

        let velocity_call = mock
            .calls()
            .into_iter()
            .find(|c| c.args[0] == "--velocity")
            .unwrap();
        assert_eq!(velocity_call.args[1], "-10000");
    }

    #[test]
    fn test_failed_move_still_powers_down() {
        let (mut motion, mock) = motion_with_mock(MotionSettings::default());
        // energize ok, exit-safe-start ok, --position fails
        mock.push_stdout("");
        mock.push_stdout("");
        mock.push_failure(1, "Error: No device found.");

        assert!(matches!(motion.move_to(100), Err(TicError::Command { .. })));
        // Guard teardown ran after the failed command.
        assert_eq!(
            flags(&mock.calls()),
            vec![
                "--energize",
                "--exit-safe-start",
                "--position",
                "--enter-safe-start",
                "--deenergize",
            ]
        );
        // Cursor unchanged on failure.
        assert_eq!(motion.position(), 0);
    }

    #[test]
    fn test_step_size_ladder() {
        let (mut motion, _mock) = motion_with_mock(MotionSettings::default());
        assert_eq!(motion.step_mode(), StepMode::Half);

        motion.increase_step_size().unwrap();
        assert_eq!(motion.step_mode(), StepMode::Quarter);

        motion.decrease_step_size().unwrap();
        motion.decrease_step_size().unwrap();
        assert_eq!(motion.step_mode(), StepMode::Full);

        assert!(motion.decrease_step_size().is_err());
    }
}
