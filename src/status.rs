//! Typed device status and the line parser behind status queries.
//!
//! `ticcmd --status --full` prints one `<field name>: <value>` line per
//! variable. The parser maps recognized field names onto the typed fields
//! of [`Status`] and files everything else under [`Status::extra`], so new
//! firmware revisions that add fields do not break existing callers. The
//! two fields every firmware prints, `Operation state` and
//! `Current position`, are required: if either is missing the whole parse
//! fails rather than returning a default-filled status.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{TicError, TicResult};

/// Operation state reported by the controller.
///
/// Mirrors the states documented in the Tic user's guide. Unknown state
/// names from newer firmware are preserved verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState {
    /// Controller is in its reset state and will not move the motor.
    Reset,
    /// Motor driver intentionally disabled.
    DeEnergized,
    /// A soft error is stopping the motor.
    SoftError,
    /// Waiting for the ERR line to go inactive.
    WaitingForErrLine,
    /// Clearing errors on the way to normal operation.
    StartingUp,
    /// Normal operation; the motor can move.
    Normal,
    /// State name not known to this driver version.
    Other(String),
}

impl FromStr for OperationState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Reset" => Self::Reset,
            "De-energized" => Self::DeEnergized,
            "Soft error" => Self::SoftError,
            "Waiting for ERR line" => Self::WaitingForErrLine,
            "Starting up" => Self::StartingUp,
            "Normal" => Self::Normal,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reset => "Reset",
            Self::DeEnergized => "De-energized",
            Self::SoftError => "Soft error",
            Self::WaitingForErrLine => "Waiting for ERR line",
            Self::StartingUp => "Starting up",
            Self::Normal => "Normal",
            Self::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// Snapshot of the controller's live variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Current operation state.
    pub operation_state: OperationState,
    /// Current position in microsteps.
    pub current_position: i32,
    /// Current velocity in microsteps per 10,000 s.
    pub current_velocity: Option<i64>,
    /// Target position in microsteps, when position control is active.
    pub target_position: Option<i32>,
    /// Target velocity in microsteps per 10,000 s, when velocity control is active.
    pub target_velocity: Option<i64>,
    /// Whether the motor coils are energized.
    pub energized: Option<bool>,
    /// Whether the controller has flagged its position as uncertain.
    pub position_uncertain: Option<bool>,
    /// Time since the last full microcontroller reset, as reported.
    pub up_time: Option<String>,
    /// Measured VIN voltage, as reported (e.g. "12.1 V").
    pub vin_voltage: Option<String>,
    /// Fields the tool printed that this driver version does not type.
    pub extra: BTreeMap<String, String>,
}

impl Status {
    /// Parse the stdout of a status query.
    ///
    /// Lines without a colon are skipped. Recognized fields with a
    /// malformed value and missing required fields are parse errors.
    /// On duplicate fields the last occurrence wins.
    pub fn parse(stdout: &str) -> TicResult<Self> {
        let mut operation_state: Option<OperationState> = None;
        let mut current_position: Option<i32> = None;
        let mut current_velocity: Option<i64> = None;
        let mut target_position: Option<i32> = None;
        let mut target_velocity: Option<i64> = None;
        let mut energized: Option<bool> = None;
        let mut position_uncertain: Option<bool> = None;
        let mut up_time: Option<String> = None;
        let mut vin_voltage: Option<String> = None;
        let mut extra = BTreeMap::new();

        for line in stdout.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "Operation state" => {
                    // Infallible: unknown names become Other.
                    if let Ok(state) = value.parse() {
                        operation_state = Some(state);
                    }
                }
                "Current position" => {
                    current_position = Some(parse_int(key, value)?);
                }
                "Current velocity" => {
                    current_velocity = Some(parse_int(key, value)?);
                }
                "Target position" => {
                    target_position = Some(parse_int(key, value)?);
                }
                "Target velocity" => {
                    target_velocity = Some(parse_int(key, value)?);
                }
                "Energized" => {
                    energized = Some(parse_yes_no(key, value)?);
                }
                "Position uncertain" => {
                    position_uncertain = Some(parse_yes_no(key, value)?);
                }
                "Up time" => {
                    up_time = Some(value.to_string());
                }
                "VIN voltage" => {
                    vin_voltage = Some(value.to_string());
                }
                _ => {
                    extra.insert(key.to_string(), value.to_string());
                }
            }
        }

        let operation_state = operation_state
            .ok_or_else(|| missing_field("Operation state"))?;
        let current_position = current_position
            .ok_or_else(|| missing_field("Current position"))?;

        Ok(Self {
            operation_state,
            current_position,
            current_velocity,
            target_position,
            target_velocity,
            energized,
            position_uncertain,
            up_time,
            vin_voltage,
            extra,
        })
    }
}

fn missing_field(name: &str) -> TicError {
    TicError::Parse(format!("required field '{name}' missing from status output"))
}

fn parse_int<T: FromStr>(key: &str, value: &str) -> TicResult<T> {
    value
        .parse()
        .map_err(|_| TicError::Parse(format!("field '{key}' has non-numeric value '{value}'")))
}

fn parse_yes_no(key: &str, value: &str) -> TicResult<bool> {
    match value {
        "Yes" => Ok(true),
        "No" => Ok(false),
        other => Err(TicError::Parse(format!(
            "field '{key}' has non-boolean value '{other}'"
        ))),
    }
}
