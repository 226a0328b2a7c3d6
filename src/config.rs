//! Driver configuration.
//!
//! Everything the driver needs to locate and address the hardware is held
//! in an explicit [`TicSettings`] value passed in at construction time.
//! There is no cached program path or other process-wide singleton.
//!
//! ## Configuration Example
//!
//! ```toml
//! # tic.toml
//! program = "/usr/local/bin/ticcmd"
//! serial = "00123456"
//! ```
//!
//! Environment variables prefixed with `TIC_` override file values, e.g.
//! `TIC_SERIAL=00123456`.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{TicError, TicResult};

/// Settings for one device handle.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TicSettings {
    /// Path or name of the vendor CLI executable.
    #[serde(default = "default_program")]
    pub program: PathBuf,

    /// Serial number of the controller to address.
    ///
    /// Required only when several controllers are attached; when `None`,
    /// no `-d` flag is passed and the tool picks the sole attached unit.
    #[serde(default)]
    pub serial: Option<String>,
}

fn default_program() -> PathBuf {
    PathBuf::from("ticcmd")
}

impl Default for TicSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            serial: None,
        }
    }
}

impl TicSettings {
    /// Load settings from an optional TOML file plus `TIC_` env overrides.
    pub fn new(config_path: Option<&str>) -> TicResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        let settings: Self = builder
            .add_source(config::Environment::with_prefix("TIC"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Construct settings addressing a specific controller by serial number.
    pub fn with_serial(serial: impl Into<String>) -> Self {
        Self {
            serial: Some(serial.into()),
            ..Self::default()
        }
    }

    /// Semantic validation beyond what deserialization checks.
    pub fn validate(&self) -> TicResult<()> {
        if self.program.as_os_str().is_empty() {
            return Err(TicError::Configuration(
                "program path must not be empty".to_string(),
            ));
        }
        if let Some(serial) = &self.serial {
            if serial.trim().is_empty() {
                return Err(TicError::Configuration(
                    "serial number must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
