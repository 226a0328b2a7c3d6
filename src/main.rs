//! `tic-motion`: command-line front end for the Tic driver.
//!
//! Thin wrapper over [`tic_driver::TicController`] for bench use:
//! ```bash
//! tic-motion --serial 00123456 status
//! tic-motion position 1000
//! RUST_LOG=debug tic-motion resume
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use tic_driver::{Direction, Status, TicController, TicSettings};

#[derive(Parser, Debug)]
#[command(name = "tic-motion", about = "Control a Pololu Tic stepper controller via ticcmd")]
struct Cli {
    /// Serial number of the controller to address.
    #[arg(short = 'd', long)]
    serial: Option<String>,

    /// Path to the ticcmd executable.
    #[arg(long)]
    program: Option<std::path::PathBuf>,

    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the controller's live variables.
    Status,
    /// Energize the motor coils.
    Energize,
    /// De-energize the motor coils.
    Deenergize,
    /// Energize and exit safe start, allowing motion.
    Resume,
    /// Set the target position in microsteps.
    Position { target: i32 },
    /// Set the target velocity in microsteps per 10,000 s.
    Velocity { target: i64 },
    /// Stop the motor abruptly and hold.
    Halt,
    /// Home toward a limit switch.
    Home {
        /// fwd or rev
        #[arg(value_parser = parse_direction)]
        direction: Direction,
    },
    /// Reset the controller.
    Reset,
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    match s {
        "fwd" => Ok(Direction::Forward),
        "rev" => Ok(Direction::Reverse),
        other => Err(format!("expected 'fwd' or 'rev', got '{other}'")),
    }
}

fn print_status(status: &Status) {
    println!("Operation state:    {}", status.operation_state);
    println!("Current position:   {}", status.current_position);
    if let Some(v) = status.current_velocity {
        println!("Current velocity:   {v}");
    }
    if let Some(p) = status.target_position {
        println!("Target position:    {p}");
    }
    if let Some(v) = status.target_velocity {
        println!("Target velocity:    {v}");
    }
    if let Some(e) = status.energized {
        println!("Energized:          {}", if e { "Yes" } else { "No" });
    }
    if let Some(u) = status.position_uncertain {
        println!("Position uncertain: {}", if u { "Yes" } else { "No" });
    }
    if let Some(vin) = &status.vin_voltage {
        println!("VIN voltage:        {vin}");
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => TicSettings::new(Some(path)).context("failed to load configuration")?,
        None => TicSettings::default(),
    };
    if let Some(serial) = cli.serial {
        settings.serial = Some(serial);
    }
    if let Some(program) = cli.program {
        settings.program = program;
    }

    let tic = TicController::new(settings)?;

    match cli.command {
        Command::Status => {
            let status = tic.status().context("status query failed")?;
            print_status(&status);
        }
        Command::Energize => tic.energize()?,
        Command::Deenergize => tic.deenergize()?,
        Command::Resume => {
            tic.energize()?;
            tic.exit_safe_start()?;
        }
        Command::Position { target } => tic.set_target_position(target)?,
        Command::Velocity { target } => tic.set_target_velocity(target)?,
        Command::Halt => tic.halt_and_hold()?,
        Command::Home { direction } => tic.home(direction)?,
        Command::Reset => tic.reset()?,
    }

    Ok(())
}
