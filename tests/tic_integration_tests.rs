//! Integration tests driving the public API against a scripted invoker.

use std::sync::Arc;

use tic_driver::invoker::MockInvoker;
use tic_driver::{
    Motion, MotionSettings, OperationState, TicController, TicError, TicSettings,
};

fn controller(serial: Option<&str>) -> (TicController, Arc<MockInvoker>) {
    let mock = Arc::new(MockInvoker::new());
    let settings = TicSettings {
        serial: serial.map(str::to_string),
        ..TicSettings::default()
    };
    (
        TicController::with_invoker(settings, Box::new(mock.clone())),
        mock,
    )
}

#[test]
fn status_query_parses_well_formed_output() {
    let (tic, mock) = controller(None);
    mock.push_stdout(
        "Up time:              0:00:12\n\
         Operation state:      Normal\n\
         Energized:            Yes\n\
         VIN voltage:          12.2 V\n\
         Current position:     500\n\
         Current velocity:     0\n",
    );

    let status = tic.status().unwrap();
    assert_eq!(status.operation_state, OperationState::Normal);
    assert_eq!(status.current_position, 500);
    assert_eq!(status.current_velocity, Some(0));
    assert_eq!(status.energized, Some(true));
    assert_eq!(status.vin_voltage.as_deref(), Some("12.2 V"));
}

#[test]
fn status_with_unrecognized_extra_field_still_parses() {
    let (tic, mock) = controller(None);
    mock.push_stdout(
        "Operation state: Normal\n\
         Current position: 500\n\
         Quantum flux: enabled\n",
    );

    let status = tic.status().unwrap();
    assert_eq!(status.current_position, 500);
    assert_eq!(
        status.extra.get("Quantum flux").map(String::as_str),
        Some("enabled")
    );
}

#[test]
fn status_missing_required_field_is_parse_error() {
    let (tic, mock) = controller(None);
    mock.push_stdout("Operation state: Normal\nEnergized: No\n");

    match tic.status() {
        Err(TicError::Parse(msg)) => assert!(msg.contains("Current position")),
        other => panic!("expected Parse error, got {other:?}"),
    }
}

#[test]
fn serial_number_appears_in_every_argument_list() {
    let (tic, mock) = controller(Some("12345"));

    tic.energize().unwrap();
    tic.set_target_velocity(-200).unwrap();
    mock.push_stdout("Operation state: Normal\nCurrent position: 0\n");
    tic.status().unwrap();

    let calls = mock.calls();
    assert_eq!(calls.len(), 3);
    for call in calls {
        assert_eq!(&call.args[..2], &["-d".to_string(), "12345".to_string()]);
    }
}

#[test]
fn no_serial_means_no_identifier_flag() {
    let (tic, mock) = controller(None);
    tic.enter_safe_start().unwrap();

    let call = &mock.calls()[0];
    assert!(!call.args.contains(&"-d".to_string()));
}

#[test]
fn firmware_rejection_carries_exit_code_and_stderr() {
    let (tic, mock) = controller(None);
    mock.push_failure(1, "Error: target out of range");

    match tic.set_target_position(1000) {
        Err(TicError::Command { exit_code, stderr }) => {
            assert_eq!(exit_code, Some(1));
            assert_eq!(stderr, "Error: target out of range");
        }
        other => panic!("expected Command error, got {other:?}"),
    }

    // The argv was still built correctly before the failure surfaced.
    let args = mock.args_of_call(0).unwrap();
    assert!(args.contains(&"--position".to_string()));
    assert!(args.contains(&"1000".to_string()));
}

#[test]
fn motion_layer_choreographs_power_and_safe_start() {
    let mock = Arc::new(MockInvoker::new());
    let tic = TicController::with_invoker(TicSettings::default(), Box::new(mock.clone()));
    let mut motion = Motion::new(tic, MotionSettings::default());

    motion.move_up().unwrap();

    let flags: Vec<String> = mock.calls().iter().map(|c| c.args[0].clone()).collect();
    assert_eq!(
        flags,
        vec![
            "--energize",
            "--exit-safe-start",
            "--position",
            "--enter-safe-start",
            "--deenergize",
        ]
    );
    assert_eq!(motion.position(), 200);
}

#[test]
fn motion_rejects_out_of_bounds_target() {
    let mock = Arc::new(MockInvoker::new());
    let tic = TicController::with_invoker(TicSettings::default(), Box::new(mock.clone()));
    let mut motion = Motion::new(tic, MotionSettings::default());

    assert!(motion.move_to(100_000).is_err());
    assert!(mock.calls().is_empty());
}
