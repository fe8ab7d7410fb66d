//! Integration tests for the abort error state
//!
//! Aborting ends the process, so each case re-runs this test binary
//! filtered to a single test with `ADF_ABORT_CASE` set and checks how
//! the child exited.

mod common;

use std::process::{Command, Output};

use ::common::prelude::*;

const CASE_VAR: &str = "ADF_ABORT_CASE";

fn run_case(test: &str, case: &str) -> Output {
    let exe = std::env::current_exe().unwrap();
    Command::new(exe)
        .args([test, "--exact", "--nocapture", "--test-threads=1"])
        .env(CASE_VAR, case)
        .output()
        .unwrap()
}

/// Runs `case` when this process is the child, returning whether it did.
fn child_case(run: impl FnOnce(&str)) -> bool {
    match std::env::var(CASE_VAR) {
        Ok(case) => {
            run(&case);
            true
        }
        Err(_) => false,
    }
}

#[test]
fn test_abort_exits_with_message() {
    if child_case(|case| {
        let config = match case {
            "config" => EngineConfig {
                error_state: ErrorState::Abort,
                ..EngineConfig::default()
            },
            _ => EngineConfig::default(),
        };
        let (mut session, root, _temp, _) = common::setup_test_env_with(config);
        if case == "runtime" {
            session.set_error_state(1).unwrap();
        }
        // with return codes the failure comes back and the child passes
        let _ = session.create(root, "");
    }) {
        return;
    }

    for case in ["config", "runtime"] {
        let output = run_case("test_abort_exits_with_message", case);
        assert_eq!(output.status.code(), Some(1), "case {}", case);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("ERROR:"), "case {}: {}", case, stderr);
    }

    let output = run_case("test_abort_exits_with_message", "return_code");
    assert_eq!(output.status.code(), Some(0));
    assert!(!String::from_utf8_lossy(&output.stderr).contains("ERROR:"));
}

#[test]
fn test_bad_error_state_aborts_when_aborting() {
    if child_case(|_| {
        let config = EngineConfig {
            error_state: ErrorState::Abort,
            ..EngineConfig::default()
        };
        let (mut session, _root, _temp, _) = common::setup_test_env_with(config);
        let _ = session.set_error_state(7);
    }) {
        return;
    }

    let output = run_case("test_bad_error_state_aborts_when_aborting", "bad_value");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR:"));
}

#[test]
fn test_bad_error_state_returned() {
    let (mut session, root, _temp, _) = common::setup_test_env();
    assert!(matches!(
        session.set_error_state(7),
        Err(Error::BadErrorState(7))
    ));
    assert_eq!(session.error_state().unwrap(), 0);
    session.set_error_state(1).unwrap();
    assert_eq!(session.error_state().unwrap(), 1);
    session.set_error_state(0).unwrap();
    session.close(root).unwrap();
}
