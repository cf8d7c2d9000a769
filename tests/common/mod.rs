// Shared test helpers for integration tests
#![allow(dead_code)]

use agent_test_runner::models::{Step, StepStatus, TestCase};
use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Timestamp `ms` milliseconds after the Unix epoch.
pub fn ts(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).unwrap()
}

/// A step with a final status and optional error.
pub fn step(id: &str, description: &str, status: StepStatus, error: Option<&str>) -> Step {
    Step {
        id: id.to_string(),
        description: description.to_string(),
        status,
        error: error.map(str::to_string),
    }
}

/// A case whose steps are all still pending.
pub fn pending_case(id: &str, step_count: usize) -> TestCase {
    let steps = (1..=step_count)
        .map(|i| Step::new(i.to_string(), format!("{id} step {i}")))
        .collect();
    TestCase::new(id, format!("{id} description"), steps)
}

/// Case A of the reference scenario: two passed steps.
pub fn login_case() -> TestCase {
    TestCase::new(
        "login",
        "User can log in",
        vec![
            step("1", "Open the login page", StepStatus::Passed, None),
            step("2", "Submit valid credentials", StepStatus::Passed, None),
        ],
    )
}

/// Case B of the reference scenario: one failed step.
pub fn checkout_case() -> TestCase {
    TestCase::new(
        "checkout",
        "User can check out",
        vec![step("1", "Click pay", StepStatus::Failed, Some("timeout"))],
    )
}

/// Writes a JSON test plan with the given cases into `dir`.
pub fn write_plan(dir: &TempDir, cases: &[TestCase]) -> PathBuf {
    let path = dir.path().join("tests.json");
    fs::write(&path, serde_json::to_string_pretty(cases).unwrap()).unwrap();
    path
}

/// Writes a shell agent that reads its plan from stdin and reports step
/// outcomes keyed on the test case id: every step of `login` passes, step 1 of
/// `checkout` fails with "timeout", and any other case is left untouched.
pub fn write_agent_script(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("agent.sh");
    let script = r#"#!/bin/sh
cat > /dev/null
echo "agent starting $AGENT_TEST_CASE_ID with $AGENT_MAX_TURNS turns"
case "$AGENT_TEST_CASE_ID" in
  login)
    echo '{"stepId":"1","status":"passed"}'
    echo '{"stepId":"2","status":"passed"}'
    ;;
  checkout)
    echo '{"stepId":"1","status":"failed","error":"timeout"}'
    ;;
  *)
    echo "nothing to do" >&2
    ;;
esac
"#;
    fs::write(&path, script).unwrap();
    path
}
