//! # Execution Integration Tests / 执行集成测试
//!
//! Drives `run_test_cases` with a scripted in-process executor and, on unix,
//! with a real shell agent.
//!
//! 使用脚本化的进程内执行器以及（在 unix 上）真实的 shell 代理驱动 `run_test_cases`。

mod common;

use agent_test_runner::accumulator::ResultAccumulator;
use agent_test_runner::core::execution::{Executor, run_test_cases};
use agent_test_runner::models::{StepStatus, TestCase};
use anyhow::{Result, bail};
use common::pending_case;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Passes every step, except that cases whose id starts with `fail` fail
/// their first step. Cases whose id starts with `slow` take a while.
struct ScriptedExecutor {
    cancel_after: Option<&'static str>,
}

impl ScriptedExecutor {
    fn new() -> Self {
        Self { cancel_after: None }
    }
}

impl Executor for ScriptedExecutor {
    async fn execute(&self, mut case: TestCase, cancel: CancellationToken) -> Result<TestCase> {
        if case.id == "broken" {
            bail!("agent crashed");
        }
        if case.id.starts_with("slow") {
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        for (i, step) in case.steps.iter_mut().enumerate() {
            if i == 0 && case.id.starts_with("fail") {
                step.status = StepStatus::Failed;
                step.error = Some("assertion failed".into());
            } else {
                step.status = StepStatus::Passed;
            }
        }
        if self.cancel_after == Some(case.id.as_str()) {
            cancel.cancel();
        }
        Ok(case)
    }
}

fn recorded_ids(acc: &ResultAccumulator) -> Vec<String> {
    acc.results().iter().map(|r| r.test_case.id.clone()).collect()
}

#[tokio::test]
async fn test_sequential_run_records_in_plan_order() {
    let cases = vec![
        pending_case("slow-first", 2),
        pending_case("fail-second", 1),
        pending_case("third", 3),
    ];
    let acc = Mutex::new(ResultAccumulator::new());

    run_test_cases(cases, &ScriptedExecutor::new(), 1, &acc, &CancellationToken::new())
        .await
        .unwrap();

    let acc = acc.into_inner();
    assert_eq!(recorded_ids(&acc), ["slow-first", "fail-second", "third"]);
    assert_eq!(acc.passed_cases(), 2);
    assert!(!acc.results()[1].succeeded);
    for result in acc.results() {
        assert!(result.end_time >= result.start_time);
    }
}

#[tokio::test]
async fn test_concurrent_run_records_in_completion_order() {
    let cases = vec![pending_case("slow-a", 1), pending_case("quick-b", 1)];
    let acc = Mutex::new(ResultAccumulator::new());

    run_test_cases(cases, &ScriptedExecutor::new(), 2, &acc, &CancellationToken::new())
        .await
        .unwrap();

    let acc = acc.into_inner();
    assert_eq!(recorded_ids(&acc), ["quick-b", "slow-a"]);
    assert!(acc.all_succeeded());
}

#[tokio::test]
async fn test_zero_jobs_behaves_like_one() {
    let cases = vec![pending_case("a", 1), pending_case("b", 1)];
    let acc = Mutex::new(ResultAccumulator::new());

    run_test_cases(cases, &ScriptedExecutor::new(), 0, &acc, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(recorded_ids(&acc.into_inner()), ["a", "b"]);
}

#[tokio::test]
async fn test_cancellation_skips_cases_not_yet_started() {
    let cases = vec![pending_case("a", 1), pending_case("b", 1), pending_case("c", 1)];
    let acc = Mutex::new(ResultAccumulator::new());
    let executor = ScriptedExecutor {
        cancel_after: Some("a"),
    };

    run_test_cases(cases, &executor, 1, &acc, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(recorded_ids(&acc.into_inner()), ["a"]);
}

#[tokio::test]
async fn test_executor_error_keeps_earlier_results() {
    let cases = vec![pending_case("a", 1), pending_case("broken", 1), pending_case("c", 1)];
    let acc = Mutex::new(ResultAccumulator::new());

    let err = run_test_cases(cases, &ScriptedExecutor::new(), 1, &acc, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("broken"));
    assert!(format!("{err:#}").contains("agent crashed"));
    assert_eq!(recorded_ids(&acc.into_inner()), ["a"]);
}

#[tokio::test]
async fn test_empty_plan_records_nothing() {
    let acc = Mutex::new(ResultAccumulator::new());
    run_test_cases(vec![], &ScriptedExecutor::new(), 4, &acc, &CancellationToken::new())
        .await
        .unwrap();
    assert!(acc.into_inner().is_empty());
}

#[cfg(unix)]
mod agent_process {
    use super::*;
    use agent_test_runner::core::execution::{AgentExecutor, AgentOptions};
    use common::write_agent_script;
    use tempfile::tempdir;

    fn options(results_dir: &std::path::Path, timeout: Option<Duration>) -> AgentOptions {
        AgentOptions {
            max_turns: 5,
            screenshots: false,
            results_dir: results_dir.to_path_buf(),
            timeout,
        }
    }

    #[tokio::test]
    async fn test_agent_updates_are_applied_to_steps() {
        let dir = tempdir().unwrap();
        let script = write_agent_script(&dir);
        let executor = AgentExecutor::from_command_line(
            &format!("sh '{}'", script.display()),
            options(dir.path(), None),
        )
        .unwrap();

        let cases = vec![
            pending_case("login", 2),
            pending_case("checkout", 1),
            pending_case("untouched", 2),
        ];
        let acc = Mutex::new(ResultAccumulator::new());
        run_test_cases(cases, &executor, 1, &acc, &CancellationToken::new())
            .await
            .unwrap();

        let acc = acc.into_inner();
        let results = acc.results();
        assert!(results[0].succeeded);
        assert!(!results[1].succeeded);
        let failed = &results[1].test_case.steps[0];
        assert_eq!(failed.status, StepStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("timeout"));
        assert!(!results[2].succeeded);
        assert_eq!(results[2].test_case.count_status(StepStatus::Pending), 2);
    }

    #[tokio::test]
    async fn test_timeout_stops_agent_and_keeps_pending_steps() {
        let dir = tempdir().unwrap();
        let executor = AgentExecutor::from_command_line(
            "sh -c 'cat > /dev/null; sleep 5'",
            options(dir.path(), Some(Duration::from_millis(200))),
        )
        .unwrap();

        let started = std::time::Instant::now();
        let finished = executor
            .execute(pending_case("hang", 2), CancellationToken::new())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(4));
        assert_eq!(finished.count_status(StepStatus::Pending), 2);
    }

    #[tokio::test]
    async fn test_invalid_utf8_output_does_not_drop_later_updates() {
        let dir = tempdir().unwrap();
        let executor = AgentExecutor::from_command_line(
            r#"sh -c 'cat > /dev/null; printf "\377\n" >&2; sleep 0.2; echo "{\"stepId\":\"1\",\"status\":\"passed\"}"'"#,
            options(dir.path(), Some(Duration::from_secs(10))),
        )
        .unwrap();

        let finished = executor
            .execute(pending_case("noisy", 1), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(finished.steps[0].status, StepStatus::Passed);
        assert!(finished.is_succeeded());
    }

    #[tokio::test]
    async fn test_timeout_applies_after_agent_closes_its_output() {
        let dir = tempdir().unwrap();
        let executor = AgentExecutor::from_command_line(
            "sh -c 'exec >&- 2>&-; sleep 3'",
            options(dir.path(), Some(Duration::from_millis(200))),
        )
        .unwrap();

        let started = std::time::Instant::now();
        let finished = executor
            .execute(pending_case("silent", 1), CancellationToken::new())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(finished.steps[0].status, StepStatus::Pending);
    }

    #[tokio::test]
    async fn test_cancellation_applies_after_agent_closes_its_output() {
        let dir = tempdir().unwrap();
        let executor = AgentExecutor::from_command_line(
            "sh -c 'exec >&- 2>&-; sleep 3'",
            options(dir.path(), None),
        )
        .unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        executor.execute(pending_case("silent", 1), cancel).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_missing_agent_program_is_an_error() {
        let dir = tempdir().unwrap();
        let executor = AgentExecutor::from_command_line(
            "definitely-not-an-agent-binary-4242",
            options(dir.path(), None),
        )
        .unwrap();

        let result = executor
            .execute(pending_case("x", 1), CancellationToken::new())
            .await;
        assert!(result.is_err());
    }
}
