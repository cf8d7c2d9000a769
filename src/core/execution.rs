//! # Test Execution Module / 测试执行模块
//!
//! Runs test cases through an [`Executor`] and records every finished case in
//! a [`ResultAccumulator`]. The executor decides step outcomes; this module
//! only measures wall-clock time and records what comes back.
//!
//! 通过 [`Executor`] 运行测试用例，并将每个完成的用例记录到 [`ResultAccumulator`] 中。
//! 执行器决定步骤结果；此模块只测量挂钟时间并记录返回的内容。

use anyhow::{Context, Result};
use chrono::Utc;
use futures::{StreamExt, TryStreamExt, stream};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::accumulator::ResultAccumulator;
use crate::core::models::{StepUpdate, TestCase};
use crate::infra::command::{self, OutputLine};

/// Something that can run a test case to completion.
///
/// Implementations return the case with every step carrying its final status.
/// Steps the executor never reached are left `pending`. When `cancel` fires,
/// an executor should stop promptly and return the case as it stands.
///
/// 能够将测试用例运行至完成的执行器。
/// 实现应返回每个步骤都带有最终状态的用例；执行器未到达的步骤保持 `pending`。
pub trait Executor: Send + Sync {
    fn execute(
        &self,
        case: TestCase,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<TestCase>> + Send;
}

/// Options forwarded to every agent process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOptions {
    pub max_turns: u32,
    pub screenshots: bool,
    pub results_dir: PathBuf,
    /// Per test case limit. The agent is killed when it runs out.
    pub timeout: Option<Duration>,
}

/// Runs an external agent process for each test case.
///
/// The test case is written to the agent's stdin as JSON. Each stdout line
/// that is a JSON step update, e.g. `{"stepId":"2","status":"failed","error":"timeout"}`,
/// is applied to the case. Anything else the agent prints is logged at debug level.
///
/// 为每个测试用例运行一个外部代理进程。
/// 测试用例以 JSON 形式写入代理的 stdin。stdout 中每一行 JSON 步骤更新都会应用到用例上；
/// 代理打印的其他内容以 debug 级别记录。
#[derive(Debug, Clone)]
pub struct AgentExecutor {
    program: String,
    args: Vec<String>,
    options: AgentOptions,
}

impl AgentExecutor {
    /// Builds an executor from a shell-style command line.
    pub fn from_command_line(command_line: &str, options: AgentOptions) -> Result<Self> {
        let (program, args) = command::parse_command_line(command_line)?;
        Ok(Self {
            program,
            args,
            options,
        })
    }

    fn environment(&self, case: &TestCase) -> Vec<(&'static str, String)> {
        vec![
            ("AGENT_MAX_TURNS", self.options.max_turns.to_string()),
            ("AGENT_SCREENSHOTS", self.options.screenshots.to_string()),
            (
                "AGENT_RESULTS_DIR",
                self.options.results_dir.display().to_string(),
            ),
            ("AGENT_TEST_CASE_ID", case.id.clone()),
        ]
    }
}

impl Executor for AgentExecutor {
    async fn execute(&self, mut case: TestCase, cancel: CancellationToken) -> Result<TestCase> {
        let plan = serde_json::to_vec(&case).context("Failed to serialize test case")?;
        let mut process =
            command::spawn_streaming(&self.program, &self.args, &self.environment(&case), plan)?;

        let deadline = async {
            match self.options.timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        // Read until both output streams close, then wait for the exit. The
        // deadline and cancellation cover both phases.
        let interrupted = loop {
            tokio::select! {
                _ = cancel.cancelled() => break Some(Interrupt::Cancelled),
                _ = &mut deadline => break Some(Interrupt::TimedOut),
                line = process.next_line() => match line {
                    Some(Ok(OutputLine::Stdout(line))) => handle_agent_line(&mut case, &line),
                    Some(Ok(OutputLine::Stderr(line))) => {
                        debug!(case = %case.id, "agent stderr: {line}");
                    }
                    Some(Err(e)) => {
                        warn!(case = %case.id, error = %e, "failed to read agent output");
                    }
                    None => break None,
                },
            }
        };

        let interrupted = match interrupted {
            Some(interrupt) => Some(interrupt),
            None => tokio::select! {
                _ = cancel.cancelled() => Some(Interrupt::Cancelled),
                _ = &mut deadline => Some(Interrupt::TimedOut),
                status = process.wait() => {
                    match status {
                        Ok(status) if !status.success() => {
                            warn!(case = %case.id, %status, "agent exited unsuccessfully");
                        }
                        Ok(_) => {}
                        Err(e) => warn!(case = %case.id, error = %e, "failed to wait for agent"),
                    }
                    None
                }
            },
        };

        if let Some(interrupt) = interrupted {
            match interrupt {
                Interrupt::Cancelled => warn!(case = %case.id, "test case cancelled"),
                Interrupt::TimedOut => warn!(
                    case = %case.id,
                    timeout_secs = self.options.timeout.map(|t| t.as_secs()),
                    "test case timed out"
                ),
            }
            process.kill().await;
        }

        Ok(case)
    }
}

/// Why an agent was stopped before it exited on its own.
#[derive(Debug, Clone, Copy)]
enum Interrupt {
    Cancelled,
    TimedOut,
}

/// Parses a line of agent stdout as a step update, if it is one.
pub fn parse_step_update(line: &str) -> Option<StepUpdate> {
    let trimmed = line.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

fn handle_agent_line(case: &mut TestCase, line: &str) {
    let Some(update) = parse_step_update(line) else {
        debug!(case = %case.id, "agent: {line}");
        return;
    };
    match case.apply_update(&update) {
        Ok(()) => info!(
            case = %case.id,
            step = %update.step_id,
            status = %update.status,
            "step updated"
        ),
        Err(e) => warn!(case = %case.id, "ignored step update: {e}"),
    }
}

/// Runs `cases` with at most `jobs` in flight and records each one as it finishes.
///
/// With `jobs == 1` cases run one after another in plan order. With more, they
/// are recorded in the order they finish. The accumulator sits behind a mutex so
/// concurrent cases never append at the same time. Cases that have not started
/// when `cancel` fires are skipped and not recorded.
///
/// 以最多 `jobs` 个并发运行 `cases`，并在每个用例完成时记录。
/// 累加器位于互斥锁之后，因此并发用例永远不会同时追加。
///
/// # Errors / 错误
/// Returns the first executor error. Cases recorded before it stay recorded.
pub async fn run_test_cases<E: Executor>(
    cases: Vec<TestCase>,
    executor: &E,
    jobs: usize,
    accumulator: &Mutex<ResultAccumulator>,
    cancel: &CancellationToken,
) -> Result<()> {
    stream::iter(cases)
        .map(|case| {
            let cancel = cancel.clone();
            async move {
                if cancel.is_cancelled() {
                    debug!(case = %case.id, "skipping test case after cancellation");
                    return Ok(());
                }

                let case_id = case.id.clone();
                info!(case = %case_id, steps = case.steps.len(), "starting test case");
                let start = Utc::now();
                let finished = executor
                    .execute(case, cancel)
                    .await
                    .with_context(|| format!("Failed to execute test case '{case_id}'"))?;
                let end = Utc::now();

                let mut accumulator = accumulator.lock().await;
                let result = accumulator.record(finished, start, end);
                info!(
                    case = %case_id,
                    succeeded = result.succeeded,
                    duration_ms = result.duration_ms(),
                    "finished test case"
                );
                anyhow::Ok(())
            }
        })
        .buffer_unordered(jobs.max(1))
        .try_collect::<Vec<()>>()
        .await?;
    Ok(())
}
