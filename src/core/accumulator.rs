//! # Result Accumulator Module / 结果累加器模块
//!
//! An append-only, in-memory store of finished test-case runs. Reports are
//! always derived from this store; it is never written to disk itself.
//!
//! 一个仅追加的内存存储，保存已完成的测试用例运行结果。
//! 报告始终从此存储派生；存储本身永远不会写入磁盘。
//!
//! ## Concurrency / 并发
//!
//! `ResultAccumulator` does no locking of its own. A caller that finishes cases
//! concurrently must serialize calls to [`ResultAccumulator::record`], for
//! example by holding the accumulator behind a single mutex.
//!
//! `ResultAccumulator` 本身不做任何加锁。并发完成用例的调用者必须串行化
//! 对 [`ResultAccumulator::record`] 的调用，例如将累加器放在单个互斥锁之后。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::models::TestCase;

/// The immutable outcome of one finished test case.
/// 一个已完成测试用例的不可变结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub test_case: TestCase,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Derived from the steps when the result is recorded.
    /// 在记录结果时根据步骤推导。
    pub succeeded: bool,
}

impl RunResult {
    /// Wall-clock duration of the case in milliseconds.
    /// Negative if the caller passed an end time before the start time.
    pub fn duration_ms(&self) -> i64 {
        (self.end_time - self.start_time).num_milliseconds()
    }
}

/// Collects run results in the order cases finish.
/// 按用例完成的顺序收集运行结果。
#[derive(Debug, Default)]
pub struct ResultAccumulator {
    results: Vec<RunResult>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finished test case.
    ///
    /// `end_time` is expected to be at or after `start_time`, but this is not
    /// checked; a reversed pair simply produces a negative duration.
    ///
    /// 记录一个已完成的测试用例。
    /// `end_time` 应不早于 `start_time`，但不做检查；颠倒的时间只会产生负的持续时间。
    pub fn record(
        &mut self,
        test_case: TestCase,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> &RunResult {
        let succeeded = test_case.is_succeeded();
        debug!(
            case = %test_case.id,
            succeeded,
            steps = test_case.steps.len(),
            "recorded test case result"
        );
        self.results.push(RunResult {
            test_case,
            start_time,
            end_time,
            succeeded,
        });
        // Just pushed, so the vector is non-empty.
        &self.results[self.results.len() - 1]
    }

    /// All recorded results, in recording order.
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of recorded cases that succeeded.
    pub fn passed_cases(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded).count()
    }

    /// `true` if every recorded case succeeded. Also `true` when nothing was recorded.
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.succeeded)
    }
}
