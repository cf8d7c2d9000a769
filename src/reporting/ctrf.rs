//! # CTRF Report Module / CTRF 报告模块
//!
//! Builds the structured, machine-readable report in the Common Test Report
//! Format. Every step of every recorded case becomes one flattened CTRF test,
//! tagged with its parent case id as the suite.
//!
//! 以通用测试报告格式（CTRF）构建结构化的机器可读报告。
//! 每个已记录用例的每个步骤都成为一个扁平化的 CTRF 测试，并以其所属用例 id 作为 suite。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::accumulator::{ResultAccumulator, RunResult};
use crate::core::models::StepStatus;
use crate::reporting::status::format_status;

pub const REPORT_FORMAT: &str = "CTRF";
pub const SPEC_VERSION: &str = "0.0.0";
pub const TOOL_NAME: &str = "agent-test-runner";
pub const TOOL_VERSION: &str = "1.0.0";

/// Top-level CTRF document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtrfReport {
    pub report_format: String,
    pub spec_version: String,
    pub results: CtrfResults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtrfResults {
    pub tool: CtrfTool,
    pub summary: CtrfSummary,
    pub tests: Vec<CtrfTest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtrfTool {
    pub name: String,
    pub version: String,
}

/// Step-level totals across all recorded cases.
/// `skipped` mirrors `pending`, and `other` is always zero.
///
/// 所有已记录用例的步骤级汇总。`skipped` 与 `pending` 相同，`other` 始终为零。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtrfSummary {
    pub tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub skipped: usize,
    pub other: usize,
    /// Milliseconds since the Unix epoch. / 自 Unix 纪元以来的毫秒数。
    pub start: i64,
    pub stop: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtrfStatus {
    Passed,
    Failed,
    Skipped,
}

/// One flattened step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtrfTest {
    pub name: String,
    pub status: CtrfStatus,
    pub duration: i64,
    /// Start of the parent case, not of the step.
    pub start: i64,
    /// End of the parent case, not of the step.
    pub stop: i64,
    pub suite: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

/// Generates the CTRF report from the accumulator's current contents.
///
/// With no recorded cases, the summary `start` and `stop` fall back to the
/// current time.
pub fn generate_report(accumulator: &ResultAccumulator) -> CtrfReport {
    generate_report_at(accumulator, Utc::now())
}

/// Same as [`generate_report`], with an explicit "now" used only when no case
/// has been recorded.
///
/// 与 [`generate_report`] 相同，但显式传入“当前时间”，仅在没有记录任何用例时使用。
pub fn generate_report_at(accumulator: &ResultAccumulator, now: DateTime<Utc>) -> CtrfReport {
    let results = accumulator.results();

    let mut summary = CtrfSummary {
        tests: 0,
        passed: 0,
        failed: 0,
        pending: 0,
        skipped: 0,
        other: 0,
        start: results
            .first()
            .map_or(now, |r| r.start_time)
            .timestamp_millis(),
        stop: results
            .last()
            .map_or(now, |r| r.end_time)
            .timestamp_millis(),
    };

    let mut tests = Vec::with_capacity(results.iter().map(|r| r.test_case.steps.len()).sum());
    for result in results {
        let case = &result.test_case;
        summary.tests += case.steps.len();
        summary.passed += case.count_status(StepStatus::Passed);
        summary.failed += case.count_status(StepStatus::Failed);
        summary.pending += case.count_status(StepStatus::Pending);

        tests.extend(flatten_steps(result));
    }
    summary.skipped = summary.pending;

    CtrfReport {
        report_format: REPORT_FORMAT.to_string(),
        spec_version: SPEC_VERSION.to_string(),
        results: CtrfResults {
            tool: CtrfTool {
                name: TOOL_NAME.to_string(),
                version: TOOL_VERSION.to_string(),
            },
            summary,
            tests,
        },
    }
}

fn flatten_steps(result: &RunResult) -> impl Iterator<Item = CtrfTest> + '_ {
    let case = &result.test_case;
    let duration = step_duration_ms(result.duration_ms(), case.steps.len());
    let start = result.start_time.timestamp_millis();
    let stop = result.end_time.timestamp_millis();

    case.steps.iter().map(move |step| {
        let error = step.error_message().map(str::to_string);
        CtrfTest {
            name: step.description.clone(),
            status: format_status(step.status).ctrf,
            duration,
            start,
            stop,
            suite: case.id.clone(),
            message: error.clone(),
            trace: error,
        }
    })
}

/// Splits a case's duration evenly over its steps, rounded to the nearest
/// millisecond with halves rounding up.
///
/// The runner does not observe per-step timing, so this approximation is the
/// only duration a step ever gets.
pub fn step_duration_ms(case_duration_ms: i64, step_count: usize) -> i64 {
    if step_count == 0 {
        return 0;
    }
    let per_step = case_duration_ms as f64 / step_count as f64;
    (per_step + 0.5).floor() as i64
}
