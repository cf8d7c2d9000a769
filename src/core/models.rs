//! # Data Models Module / 数据模型模块
//!
//! This module defines the data shapes for a test plan: test cases, their ordered
//! steps, and the closed step status enumeration. It also defines the step update
//! message an executor produces while a case is running.
//!
//! 此模块定义测试计划的数据结构：测试用例、其有序的步骤以及封闭的步骤状态枚举。
//! 它还定义了执行器在用例运行期间产生的步骤更新消息。

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// The status of a single step.
/// `Pending` is the initial state; `Passed` and `Failed` are terminal.
///
/// 单个步骤的状态。
/// `Pending` 是初始状态；`Passed` 和 `Failed` 是终止状态。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Not yet checked by the executor. / 尚未被执行器检查。
    #[default]
    Pending,
    /// The executor confirmed the step. / 执行器确认该步骤通过。
    Passed,
    /// The executor reported the step as failed. / 执行器报告该步骤失败。
    Failed,
}

impl StepStatus {
    /// Returns `true` for `Passed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Passed | StepStatus::Failed)
    }

    /// The lowercase name used in both input files and rendered output.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Passed => "passed",
            StepStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One atomic, checked action within a test case.
/// 测试用例中的一个原子检查动作。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Stable identifier within the parent test case. / 在所属测试用例内的稳定标识符。
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Human-readable action text. / 人类可读的动作描述。
    pub description: String,
    /// Current status; absent in the input means `pending`.
    /// 当前状态；输入中缺失时表示 `pending`。
    #[serde(default)]
    pub status: StepStatus,
    /// Failure message, only meaningful when `status` is `failed`.
    /// 失败信息，仅在 `status` 为 `failed` 时有意义。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Step {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            status: StepStatus::Pending,
            error: None,
        }
    }

    /// The error text if there is a non-empty one.
    ///
    /// Empty strings are treated the same as a missing error so that the CTRF
    /// report and the markdown summary agree on whether a step "has" an error.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

/// A named, ordered sequence of steps representing one scenario.
/// Step order is fixed at creation and is the order used in every report.
///
/// 一个命名的、有序的步骤序列，代表一个场景。
/// 步骤顺序在创建时确定，并在所有报告中保持该顺序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl TestCase {
    pub fn new(id: impl Into<String>, description: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            steps,
        }
    }

    /// A case succeeds only if it has at least one step and every step passed.
    /// A case without steps, or with any failed or pending step, did not succeed.
    ///
    /// 仅当用例至少有一个步骤且所有步骤都通过时才算成功。
    pub fn is_succeeded(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.status == StepStatus::Passed)
    }

    /// Number of steps currently in `status`.
    pub fn count_status(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    /// Applies an executor-provided update to the matching step.
    ///
    /// A step that already reached a terminal status can never go back to
    /// `pending`. Switching between `passed` and `failed` is accepted so an
    /// executor can correct an earlier verdict. The error text is only kept for
    /// failed steps.
    ///
    /// 将执行器提供的更新应用到匹配的步骤。
    /// 已到达终止状态的步骤永远不能回到 `pending`。
    pub fn apply_update(&mut self, update: &StepUpdate) -> Result<(), UpdateError> {
        let step = self
            .steps
            .iter_mut()
            .find(|s| s.id == update.step_id)
            .ok_or_else(|| UpdateError::UnknownStep {
                case_id: self.id.clone(),
                step_id: update.step_id.clone(),
            })?;

        if step.status.is_terminal() && update.status == StepStatus::Pending {
            return Err(UpdateError::RevertToPending {
                case_id: self.id.clone(),
                step_id: step.id.clone(),
                current: step.status,
            });
        }

        step.status = update.status;
        step.error = match update.status {
            StepStatus::Failed => update.error.clone(),
            StepStatus::Passed | StepStatus::Pending => None,
        };
        Ok(())
    }
}

/// A status change for one step, emitted by an executor while a case runs.
/// 执行器在用例运行期间发出的单个步骤的状态变更。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepUpdate {
    #[serde(deserialize_with = "string_or_number")]
    pub step_id: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepUpdate {
    pub fn passed(step_id: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::Passed,
            error: None,
        }
    }

    pub fn failed(step_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// Reasons a step update is rejected.
/// 步骤更新被拒绝的原因。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateError {
    #[error("test case '{case_id}' has no step '{step_id}'")]
    UnknownStep { case_id: String, step_id: String },

    #[error("step '{step_id}' of test case '{case_id}' is already {current} and cannot return to pending")]
    RevertToPending {
        case_id: String,
        step_id: String,
        current: StepStatus,
    },
}

/// Accepts ids written either as JSON strings or integers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
    })
}
