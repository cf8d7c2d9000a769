//! # Configuration Module / 配置模块
//!
//! Loads the two inputs of a run: the JSON test plan (a list of test cases) and
//! the optional TOML runner configuration. Command-line flags are merged over
//! the configuration file to produce the final [`RunSettings`].
//!
//! 加载一次运行的两个输入：JSON 测试计划（测试用例列表）和可选的 TOML 运行器配置。
//! 命令行参数覆盖配置文件，得到最终的 [`RunSettings`]。

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::models::TestCase;
use crate::infra::t;

/// Configuration file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "agent-runner.toml";

/// Runner settings read from a TOML file. Every field is optional in the file.
/// 从 TOML 文件读取的运行器设置。文件中的每个字段都是可选的。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// The language for console messages (e.g., "en", "zh-CN").
    /// 控制台消息的语言（例如 "en", "zh-CN"）。
    pub language: Option<String>,
    /// Command line that starts the agent for one test case.
    /// 为单个测试用例启动代理的命令行。
    pub agent_command: Option<String>,
    pub max_turns: u32,
    pub screenshots: bool,
    /// How many test cases may run at once. `1` runs them in plan order.
    /// 可同时运行的测试用例数量。`1` 表示按计划顺序依次运行。
    pub jobs: usize,
    pub timeout_secs: Option<u64>,
    /// Parent directory for timestamped result folders.
    /// 带时间戳的结果文件夹的父目录。
    pub results_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            language: None,
            agent_command: None,
            max_turns: 30,
            screenshots: false,
            jobs: 1,
            timeout_secs: None,
            results_dir: PathBuf::from("results"),
        }
    }
}

/// Loads a runner configuration file.
pub fn load_runner_config(path: &Path) -> Result<RunnerConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
    toml::from_str(&content)
        .with_context(|| t!("config.parse_failed", path = path.display()).to_string())
}

/// Loads the configuration from `explicit` if given, otherwise from
/// [`DEFAULT_CONFIG_FILE`] if it exists, otherwise returns the defaults.
pub fn resolve_runner_config(explicit: Option<&Path>) -> Result<RunnerConfig> {
    match explicit {
        Some(path) => load_runner_config(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.is_file() {
                load_runner_config(default_path)
            } else {
                Ok(RunnerConfig::default())
            }
        }
    }
}

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub tests_path: PathBuf,
    pub results_path: Option<PathBuf>,
    pub verbose: bool,
    pub max_turns: Option<u32>,
    pub screenshots: bool,
    pub agent_command: Option<String>,
    pub jobs: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings for one run.
/// 一次运行的完整解析后的设置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub tests_path: PathBuf,
    pub results_path: PathBuf,
    pub verbose: bool,
    pub max_turns: u32,
    pub screenshots: bool,
    pub agent_command: Option<String>,
    pub jobs: usize,
    pub timeout: Option<Duration>,
}

impl RunSettings {
    /// Merges command-line values over the configuration file.
    /// `now` picks the default results directory when none was given.
    pub fn resolve(overrides: RunOverrides, config: RunnerConfig, now: DateTime<Utc>) -> Self {
        let results_path = overrides
            .results_path
            .unwrap_or_else(|| default_results_dir(&config.results_dir, now));

        Self {
            tests_path: overrides.tests_path,
            results_path,
            verbose: overrides.verbose,
            max_turns: overrides.max_turns.unwrap_or(config.max_turns),
            screenshots: overrides.screenshots || config.screenshots,
            agent_command: overrides.agent_command.or(config.agent_command),
            jobs: overrides.jobs.unwrap_or(config.jobs).max(1),
            timeout: overrides
                .timeout_secs
                .or(config.timeout_secs)
                .map(Duration::from_secs),
        }
    }
}

/// A results directory unique to the moment `now`, down to the millisecond,
/// e.g. `results/20260117-093005-042`.
pub fn default_results_dir(base: &Path, now: DateTime<Utc>) -> PathBuf {
    base.join(now.format("%Y%m%d-%H%M%S-%3f").to_string())
}

/// Reads, parses and validates a JSON test plan.
pub fn load_test_cases(path: &Path) -> Result<Vec<TestCase>> {
    let content = fs::read_to_string(path)
        .with_context(|| t!("plan.read_failed", path = path.display()).to_string())?;
    let cases: Vec<TestCase> = serde_json::from_str(&content)
        .with_context(|| t!("plan.parse_failed", path = path.display()).to_string())?;
    validate_test_cases(&cases)
        .with_context(|| t!("plan.invalid", path = path.display()).to_string())?;
    Ok(cases)
}

/// Checks the identifiers of a test plan.
///
/// - Test case ids must be non-empty and unique within the plan.
/// - Step ids must be non-empty and unique within their test case.
///
/// 检查测试计划的标识符：用例 id 非空且在计划内唯一；步骤 id 非空且在所属用例内唯一。
pub fn validate_test_cases(cases: &[TestCase]) -> Result<()> {
    let mut case_ids = HashSet::new();
    for (index, case) in cases.iter().enumerate() {
        if case.id.trim().is_empty() {
            bail!("test case #{} has an empty id", index + 1);
        }
        if !case_ids.insert(case.id.as_str()) {
            bail!("duplicate test case id '{}'", case.id);
        }

        let mut step_ids = HashSet::new();
        for (step_index, step) in case.steps.iter().enumerate() {
            if step.id.trim().is_empty() {
                bail!("step #{} of test case '{}' has an empty id", step_index + 1, case.id);
            }
            if !step_ids.insert(step.id.as_str()) {
                bail!("duplicate step id '{}' in test case '{}'", step.id, case.id);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Step;
    use chrono::TimeZone;

    #[test]
    fn test_default_results_dir_uses_full_timestamp() {
        let now = Utc.with_ymd_and_hms(2026, 1, 17, 9, 30, 5).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(
            default_results_dir(Path::new("results"), now),
            PathBuf::from("results/20260117-093005-042")
        );
    }

    #[test]
    fn test_overrides_win_over_config() {
        let config = RunnerConfig {
            agent_command: Some("from-config".into()),
            max_turns: 12,
            jobs: 4,
            timeout_secs: Some(60),
            ..RunnerConfig::default()
        };
        let overrides = RunOverrides {
            tests_path: "tests.json".into(),
            agent_command: Some("from-cli".into()),
            jobs: Some(0),
            ..RunOverrides::default()
        };
        let settings = RunSettings::resolve(overrides, config, Utc::now());
        assert_eq!(settings.agent_command.as_deref(), Some("from-cli"));
        assert_eq!(settings.max_turns, 12);
        assert_eq!(settings.jobs, 1);
        assert_eq!(settings.timeout, Some(Duration::from_secs(60)));
        assert!(settings.results_path.starts_with("results"));
    }

    #[test]
    fn test_duplicate_step_ids_are_rejected() {
        let cases = vec![TestCase::new(
            "a",
            "A",
            vec![Step::new("1", "x"), Step::new("1", "y")],
        )];
        let err = validate_test_cases(&cases).unwrap_err();
        assert!(err.to_string().contains("duplicate step id '1'"));
    }

    #[test]
    fn test_duplicate_case_ids_are_rejected() {
        let cases = vec![TestCase::new("a", "", vec![]), TestCase::new("a", "", vec![])];
        assert!(validate_test_cases(&cases).is_err());
    }
}
