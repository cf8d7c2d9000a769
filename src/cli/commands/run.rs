//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which executes every test case of
//! a test plan through the agent, prints a summary, and saves the CTRF report
//! and markdown summary.
//!
//! 此模块实现 `run` 命令：通过代理执行测试计划中的每个测试用例，
//! 打印摘要，并保存 CTRF 报告和 Markdown 摘要。

use anyhow::{Result, bail};
use chrono::Utc;
use colored::*;
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    core::{
        accumulator::ResultAccumulator,
        config::{self, RunOverrides, RunSettings},
        execution::{AgentExecutor, AgentOptions, run_test_cases},
    },
    infra::{fs::save_results, logging, t},
    reporting::console::{print_failure_details, print_summary},
};

/// Executes the run command.
///
/// # Arguments
/// * `overrides` - Values given on the command line
/// * `config_path` - Optional explicit runner configuration file
/// * `language_forced` - Whether `--lang` was given, which beats the config file
///
/// # Returns
/// `Ok(true)` when every recorded test case succeeded. Reports are saved
/// before any test failure or executor error is returned.
pub async fn execute(
    overrides: RunOverrides,
    config_path: Option<PathBuf>,
    language_forced: bool,
) -> Result<bool> {
    let runner_config = config::resolve_runner_config(config_path.as_deref())?;
    if !language_forced {
        if let Some(language) = &runner_config.language {
            crate::init(Some(language));
        }
    }

    let settings = RunSettings::resolve(overrides, runner_config, Utc::now());
    logging::init_logging(settings.verbose)?;

    println!(
        "{}",
        t!("run.loading_plan", path = settings.tests_path.display())
    );
    let cases = config::load_test_cases(&settings.tests_path)?;
    println!("{}", t!("run.loaded_cases", count = cases.len()).cyan());
    println!(
        "{}",
        t!("run.results_dir", path = settings.results_path.display())
    );

    let executor = match &settings.agent_command {
        Some(command_line) => Some(AgentExecutor::from_command_line(
            command_line,
            AgentOptions {
                max_turns: settings.max_turns,
                screenshots: settings.screenshots,
                results_dir: settings.results_path.clone(),
                timeout: settings.timeout,
            },
        )?),
        None if cases.is_empty() => None,
        None => bail!(t!("run.agent_missing").to_string()),
    };

    let accumulator = Mutex::new(ResultAccumulator::new());
    let run_outcome = match executor {
        Some(executor) => {
            let cancel = setup_signal_handler();
            run_test_cases(cases, &executor, settings.jobs, &accumulator, &cancel).await
        }
        None => {
            println!("{}", t!("run.no_cases").yellow());
            Ok(())
        }
    };

    let accumulator = accumulator.into_inner();
    print_summary(accumulator.results(), &rust_i18n::locale());
    print_failure_details(accumulator.results(), &rust_i18n::locale());

    // Reports are written even when the run was cut short.
    let saved = save_results(&accumulator, &settings.results_path)?;
    println!(
        "\n{}",
        t!("run.artifacts_saved", path = settings.results_path.display()).bold()
    );
    tracing::debug!(report = %saved.report_path.display(), "CTRF report written");

    if let Err(e) = run_outcome {
        error!("{e:#}");
        return Err(e);
    }

    if accumulator.all_succeeded() {
        println!("{}", t!("run.all_passed").green().bold());
        Ok(true)
    } else {
        let total = accumulator.len();
        let failed = total - accumulator.passed_cases();
        println!(
            "{}",
            t!("run.some_failed", failed = failed, total = total).red().bold()
        );
        Ok(false)
    }
}

/// Sets up a signal handler for graceful shutdown.
/// Ctrl-C cancels the returned token; running agents are stopped and their
/// test cases recorded as they stand.
fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("run.shutdown_signal").yellow());
            token_clone.cancel();
        }
    });

    token
}
