//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which writes a sample JSON test
//! plan that can be edited and passed to `run --tests-path`.
//!
//! 此模块实现 `init` 命令，写入一个示例 JSON 测试计划，
//! 可编辑后传给 `run --tests-path`。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::Input;
use std::{fs, path::PathBuf};

use crate::core::models::{Step, TestCase};
use crate::infra::t;

const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Builds the sample plan for the app at `app_url`.
pub fn sample_test_plan(app_url: &str) -> Vec<TestCase> {
    vec![
        TestCase::new(
            "home-page-loads",
            "The home page loads and shows its main heading",
            vec![
                Step::new("1", format!("Navigate to {app_url}")),
                Step::new("2", "Verify the page title is not empty"),
                Step::new("3", "Verify the main heading is visible"),
            ],
        ),
        TestCase::new(
            "navigation-works",
            "The first link in the main navigation opens a new page",
            vec![
                Step::new("1", format!("Navigate to {app_url}")),
                Step::new("2", "Click the first link in the main navigation"),
                Step::new("3", "Verify the URL changed"),
            ],
        ),
    ]
}

/// Executes the init command.
///
/// # Arguments
/// * `output` - Path for the new test plan file
/// * `force` - Whether to overwrite an existing file
/// * `non_interactive` - Skip the prompt and use the default app URL
pub fn execute(output: PathBuf, force: bool, non_interactive: bool) -> Result<()> {
    // Check if file already exists
    if output.exists() && !force {
        println!("{}", t!("init.file_exists", path = output.display()).red());
        println!("{}", t!("init.use_force").yellow());
        return Ok(());
    }

    let app_url = if non_interactive {
        DEFAULT_APP_URL.to_string()
    } else {
        Input::<String>::new()
            .with_prompt(t!("init.prompt_url").to_string())
            .default(DEFAULT_APP_URL.to_string())
            .interact_text()?
    };

    // Create parent directories if needed
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            t!("init.create_parent_dir_failed", path = parent.display()).to_string()
        })?;
    }

    let plan = serde_json::to_string_pretty(&sample_test_plan(&app_url))?;
    fs::write(&output, plan)
        .with_context(|| t!("init.write_failed", path = output.display()).to_string())?;

    println!("{}", t!("init.success", path = output.display()).green());
    println!("{}", t!("init.next_steps"));

    Ok(())
}
