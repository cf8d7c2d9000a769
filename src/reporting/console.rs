//! # Console Reporting Module / 控制台报告模块
//!
//! Prints a colored summary of the recorded test cases to the terminal once a
//! run is over. Message text is localized; the file artifacts are not.
//!
//! 运行结束后在终端打印已记录测试用例的彩色摘要。
//! 消息文本会本地化；文件产物不会。

use colored::*;

use crate::core::accumulator::RunResult;
use crate::core::models::StepStatus;
use crate::infra::t;
use crate::reporting::status::{format_seconds, format_status};

/// Prints one line per recorded case.
///
/// # Output Format / 输出格式
/// ```text
/// --- Test Summary ---
///   - Passed   | login                                    |      2.00s | 2/2 steps
///   - Failed   | checkout                                 |      0.50s | 0/1 steps
/// ```
pub fn print_summary(results: &[RunResult], locale: &str) {
    println!("\n{}", t!("summary.banner", locale = locale).bold());

    for result in results {
        let case = &result.test_case;
        let status = if result.succeeded {
            t!("summary.status_passed", locale = locale).to_string().green()
        } else {
            t!("summary.status_failed", locale = locale).to_string().red()
        };
        let duration = format!("{}s", format_seconds(result.duration_ms()));
        let steps = t!(
            "summary.steps",
            locale = locale,
            passed = case.count_status(StepStatus::Passed),
            total = case.steps.len()
        );

        println!(
            "  - {:<8} | {:<40} | {:>10} | {}",
            status, case.id, duration, steps
        );
    }
}

/// Prints every step that kept a case from succeeding, with its error text.
/// Does nothing when all cases succeeded.
///
/// 打印导致用例未成功的每个步骤及其错误信息。所有用例都成功时不打印任何内容。
pub fn print_failure_details(results: &[RunResult], locale: &str) {
    let failed: Vec<&RunResult> = results.iter().filter(|r| !r.succeeded).collect();
    if failed.is_empty() {
        return;
    }

    println!("\n{}", t!("failure.banner", locale = locale).red().bold());
    for result in failed {
        let case = &result.test_case;
        println!("{} {}", "■".red(), case.id.cyan());

        for step in case.steps.iter().filter(|s| s.status != StepStatus::Passed) {
            let fmt = format_status(step.status);
            let detail = match (step.status, step.error_message()) {
                (_, Some(error)) => error.to_string(),
                (StepStatus::Pending, None) => t!("failure.not_run", locale = locale).to_string(),
                _ => String::new(),
            };
            println!(
                "    {} [{}] {} {}",
                fmt.glyph,
                step.id,
                step.description,
                detail.dimmed()
            );
        }
    }
}
