//! # Agent Test Runner Library / Agent Test Runner 库
//!
//! This library drives agent-executed browser test plans and aggregates their
//! outcomes into a CTRF JSON report and a markdown summary for CI.
//!
//! 此库驱动由代理执行的浏览器测试计划，
//! 并将结果汇总为供 CI 使用的 CTRF JSON 报告和 Markdown 摘要。
//!
//! ## Modules / 模块
//!
//! - `core` - Test plan model, result accumulator, configuration and execution
//! - `infra` - Agent process handling, report persistence and logging
//! - `reporting` - CTRF report, markdown summary and console output
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 测试计划模型、结果累加器、配置和执行
//! - `infra` - 代理进程处理、报告持久化和日志
//! - `reporting` - CTRF 报告、Markdown 摘要和控制台输出
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::accumulator;
pub use crate::core::models;
pub use infra::fs::save_results;
pub use reporting::{generate_markdown_summary, generate_report};

/// Picks the UI language and activates it for console messages.
///
/// The requested language (from `--lang` or the config file) is tried first,
/// then the system locale. A full match (e.g. "zh-CN") wins; otherwise any
/// available locale with the same language code is used; otherwise "en".
/// Returns the chosen locale.
pub fn init(requested: Option<&str>) -> String {
    let locale = requested
        .map(str::to_string)
        .or_else(sys_locale::get_locale)
        .unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale.as_str()) {
        locale
    } else {
        let code = locale.split(['-', '_']).next().unwrap_or_default();
        available_locales
            .iter()
            .find(|available| available.split('-').next() == Some(code))
            .map_or_else(|| "en".to_string(), |available| available.to_string())
    };

    rust_i18n::set_locale(&lang);
    lang
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
