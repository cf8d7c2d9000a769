//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for the runner:
//! agent process execution, report persistence, and logging setup.
//!
//! 此模块为运行器提供基础设施服务：
//! 代理进程执行、报告持久化和日志设置。

pub mod command;
pub mod fs;
pub mod logging;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
