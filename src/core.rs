//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the runner:
//! the test plan model, the result accumulator, configuration, and the
//! execution loop that feeds finished cases into the accumulator.
//!
//! 此模块包含运行器的核心功能：
//! 测试计划模型、结果累加器、配置，以及将完成的用例送入累加器的执行循环。

pub mod accumulator;
pub mod config;
pub mod execution;
pub mod models;

// Re-exports
pub use accumulator::{ResultAccumulator, RunResult};
pub use execution::{AgentExecutor, Executor, run_test_cases};
pub use models::{Step, StepStatus, TestCase};
