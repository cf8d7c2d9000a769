//! # Reporting Module / 报告模块
//!
//! Turns accumulated run results into output: the CTRF JSON report, the
//! markdown job summary, and the colored console summary. The two file formats
//! share a single status-formatting function.
//!
//! 将累积的运行结果转换为输出：CTRF JSON 报告、Markdown 作业摘要和彩色控制台摘要。
//! 两种文件格式共享同一个状态格式化函数。

pub mod console;
pub mod ctrf;
pub mod markdown;
pub mod status;

// Re-export common reporting functions
pub use console::{print_failure_details, print_summary};
pub use ctrf::{CtrfReport, generate_report, generate_report_at};
pub use markdown::generate_markdown_summary;
