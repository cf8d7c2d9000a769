//! # File System Operations Module / 文件系统操作模块
//!
//! Writes the generated report artifacts into a results directory.
//! Both artifacts are regenerated from the accumulator on every call.
//!
//! 将生成的报告产物写入结果目录。每次调用都会根据累加器重新生成两个产物。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::accumulator::ResultAccumulator;
use crate::reporting::ctrf::{CtrfReport, generate_report};
use crate::reporting::markdown::generate_markdown_summary;

pub const CTRF_REPORT_FILE: &str = "ctrf-report.json";
pub const SUMMARY_FILE: &str = "test-summary.md";

/// Paths of the files written by [`save_results`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifacts {
    pub report_path: PathBuf,
    pub summary_path: PathBuf,
}

/// Saves the CTRF report and the markdown summary to `output_dir`.
///
/// The directory and any missing parents are created first. Both files are
/// attempted even if the first write fails, but any failure is returned as an
/// error: CI consumers need both artifacts.
///
/// 将 CTRF 报告和 Markdown 摘要保存到 `output_dir`。
/// 会先创建目录及缺失的父目录。即使第一个写入失败也会尝试写入第二个文件，
/// 但任何失败都会作为错误返回：CI 使用方需要两个产物。
///
/// # Errors / 错误
/// - The directory cannot be created
/// - Either file cannot be written
pub fn save_results(accumulator: &ResultAccumulator, output_dir: &Path) -> Result<SavedArtifacts> {
    fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create results directory: {}", output_dir.display())
    })?;

    let report_path = output_dir.join(CTRF_REPORT_FILE);
    let summary_path = output_dir.join(SUMMARY_FILE);

    let report_written = write_report(&generate_report(accumulator), &report_path);
    let summary_written = fs::write(&summary_path, generate_markdown_summary(accumulator))
        .with_context(|| format!("Failed to write summary: {}", summary_path.display()));

    match (report_written, summary_written) {
        (Ok(()), Ok(())) => {}
        (Err(e), Ok(())) | (Ok(()), Err(e)) => return Err(e),
        (Err(report_err), Err(summary_err)) => {
            return Err(report_err.context(format!("{summary_err:#}")));
        }
    }

    info!(
        report = %report_path.display(),
        summary = %summary_path.display(),
        "saved test artifacts"
    );

    Ok(SavedArtifacts {
        report_path,
        summary_path,
    })
}

/// Serializes a report as 2-space indented JSON.
pub fn write_report(report: &CtrfReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize CTRF report")?;
    fs::write(path, json).with_context(|| format!("Failed to write CTRF report: {}", path.display()))
}

/// Reads a CTRF report back from disk.
pub fn read_report(path: &Path) -> Result<CtrfReport> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read CTRF report: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse CTRF report: {}", path.display()))
}
