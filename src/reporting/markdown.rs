//! # Markdown Summary Module / Markdown 摘要模块
//!
//! Renders the human-readable summary meant for a CI job summary panel.
//! Counts here are per test case, unlike the CTRF report which counts steps.
//!
//! 生成用于 CI 作业摘要面板的人类可读摘要。
//! 此处的计数以测试用例为单位，而 CTRF 报告以步骤为单位。

use crate::core::accumulator::{ResultAccumulator, RunResult};
use crate::reporting::status::{
    FAIL_GLYPH, PASS_GLYPH, case_glyph, format_seconds, format_status,
};

/// Generates the markdown summary from the accumulator's current contents.
pub fn generate_markdown_summary(accumulator: &ResultAccumulator) -> String {
    let results = accumulator.results();
    let total = results.len();
    let passed = accumulator.passed_cases();
    let failed = total - passed;

    let mut md = String::from("# Test Results\n\n");
    md.push_str(&format!(
        "## Summary\n\
         - **Total Test Cases**: {total}\n\
         - **Passed**: {passed} {PASS_GLYPH}\n\
         - **Failed**: {failed} {FAIL_GLYPH}\n\n"
    ));

    md.push_str("## Detailed Results\n\n");
    for result in results {
        push_case(&mut md, result);
    }

    md
}

fn push_case(md: &mut String, result: &RunResult) {
    let case = &result.test_case;

    md.push_str(&format!(
        "### {} {}\n**Duration**: {}s\n\n**Description**: {}\n\n",
        case_glyph(result.succeeded),
        case.id,
        format_seconds(result.duration_ms()),
        case.description
    ));

    if case.steps.is_empty() {
        return;
    }

    md.push_str(&format!(
        "<details>\n<summary>Steps ({})</summary>\n\n\
         | Step | Description | Status |\n\
         |------|-------------|--------|\n",
        case.steps.len()
    ));

    for step in &case.steps {
        let status = format_status(step.status);
        md.push_str(&format!(
            "| {} | {} | {} {} |\n",
            step.id, step.description, status.glyph, status.label
        ));
        if let Some(error) = step.error_message() {
            md.push_str(&format!("| | Error: {error} | |\n"));
        }
    }

    md.push_str("\n</details>\n\n");
}
