//! # Status Formatting / 状态格式化
//!
//! The one place that decides how a step status is rendered. Both the CTRF
//! report and the markdown summary go through [`format_status`], so the two
//! artifacts can never disagree about a step.
//!
//! 决定步骤状态如何呈现的唯一位置。CTRF 报告和 Markdown 摘要都通过
//! [`format_status`]，因此两个产物对同一步骤的呈现永远一致。
//!
//! Case durations are rendered here too, by [`format_seconds`].

use crate::core::models::StepStatus;
use crate::reporting::ctrf::CtrfStatus;

pub const PASS_GLYPH: &str = "✅";
pub const FAIL_GLYPH: &str = "❌";
pub const PENDING_GLYPH: &str = "⏳";

/// Rendered forms of a single step status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFormat {
    /// Status in the CTRF taxonomy. `pending` has no CTRF equivalent and maps to `skipped`.
    pub ctrf: CtrfStatus,
    pub glyph: &'static str,
    pub label: &'static str,
}

pub fn format_status(status: StepStatus) -> StatusFormat {
    match status {
        StepStatus::Passed => StatusFormat {
            ctrf: CtrfStatus::Passed,
            glyph: PASS_GLYPH,
            label: status.as_str(),
        },
        StepStatus::Failed => StatusFormat {
            ctrf: CtrfStatus::Failed,
            glyph: FAIL_GLYPH,
            label: status.as_str(),
        },
        StepStatus::Pending => StatusFormat {
            ctrf: CtrfStatus::Skipped,
            glyph: PENDING_GLYPH,
            label: status.as_str(),
        },
    }
}

/// Glyph for a whole test case.
pub fn case_glyph(succeeded: bool) -> &'static str {
    if succeeded { PASS_GLYPH } else { FAIL_GLYPH }
}

/// Renders a duration in milliseconds as seconds with two decimals, e.g. `2.00`.
///
/// Rounds like JavaScript's `toFixed(2)`: the exact binary value is rounded to
/// the nearest hundredth and exact ties go away from zero. `{:.2}` alone would
/// round ties to even, which only differs when `ms / 1000` is an exact binary
/// fraction ending in 5, i.e. `ms % 1000` is 125, 375, 625 or 875.
///
/// 以两位小数的秒数呈现毫秒时长。舍入方式与 JavaScript 的 `toFixed(2)` 一致：
/// 恰好位于中点时远离零舍入。
pub fn format_seconds(ms: i64) -> String {
    if ms % 125 == 0 && ms % 10 != 0 {
        let centis = (ms.unsigned_abs() + 5) / 10;
        let sign = if ms < 0 { "-" } else { "" };
        return format!("{sign}{}.{:02}", centis / 100, centis % 100);
    }
    format!("{:.2}", ms as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_seconds_rounds_exact_ties_up() {
        assert_eq!(format_seconds(125), "0.13");
        assert_eq!(format_seconds(1625), "1.63");
        assert_eq!(format_seconds(375), "0.38");
        assert_eq!(format_seconds(-125), "-0.13");
    }

    #[test]
    fn test_format_seconds_keeps_binary_rounding_elsewhere() {
        // 1.005 is stored just below the tie.
        assert_eq!(format_seconds(1005), "1.00");
        assert_eq!(format_seconds(2000), "2.00");
        assert_eq!(format_seconds(1234), "1.23");
        assert_eq!(format_seconds(500), "0.50");
        assert_eq!(format_seconds(0), "0.00");
    }

    #[test]
    fn test_pending_maps_to_skipped_for_ctrf_only() {
        let fmt = format_status(StepStatus::Pending);
        assert_eq!(fmt.ctrf, CtrfStatus::Skipped);
        assert_eq!(fmt.label, "pending");
        assert_eq!(fmt.glyph, PENDING_GLYPH);
    }

    #[test]
    fn test_terminal_statuses_pass_through() {
        assert_eq!(format_status(StepStatus::Passed).ctrf, CtrfStatus::Passed);
        assert_eq!(format_status(StepStatus::Failed).ctrf, CtrfStatus::Failed);
        assert_eq!(format_status(StepStatus::Failed).glyph, FAIL_GLYPH);
    }
}
