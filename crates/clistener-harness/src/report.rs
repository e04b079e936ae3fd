//! Report generation for conformance results.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::verify::VerificationSummary;

/// A conformance report over one or more fixture runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Report title.
    pub title: String,
    /// Conversion mode(s) tested.
    pub mode: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    /// Verification summary.
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}\n", self.title);
        let _ = writeln!(out, "- Mode: {}", self.mode);
        let _ = writeln!(out, "- Timestamp: {}", self.timestamp);
        let _ = writeln!(out, "- Total: {}", self.summary.total);
        let _ = writeln!(out, "- Passed: {}", self.summary.passed);
        let _ = writeln!(out, "- Failed: {}\n", self.summary.failed);

        out.push_str("| Case | Mode | Reference | Status |\n");
        out.push_str("|------|------|-----------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                r.case_name, r.mode, r.reference, status
            );
        }

        let mut failures = self.summary.failures().peekable();
        if failures.peek().is_some() {
            out.push_str("\n## Failures\n");
            for r in failures {
                let _ = writeln!(out, "\n### {} ({})\n", r.case_name, r.mode);
                out.push_str("```diff\n");
                out.push_str(r.diff.as_deref().unwrap_or(""));
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str("```\n");
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::VerificationResult;

    fn report(passed: bool) -> ConformanceReport {
        let result = VerificationResult {
            case_name: "percent_literal".into(),
            reference: "C11 7.21.6.1p8".into(),
            mode: "strict".into(),
            passed,
            expected: "100%".into(),
            actual: if passed { "100%".into() } else { "100".into() },
            diff: (!passed).then(|| crate::diff::render_diff("100%", "100")),
        };
        ConformanceReport {
            title: "stdio conformance".into(),
            mode: "strict".into(),
            timestamp: "2026-10-19T00:00:00.000Z".into(),
            summary: VerificationSummary::from_results(vec![result]),
        }
    }

    #[test]
    fn markdown_lists_cases() {
        let md = report(true).to_markdown();
        assert!(md.starts_with("# stdio conformance\n"));
        assert!(md.contains("| percent_literal | strict | C11 7.21.6.1p8 | PASS |"));
        assert!(!md.contains("## Failures"));
    }

    #[test]
    fn markdown_includes_failure_diffs() {
        let md = report(false).to_markdown();
        assert!(md.contains("FAIL"));
        assert!(md.contains("## Failures"));
        assert!(md.contains("-100%"));
    }

    #[test]
    fn json_parses_back() {
        let json = report(true).to_json();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["summary"]["passed"], 1);
    }
}
