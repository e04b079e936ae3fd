//! Diff rendering for fixture comparison.

use std::fmt::Write;

/// Render a line diff between expected and actual output.
///
/// Lines are shown with escapes so a missing or doubled terminator is
/// visible.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return String::from("[identical]");
    }

    let expected_lines: Vec<&str> = expected.split_inclusive('\n').collect();
    let actual_lines: Vec<&str> = actual.split_inclusive('\n').collect();
    let mut out = String::from("--- expected\n+++ actual\n");
    for i in 0..expected_lines.len().max(actual_lines.len()) {
        let e = expected_lines.get(i);
        let a = actual_lines.get(i);
        if e == a {
            continue;
        }
        let _ = writeln!(out, "@@ line {} @@", i + 1);
        if let Some(e) = e {
            let _ = writeln!(out, "-{}", e.escape_debug());
        }
        if let Some(a) = a {
            let _ = writeln!(out, "+{}", a.escape_debug());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_output() {
        assert_eq!(render_diff("x\n", "x\n"), "[identical]");
    }

    #[test]
    fn changed_line_is_reported() {
        let diff = render_diff("a\nb\n", "a\nc\n");
        assert!(diff.contains("@@ line 2 @@"));
        assert!(diff.contains("-b\\n"));
        assert!(diff.contains("+c\\n"));
        assert!(!diff.contains("line 1"));
    }

    #[test]
    fn missing_terminator_is_visible() {
        let diff = render_diff("done\n", "done");
        assert!(diff.contains("-done\\n"));
        assert!(diff.contains("+done\n"));
    }

    #[test]
    fn extra_lines_are_reported() {
        let diff = render_diff("a\n", "a\nb\n");
        assert!(diff.contains("@@ line 2 @@"));
        assert!(diff.contains("+b\\n"));
    }
}
