//! Warning extraction from the target's stderr.
//!
//! The target has no structured diagnostics channel, so warnings are picked
//! out of stderr with a deliberately loose heuristic: any line containing
//! `": "` is a warning, and its identifier is everything before the first
//! colon. Incidental colon-bearing lines are misclassified. Keep the rule in
//! this one function so it can be replaced without touching orchestration.

/// Extracts warning identifiers from `stderr`, in emission order.
///
/// Duplicates are kept. Lines without `": "` (including blank lines) are
/// dropped.
///
/// # Example
///
/// ```
/// use tidy_harness::extract_warnings;
///
/// let warnings = extract_warnings("foo: bar\nbaz\nqux: zap\n");
/// assert_eq!(warnings, vec!["foo", "qux"]);
/// ```
pub fn extract_warnings(stderr: &str) -> Vec<String> {
    stderr
        .lines()
        .filter(|line| line.contains(": "))
        .filter_map(|line| line.split(':').next())
        .map(str::to_string)
        .collect()
}
