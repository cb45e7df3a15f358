//! Pattern filtering for polled keys.

use bf_error::{BfError, Result};
use glob::{MatchOptions, Pattern};

/// Matching rules: `*` and `?` stay within one path segment, `**` spans
/// segments, and a leading dot must be matched explicitly.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// A filter for matching object keys against a glob pattern.
///
/// Matches against the full key, so `*.csv` selects top-level CSV files only
/// and `**/*.csv` selects them at any depth.
///
/// # Example
///
/// ```
/// use bf_poller::PatternFilter;
///
/// let filter = PatternFilter::new("*.csv").unwrap();
///
/// assert!(filter.matches("report.csv"));
/// assert!(!filter.matches("archive/report.csv"));
/// assert!(!filter.matches("report.json"));
/// ```
#[derive(Debug, Clone)]
pub struct PatternFilter {
    pattern: String,
    compiled: Pattern,
}

impl PatternFilter {
    /// Create a new pattern filter.
    ///
    /// Returns an error if the pattern is invalid.
    pub fn new(pattern: &str) -> Result<Self> {
        let compiled = Pattern::new(pattern)
            .map_err(|e| BfError::config(format!("Invalid glob pattern '{pattern}': {e}")))?;

        Ok(Self {
            pattern: pattern.to_string(),
            compiled,
        })
    }

    /// Check if a key matches the pattern.
    pub fn matches(&self, key: &str) -> bool {
        self.compiled.matches_with(key, MATCH_OPTIONS)
    }

    /// Get the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_does_not_cross_separator() {
        let filter = PatternFilter::new("*.csv").unwrap();

        assert!(filter.matches("report.csv"));
        assert!(!filter.matches("data/report.csv"));
        assert!(!filter.matches("report.json"));
        assert!(!filter.matches("report.csv.gz"));
    }

    #[test]
    fn test_prefix_pattern() {
        let filter = PatternFilter::new("incoming/*.json").unwrap();

        assert!(filter.matches("incoming/a.json"));
        assert!(!filter.matches("incoming/nested/a.json"));
        assert!(!filter.matches("outgoing/a.json"));
    }

    #[test]
    fn test_double_star_spans_segments() {
        let filter = PatternFilter::new("**/*.csv").unwrap();

        assert!(filter.matches("a/report.csv"));
        assert!(filter.matches("a/b/c/report.csv"));
        assert!(!filter.matches("a/b/report.txt"));
    }

    #[test]
    fn test_leading_dot_must_be_literal() {
        let filter = PatternFilter::new("*.csv").unwrap();
        assert!(!filter.matches(".hidden.csv"));

        let dotted = PatternFilter::new(".*.csv").unwrap();
        assert!(dotted.matches(".hidden.csv"));
    }

    #[test]
    fn test_question_mark_and_brackets() {
        let filter = PatternFilter::new("file[0-9]?.txt").unwrap();

        assert!(filter.matches("file1a.txt"));
        assert!(!filter.matches("fileAa.txt"));
        assert!(!filter.matches("file1.txt"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = PatternFilter::new("[unclosed").unwrap_err();
        assert!(matches!(err, BfError::Config(_)));
    }

    #[test]
    fn test_pattern_getter() {
        let filter = PatternFilter::new("*.csv").unwrap();
        assert_eq!(filter.pattern(), "*.csv");
    }
}
