//! Label matching shared by the flavor-dimension classifier and the
//! label-to-env mapper.

use regex::Regex;
use std::sync::OnceLock;

/// A compiled matcher for label strings.
///
/// Labels are matched one of three ways: a wildcard pattern where each `*`
/// becomes a capture group, a single exact label, or an anchored alternation
/// of exact labels with one capture group per alternative. The regex source
/// is built from escaped input at construction and compiled on first use.
#[derive(Debug)]
pub struct LabelMatcher {
    pattern: String,
    regex: OnceLock<Regex>,
}

impl LabelMatcher {
    /// Matcher from a wildcard pattern such as `dist_*`. Each `*` captures;
    /// literal text is escaped. The search is unanchored.
    pub fn wildcard(spec: &str) -> Self {
        let pattern = spec
            .split('*')
            .map(|literal| regex::escape(literal))
            .collect::<Vec<_>>()
            .join("(.*)");
        Self::from_pattern(pattern)
    }

    /// Matcher for a single exact label.
    pub fn exact(label: &str) -> Self {
        Self::from_pattern(format!("^{}$", regex::escape(label)))
    }

    /// Anchored alternation over verbatim labels, one capture group per
    /// label in declaration order.
    pub fn alternation<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let pattern = labels
            .into_iter()
            .map(|label| format!("(^{}$)", regex::escape(label)))
            .collect::<Vec<_>>()
            .join("|");
        Self::from_pattern(pattern)
    }

    fn from_pattern(pattern: String) -> Self {
        Self {
            pattern,
            regex: OnceLock::new(),
        }
    }

    /// The regex source this matcher compiles to.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn regex(&self) -> &Regex {
        self.regex
            .get_or_init(|| Regex::new(&self.pattern).expect("pattern built from escaped input"))
    }

    /// Match a label, returning the capture groups on success.
    pub fn captures<'t>(&self, label: &'t str) -> Option<regex::Captures<'t>> {
        self.regex().captures(label)
    }

    /// Whether the label matches at all.
    pub fn is_match(&self, label: &str) -> bool {
        self.regex().is_match(label)
    }
}
