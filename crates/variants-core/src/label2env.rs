//! Direct label-to-environment-variable mapping.
//!
//! Specifications are comma-separated, each `pattern` or `pattern=value`:
//!
//! - `some_label` exports `some_label=some_label` when that label is set.
//! - `dist_*` exports one variable per match, named and valued after the
//!   text the `*` captured (`dist_internal` gives `internal=internal`).
//! - `dist_*=distribute` exports `distribute` holding a comma-joined list
//!   of every captured value (`dist_internal` and `dist_external` give
//!   `distribute=external,internal`).
//! - `some_label=value` exports `some_label=value` verbatim.

use std::collections::BTreeMap;

use crate::LabelSet;
use crate::matcher::LabelMatcher;

/// A single label-to-env specification.
#[derive(Debug)]
pub struct Label2EnvSpec {
    matcher: LabelMatcher,
    key: Option<String>,
    value: Option<String>,
}

impl Label2EnvSpec {
    /// Parse a comma-separated specification list. Empty entries are
    /// skipped; the syntax itself cannot fail.
    pub fn parse_all(specs: &str) -> Vec<Label2EnvSpec> {
        specs.split(',').filter_map(Label2EnvSpec::parse).collect()
    }

    fn parse(spec: &str) -> Option<Label2EnvSpec> {
        let spec = spec.trim();
        if spec.is_empty() {
            return None;
        }
        let (pattern, rhs) = match spec.split_once('=') {
            Some((pattern, rhs)) => (pattern, Some(rhs.to_string())),
            None => (spec, None),
        };
        let rhs = rhs.filter(|rhs| !rhs.is_empty());
        Some(if pattern.contains('*') {
            // Wildcard: the right-hand side names the output key; values
            // come from the capture.
            Label2EnvSpec {
                matcher: LabelMatcher::wildcard(pattern),
                key: rhs,
                value: None,
            }
        } else {
            // Verbatim: the pattern is the output key; the right-hand side
            // is a fixed value.
            Label2EnvSpec {
                matcher: LabelMatcher::exact(pattern),
                key: Some(pattern.to_string()),
                value: rhs,
            }
        })
    }

    fn apply(&self, label: &str, envvars: &mut BTreeMap<String, String>) {
        let Some(captures) = self.matcher.captures(label) else {
            return;
        };
        let value = match (&self.value, captures.get(1)) {
            (Some(value), _) => value.clone(),
            (None, Some(group)) => group.as_str().to_string(),
            (None, None) => captures.get(0).map_or_else(String::new, |whole| {
                whole.as_str().to_string()
            }),
        };
        let key = self.key.clone().unwrap_or_else(|| value.clone());
        match envvars.get_mut(&key) {
            Some(existing) => {
                existing.push(',');
                existing.push_str(&value);
            }
            None => {
                envvars.insert(key, value);
            }
        }
    }
}

/// Match every label against every specification, aggregating values that
/// resolve to the same key into a comma-joined list. Labels iterate in
/// sorted order, so aggregation order is canonical.
pub fn labels_to_env(specs: &[Label2EnvSpec], labels: &LabelSet) -> BTreeMap<String, String> {
    let mut envvars = BTreeMap::new();
    for spec in specs {
        for label in labels {
            spec.apply(label, &mut envvars);
        }
    }
    envvars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> LabelSet {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn mapped(spec: &str, label_names: &[&str]) -> BTreeMap<String, String> {
        labels_to_env(&Label2EnvSpec::parse_all(spec), &labels(label_names))
    }

    #[test]
    fn test_verbatim_label_exports_itself() {
        let env = mapped("skip_build", &["skip_build", "other"]);
        assert_eq!(env.get("skip_build").map(String::as_str), Some("skip_build"));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_verbatim_label_with_fixed_value() {
        let env = mapped("skip_build=yes", &["skip_build"]);
        assert_eq!(env.get("skip_build").map(String::as_str), Some("yes"));
    }

    #[test]
    fn test_verbatim_requires_full_label() {
        let env = mapped("build", &["skip_build"]);
        assert!(env.is_empty());
    }

    #[test]
    fn test_wildcard_exports_capture_as_key_and_value() {
        let env = mapped("dist_*", &["dist_internal", "dist_external"]);
        assert_eq!(env.get("internal").map(String::as_str), Some("internal"));
        assert_eq!(env.get("external").map(String::as_str), Some("external"));
    }

    #[test]
    fn test_wildcard_with_key_aggregates_matches() {
        let env = mapped("dist_*=distribute", &["dist_internal", "dist_external"]);
        let mut parts: Vec<&str> = env.get("distribute").unwrap().split(',').collect();
        parts.sort_unstable();
        assert_eq!(parts, vec!["external", "internal"]);
    }

    #[test]
    fn test_aggregation_order_is_sorted_by_label() {
        let env = mapped("dist_*=distribute", &["dist_b", "dist_a", "dist_c"]);
        assert_eq!(env.get("distribute").map(String::as_str), Some("a,b,c"));
    }

    #[test]
    fn test_multiple_specs_share_a_key() {
        let env = mapped("dist_*=targets,deploy_*=targets", &["dist_a", "deploy_b"]);
        assert_eq!(env.get("targets").map(String::as_str), Some("a,b"));
    }

    #[test]
    fn test_no_matching_labels_yields_empty_map() {
        let env = mapped("dist_*=distribute", &["unrelated"]);
        assert!(env.is_empty());
    }

    #[test]
    fn test_empty_spec_entries_are_skipped() {
        let specs = Label2EnvSpec::parse_all(" , dist_* ,");
        assert_eq!(specs.len(), 1);
    }
}
