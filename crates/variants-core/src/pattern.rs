//! Variant pattern specifications and flavor cross-product expansion.
//!
//! A pattern specification looks like `GRADLE_TASK = assemble#1#2;, ` —
//! a variable name, a template with `#N` placeholders referring to flavor
//! dimensions, and an optional join separator after `;` (one space when
//! omitted or empty).

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::dimension::DimensionSet;
use crate::error::{Error, Result};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\d").unwrap());

/// A single `variable = template[;separator]` specification.
#[derive(Debug, Clone)]
pub struct PatternSpec {
    variable: String,
    template: String,
    separator: String,
}

impl PatternSpec {
    /// Parse a pipe-separated list of pattern specifications. Each template
    /// must contain at least one placeholder; this is validated here, before
    /// any labels are fetched.
    pub fn parse_all(specs: &str) -> Result<Vec<PatternSpec>> {
        specs.split('|').map(PatternSpec::parse).collect()
    }

    fn parse(spec: &str) -> Result<PatternSpec> {
        let (variable, rest) = spec
            .split_once('=')
            .ok_or_else(|| Error::MalformedPatternSpec {
                spec: spec.to_string(),
            })?;
        let variable = variable.trim();
        if variable.is_empty() {
            return Err(Error::MissingVariable {
                spec: spec.to_string(),
            });
        }
        let rest = rest.trim();
        let (template, separator) = match rest.find(';') {
            Some(pos) if pos > 0 => {
                let separator = &rest[pos + 1..];
                let separator = if separator.is_empty() { " " } else { separator };
                (rest[..pos].trim(), separator)
            }
            _ => (rest, " "),
        };
        if !PLACEHOLDER.is_match(template) {
            return Err(Error::MissingPlaceholder {
                spec: spec.to_string(),
            });
        }
        Ok(PatternSpec {
            variable: variable.to_string(),
            template: template.to_string(),
            separator: separator.to_string(),
        })
    }

    /// Name of the environment variable this specification exports.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Expand the template over every selected flavor of every dimension
    /// and join the resulting variants with the separator.
    ///
    /// Dimensions are processed in ascending index order. A dimension with
    /// no selected flavors falls back to its default; candidates are kept
    /// in a set, so the result is duplicate-free and lexicographically
    /// ordered regardless of selection order.
    pub fn expand(&self, dimensions: &DimensionSet) -> Result<String> {
        let mut candidates = BTreeSet::from([self.template.clone()]);
        for dimension in dimensions.dimensions() {
            let placeholder = dimension.placeholder();
            let flavors = match dimension.selected_flavors() {
                selected if selected.is_empty() => {
                    let default = dimension
                        .default_flavor()
                        .ok_or(Error::MissingDefault {
                            index: dimension.index(),
                        })?;
                    info!(
                        dimension = dimension.index(),
                        default_flavor = default,
                        "no label matched dimension, falling back to default"
                    );
                    BTreeSet::from([default.to_string()])
                }
                selected => selected.clone(),
            };
            let mut next = BTreeSet::new();
            for flavor in &flavors {
                for candidate in &candidates {
                    next.insert(substitute(candidate, &placeholder, flavor));
                }
            }
            candidates = next;
        }
        Ok(candidates
            .into_iter()
            .collect::<Vec<_>>()
            .join(&self.separator))
    }
}

/// Replace a leading placeholder occurrence with the flavor verbatim and
/// every other occurrence with the flavor capitalized.
fn substitute(candidate: &str, placeholder: &str, flavor: &str) -> String {
    let (prefix, rest) = match candidate.strip_prefix(placeholder) {
        Some(rest) => (flavor, rest),
        None => ("", candidate),
    };
    format!("{prefix}{}", rest.replace(placeholder, &capitalize(flavor)))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expanded(pattern: &str, dimension_spec: &str, labels: &[&str]) -> String {
        let mut dimensions = DimensionSet::parse(dimension_spec).unwrap();
        dimensions.select_from_labels(labels.iter().copied());
        let specs = PatternSpec::parse_all(pattern).unwrap();
        specs[0].expand(&dimensions).unwrap()
    }

    #[test]
    fn test_parse_variable_and_template() {
        let specs = PatternSpec::parse_all("FLAVOR = #1-#2").unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].variable(), "FLAVOR");
        assert_eq!(specs[0].template(), "#1-#2");
        assert_eq!(specs[0].separator(), " ");
    }

    #[test]
    fn test_parse_multiple_specs() {
        let specs = PatternSpec::parse_all("A=#1|B=task#2;,").unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[1].variable(), "B");
        assert_eq!(specs[1].separator(), ",");
    }

    #[test]
    fn test_parse_keeps_separator_verbatim() {
        let specs = PatternSpec::parse_all("A = #1; -").unwrap();
        assert_eq!(specs[0].separator(), " -");
    }

    #[test]
    fn test_parse_empty_separator_falls_back_to_space() {
        let specs = PatternSpec::parse_all("A=#1;").unwrap();
        assert_eq!(specs[0].separator(), " ");
    }

    #[test]
    fn test_parse_rejects_missing_placeholder() {
        assert!(matches!(
            PatternSpec::parse_all("A=no-placeholders"),
            Err(Error::MissingPlaceholder { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_placeholder_only_in_separator() {
        assert!(matches!(
            PatternSpec::parse_all("A=plain;#1"),
            Err(Error::MissingPlaceholder { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_missing_variable() {
        assert!(matches!(
            PatternSpec::parse_all(" =#1"),
            Err(Error::MissingVariable { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_missing_equals() {
        assert!(matches!(
            PatternSpec::parse_all("just-a-template#1"),
            Err(Error::MalformedPatternSpec { .. })
        ));
    }

    #[test]
    fn test_expand_cross_product() {
        // An interior placeholder is capitalized, a leading one is not.
        let result = expanded(
            "APP = app-#1-#2",
            "ios,android|debug,release",
            &["ios", "debug", "release"],
        );
        assert_eq!(result, "app-Ios-Debug app-Ios-Release");
    }

    #[test]
    fn test_expand_leading_placeholder_cross_product() {
        let result = expanded(
            "APP = #1-#2",
            "ios,android|debug,release",
            &["ios", "debug", "release"],
        );
        assert_eq!(result, "ios-Debug ios-Release");
    }

    #[test]
    fn test_expand_leading_placeholder_keeps_case() {
        let result = expanded("TASK = #1Assemble#2", "ios|debug", &["ios", "debug"]);
        assert_eq!(result, "iosAssembleDebug");
    }

    #[test]
    fn test_expand_capitalizes_interior_placeholders() {
        let result = expanded("T = pre#1-#1", "ios", &["ios"]);
        assert_eq!(result, "preIos-Ios");
    }

    #[test]
    fn test_expand_falls_back_to_default() {
        let result = expanded("T = #1", "a,b,!c", &[]);
        assert_eq!(result, "c");
    }

    #[test]
    fn test_expand_missing_default_is_an_error() {
        let dimensions = DimensionSet::parse("a,b").unwrap();
        let specs = PatternSpec::parse_all("T=#1").unwrap();
        assert!(matches!(
            specs[0].expand(&dimensions),
            Err(Error::MissingDefault { index: 1 })
        ));
    }

    #[test]
    fn test_expand_custom_separator() {
        let result = expanded("T = task#1;,", "debug,release", &["debug", "release"]);
        assert_eq!(result, "taskDebug,taskRelease");
    }

    #[test]
    fn test_expand_collapses_duplicates() {
        // Both labels rename to the same flavor, so one variant remains.
        let result = expanded("T = #1", "x=same,y=same", &["x", "y"]);
        assert_eq!(result, "same");
    }
}
