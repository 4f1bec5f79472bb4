//! Flavor dimensions: parsing the dimension specification and classifying
//! labels into selected flavors.
//!
//! A dimension specification looks like `free,!paid|phone,tablet` — groups
//! separated by `|`, one group per dimension, comma-separated label entries
//! inside a group. A leading `!` marks the dimension default and
//! `label=flavor` renames the flavor a label resolves to. An entry
//! containing `*` turns the whole dimension into a wildcard dimension.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::matcher::LabelMatcher;

/// How a matched label resolves to a flavor name.
#[derive(Debug)]
enum FlavorNames {
    /// Verbatim dimensions map the matched label to its flavor name.
    ByLabel(HashMap<String, String>),
    /// Wildcard dimensions resolve capture groups positionally; a group
    /// without a declared name resolves to the captured text itself.
    Positional(Vec<String>),
}

/// One independent axis of build variation.
#[derive(Debug)]
pub struct FlavorDimension {
    index: usize,
    matcher: LabelMatcher,
    names: FlavorNames,
    default_flavor: Option<String>,
    selected: BTreeSet<String>,
}

impl FlavorDimension {
    /// 1-based ordinal of this dimension.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The `#N` token this dimension substitutes in pattern templates.
    pub fn placeholder(&self) -> String {
        format!("#{}", self.index)
    }

    pub fn default_flavor(&self) -> Option<&str> {
        self.default_flavor.as_deref()
    }

    /// Flavors selected by classified labels so far.
    pub fn selected_flavors(&self) -> &BTreeSet<String> {
        &self.selected
    }

    /// Match one label against this dimension, recording any flavors it
    /// resolves to. A match must carry at least one capture group beyond
    /// the whole match; empty captures are ignored.
    fn apply(&mut self, label: &str) {
        let Some(captures) = self.matcher.captures(label) else {
            return;
        };
        if captures.len() < 2 {
            return;
        }
        debug!(label, pattern = self.matcher.pattern(), "label matched dimension");
        for (position, group) in captures.iter().skip(1).enumerate() {
            let Some(group) = group else { continue };
            if group.as_str().is_empty() {
                continue;
            }
            let flavor = match &self.names {
                FlavorNames::ByLabel(names) => names
                    .get(label)
                    .cloned()
                    .unwrap_or_else(|| group.as_str().to_string()),
                FlavorNames::Positional(names) => names
                    .get(position)
                    .cloned()
                    .unwrap_or_else(|| group.as_str().to_string()),
            };
            info!(%flavor, dimension = self.index, "selected flavor");
            self.selected.insert(flavor);
        }
    }
}

/// The ordered, index-addressable collection of flavor dimensions.
#[derive(Debug)]
pub struct DimensionSet {
    dimensions: Vec<FlavorDimension>,
}

impl DimensionSet {
    /// Parse a full dimension specification.
    pub fn parse(spec: &str) -> Result<Self> {
        if spec.trim().is_empty() {
            return Err(Error::NoDimensions(spec.to_string()));
        }
        let dimensions = spec
            .split('|')
            .enumerate()
            .map(|(i, group)| parse_group(i + 1, group))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { dimensions })
    }

    pub fn dimensions(&self) -> &[FlavorDimension] {
        &self.dimensions
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Classify a set of labels, accumulating selected flavors per
    /// dimension. May be called repeatedly; selection only grows.
    pub fn select_from_labels<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for label in labels {
            for dimension in &mut self.dimensions {
                dimension.apply(label.as_ref());
            }
        }
    }

    /// Ensure every dimension carries a default flavor. Required before a
    /// defaults-only run, where no label source is available at all.
    pub fn require_defaults(&self) -> Result<()> {
        for dimension in &self.dimensions {
            if dimension.default_flavor.is_none() {
                return Err(Error::MissingDefault {
                    index: dimension.index,
                });
            }
        }
        Ok(())
    }
}

fn parse_group(index: usize, group: &str) -> Result<FlavorDimension> {
    // Matcher state accumulated across the group's entries. A dimension is
    // either wildcard (exactly one pattern) or verbatim (an alternation),
    // with one exception: a verbatim entry marked default may sit alongside
    // a wildcard pattern, contributing only the default flavor.
    let mut wildcard: Option<String> = None;
    let mut verbatim: Vec<String> = Vec::new();
    let mut by_label: HashMap<String, String> = HashMap::new();
    let mut positional: Vec<String> = Vec::new();
    let mut default_flavor: Option<String> = None;

    for entry in group.trim().split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (entry, is_default) = match entry.strip_prefix('!') {
            Some(stripped) => (stripped, true),
            None => (entry, false),
        };
        let (label, flavor) = match entry.split_once('=') {
            Some((label, flavor)) => (label, Some(flavor)),
            None => (entry, None),
        };

        if label.contains('*') {
            if let Some(existing) = &wildcard {
                return Err(Error::DuplicateWildcard {
                    index,
                    existing: existing.clone(),
                    entry: label.to_string(),
                });
            }
            if !verbatim.is_empty() {
                return Err(Error::MixedMatchers {
                    index,
                    existing: verbatim.join(","),
                    entry: label.to_string(),
                });
            }
            wildcard = Some(label.to_string());
            if let Some(flavor) = flavor {
                positional.push(flavor.to_string());
            }
            if is_default {
                default_flavor = Some(flavor.unwrap_or(label).to_string());
            }
        } else {
            let flavor = flavor.unwrap_or(label);
            if let Some(existing) = &wildcard {
                if is_default {
                    // Default-label exception: contributes the default
                    // flavor but never joins the wildcard matcher.
                    default_flavor = Some(flavor.to_string());
                    continue;
                }
                return Err(Error::MixedMatchers {
                    index,
                    existing: existing.clone(),
                    entry: label.to_string(),
                });
            }
            verbatim.push(label.to_string());
            by_label.insert(label.to_string(), flavor.to_string());
            if is_default {
                default_flavor = Some(flavor.to_string());
            }
        }
    }

    let (matcher, names) = match wildcard {
        Some(pattern) => (
            LabelMatcher::wildcard(&pattern),
            FlavorNames::Positional(positional),
        ),
        None => {
            if verbatim.is_empty() {
                return Err(Error::EmptyDimension { index });
            }
            (
                LabelMatcher::alternation(verbatim.iter().map(String::as_str)),
                FlavorNames::ByLabel(by_label),
            )
        }
    };

    Ok(FlavorDimension {
        index,
        matcher,
        names,
        default_flavor,
        selected: BTreeSet::new(),
    })
}
