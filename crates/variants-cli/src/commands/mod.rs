//! CLI command implementations.

pub mod resolve;

use anyhow::Result;
use variants_core::{DimensionSet, Label2EnvSpec, PatternSpec};

use crate::SpecArgs;

pub struct ParsedSpecs {
    pub dimensions: DimensionSet,
    pub patterns: Vec<PatternSpec>,
    pub label_rules: Vec<Label2EnvSpec>,
}

/// Parse all three specification strings. Runs before any label fetch, so
/// configuration mistakes fail without touching the network.
pub fn parse_specs(specs: &SpecArgs) -> Result<ParsedSpecs> {
    let dimensions = DimensionSet::parse(&specs.variant_labels)?;
    let patterns = PatternSpec::parse_all(&specs.variant_patterns)?;
    let label_rules = Label2EnvSpec::parse_all(specs.labels2env.as_deref().unwrap_or_default());
    Ok(ParsedSpecs {
        dimensions,
        patterns,
        label_rules,
    })
}

pub fn validate(specs: &SpecArgs) -> Result<()> {
    let parsed = parse_specs(specs)?;
    println!(
        "Configuration is valid: {} dimensions, {} patterns, {} label rules",
        parsed.dimensions.len(),
        parsed.patterns.len(),
        parsed.label_rules.len()
    );
    Ok(())
}
