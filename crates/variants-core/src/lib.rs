//! Core label→flavor→pattern resolution engine.
//!
//! This crate contains:
//! - The flavor-dimension specification parser and label classifier
//! - The variant pattern expander
//! - The direct label-to-env mapper
//! - The shared label matcher all of them are built on
//!
//! Everything here is synchronous and in-memory; fetching labels and
//! exporting environment variables belong to the collaborator crates.

pub mod dimension;
pub mod error;
pub mod label2env;
pub mod matcher;
pub mod pattern;

pub use dimension::{DimensionSet, FlavorDimension};
pub use error::{Error, Result};
pub use label2env::{Label2EnvSpec, labels_to_env};
pub use matcher::LabelMatcher;
pub use pattern::PatternSpec;

/// Labels attached to a pull/merge request or commit. Ordered so that every
/// downstream aggregation is deterministic.
pub type LabelSet = std::collections::BTreeSet<String>;
