//! Error types for the resolution core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no flavor dimensions in specification {0:?}")]
    NoDimensions(String),

    #[error("dimension {index} has no label entries")]
    EmptyDimension { index: usize },

    #[error("dimension {index} mixes verbatim labels and wildcard patterns: {existing:?} vs {entry:?}")]
    MixedMatchers {
        index: usize,
        existing: String,
        entry: String,
    },

    #[error("dimension {index} accepts only one wildcard pattern: {existing:?} vs {entry:?}")]
    DuplicateWildcard {
        index: usize,
        existing: String,
        entry: String,
    },

    #[error("invalid variant pattern specification {spec:?}, expected \"variable=pattern[;separator]\"")]
    MalformedPatternSpec { spec: String },

    #[error("variant pattern specification {spec:?} does not include a variable name")]
    MissingVariable { spec: String },

    #[error("variant pattern {spec:?} does not include a #<n> placeholder")]
    MissingPlaceholder { spec: String },

    #[error("missing default flavor for dimension {index}")]
    MissingDefault { index: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
