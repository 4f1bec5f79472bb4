//! SCM client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScmError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type ScmResult<T> = std::result::Result<T, ScmError>;
