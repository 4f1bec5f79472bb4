//! Source-control collaborators: fetch the labels attached to a pull/merge
//! request (or the one associated with a commit) so the core can classify
//! them.
//!
//! Two providers are supported, GitHub and GitLab, both speaking GraphQL.
//! The clients only extract label sets and the merge-request description
//! payload; everything else about the provider responses is ignored.

pub mod error;
pub mod github;
pub mod gitlab;
mod graphql;

pub use error::{ScmError, ScmResult};
pub use github::GithubClient;
pub use gitlab::GitlabClient;

use async_trait::async_trait;
use variants_core::LabelSet;

/// Labels and merge-request payload retrieved for one PR/MR or commit.
#[derive(Debug, Default)]
pub struct LabelContext {
    pub labels: LabelSet,
    /// Present when the provider carries a description (GitLab merge
    /// requests); used for the optional description export.
    pub description: Option<MergeRequestDescription>,
}

/// Title and description of a merge request, plain and HTML.
#[derive(Debug, Clone, Default)]
pub struct MergeRequestDescription {
    pub title: String,
    pub title_html: String,
    pub description: String,
    pub description_html: String,
}

/// A provider that resolves the labels driving flavor selection.
///
/// `Ok(None)` means no matching pull/merge request was found — a soft
/// condition; callers log a warning and fall back to dimension defaults.
#[async_trait]
pub trait LabelSource {
    /// Labels for a pull/merge request by number (GitLab: iid).
    async fn context_for_pr(&self, number: u64) -> ScmResult<Option<LabelContext>>;

    /// Labels for a commit, resolved through its associated merged
    /// pull/merge request.
    async fn context_for_commit(&self, sha: &str) -> ScmResult<Option<LabelContext>>;
}
