//! GitLab label queries.
//!
//! GitLab resolves commits through the project's recently merged merge
//! requests; when none matches and a project id is configured, labels can
//! also come from `[labels: ...]` blocks in the commit message itself.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;
use variants_core::LabelSet;

use crate::error::{ScmError, ScmResult};
use crate::{LabelContext, LabelSource, MergeRequestDescription, graphql};

/// Base URL for gitlab.com; self-hosted installs override it.
pub const DEFAULT_BASE_URL: &str = "https://gitlab.com";

static LABEL_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[labels:([^\]]*)\]").unwrap());
static LABEL_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\s]+").unwrap());

/// GitLab GraphQL client resolving merge-request labels.
#[derive(Debug, Clone)]
pub struct GitlabClient {
    client: Client,
    base_url: Url,
    token: String,
    project_path: String,
    project_id: Option<String>,
}

impl GitlabClient {
    pub fn new(token: impl Into<String>, project_path: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default endpoint is a valid url"),
            token: token.into(),
            project_path: project_path.into(),
            project_id: None,
        }
    }

    /// Point the client at a self-hosted GitLab install.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Numeric project id, required only for reading labels out of commit
    /// messages via the REST API.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    fn graphql_url(&self) -> ScmResult<Url> {
        self.base_url
            .join("/api/graphql")
            .map_err(|e| ScmError::Request(e.to_string()))
    }

    async fn merged_request_for_commit(&self, sha: &str) -> ScmResult<Option<MergeRequestNode>> {
        let query = format!(
            r#"query {{ project(fullPath: "{}") {{ mergeRequests(first: 50, state: merged) {{ edges {{ node {{ title, titleHtml, description, descriptionHtml, mergeCommitSha, labels {{ edges {{ node {{ title }} }} }} }} }} }} }} }}"#,
            self.project_path
        );
        let response: MergedRequestsResponse =
            graphql::post_query(&self.client, &self.graphql_url()?, &self.token, query).await?;

        let edges = response
            .data
            .and_then(|data| data.project)
            .map(|project| project.merge_requests.edges)
            .unwrap_or_default();
        Ok(edges
            .into_iter()
            .map(|edge| edge.node)
            .find(|node| node.merge_commit_sha.as_deref() == Some(sha)))
    }

    async fn commit_details(&self, project_id: &str, sha: &str) -> ScmResult<CommitDetails> {
        let endpoint = self
            .base_url
            .join(&format!(
                "/api/v4/projects/{}/repository/commits/{}",
                project_id, sha
            ))
            .map_err(|e| ScmError::Request(e.to_string()))?;
        graphql::get_json(&self.client, endpoint, &self.token).await
    }
}

#[async_trait]
impl LabelSource for GitlabClient {
    async fn context_for_pr(&self, number: u64) -> ScmResult<Option<LabelContext>> {
        let query = format!(
            r#"query {{ project(fullPath: "{}") {{ mergeRequest(iid: "{}") {{ title, titleHtml, description, descriptionHtml, mergeCommitSha, labels {{ edges {{ node {{ title }} }} }} }} }} }}"#,
            self.project_path, number
        );
        let response: MergeRequestResponse =
            graphql::post_query(&self.client, &self.graphql_url()?, &self.token, query).await?;

        let Some(merge_request) = response
            .data
            .and_then(|data| data.project)
            .and_then(|project| project.merge_request)
        else {
            return Ok(None);
        };
        Ok(Some(context_from(merge_request)))
    }

    async fn context_for_commit(&self, sha: &str) -> ScmResult<Option<LabelContext>> {
        if let Some(merge_request) = self.merged_request_for_commit(sha).await? {
            return Ok(Some(context_from(merge_request)));
        }

        let Some(project_id) = &self.project_id else {
            warn!(
                "no merge request found for commit; configure the project id to read labels \
                 from the commit message"
            );
            return Ok(None);
        };
        warn!("no merge request found for commit, checking the commit message");
        let commit = self.commit_details(project_id, sha).await?;
        let labels = labels_from_message(&commit.message);
        if labels.is_empty() {
            debug!("no labels found in commit message");
            return Ok(None);
        }
        Ok(Some(LabelContext {
            labels,
            description: None,
        }))
    }
}

fn context_from(node: MergeRequestNode) -> LabelContext {
    LabelContext {
        labels: node
            .labels
            .edges
            .into_iter()
            .map(|edge| edge.node.title)
            .collect(),
        description: Some(MergeRequestDescription {
            title: node.title.unwrap_or_default(),
            title_html: node.title_html.unwrap_or_default(),
            description: node.description.unwrap_or_default(),
            description_html: node.description_html.unwrap_or_default(),
        }),
    }
}

/// Extract labels from `[labels: a, b c]` blocks in a commit message.
fn labels_from_message(message: &str) -> LabelSet {
    let mut labels = LabelSet::new();
    for block in LABEL_BLOCK.captures_iter(message) {
        for label in LABEL_SEPARATORS.split(&block[1]) {
            if !label.is_empty() {
                labels.insert(label.to_string());
            }
        }
    }
    labels
}

#[derive(Debug, Deserialize)]
struct MergeRequestResponse {
    data: Option<MergeRequestData>,
}

#[derive(Debug, Deserialize)]
struct MergeRequestData {
    project: Option<MergeRequestProject>,
}

#[derive(Debug, Deserialize)]
struct MergeRequestProject {
    #[serde(rename = "mergeRequest")]
    merge_request: Option<MergeRequestNode>,
}

#[derive(Debug, Deserialize)]
struct MergedRequestsResponse {
    data: Option<MergedRequestsData>,
}

#[derive(Debug, Deserialize)]
struct MergedRequestsData {
    project: Option<MergedRequestsProject>,
}

#[derive(Debug, Deserialize)]
struct MergedRequestsProject {
    #[serde(rename = "mergeRequests", default)]
    merge_requests: MergeRequestConnection,
}

#[derive(Debug, Default, Deserialize)]
struct MergeRequestConnection {
    #[serde(default)]
    edges: Vec<MergeRequestEdge>,
}

#[derive(Debug, Deserialize)]
struct MergeRequestEdge {
    node: MergeRequestNode,
}

#[derive(Debug, Deserialize)]
struct MergeRequestNode {
    title: Option<String>,
    #[serde(rename = "titleHtml")]
    title_html: Option<String>,
    description: Option<String>,
    #[serde(rename = "descriptionHtml")]
    description_html: Option<String>,
    #[serde(rename = "mergeCommitSha")]
    merge_commit_sha: Option<String>,
    #[serde(default)]
    labels: LabelConnection,
}

#[derive(Debug, Default, Deserialize)]
struct LabelConnection {
    #[serde(default)]
    edges: Vec<LabelEdge>,
}

#[derive(Debug, Deserialize)]
struct LabelEdge {
    node: LabelNode,
}

#[derive(Debug, Deserialize)]
struct LabelNode {
    title: String,
}

#[derive(Debug, Deserialize)]
struct CommitDetails {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_merge_request_response() {
        let json = r#"{
            "data": {
                "project": {
                    "mergeRequest": {
                        "title": "Add dark mode",
                        "titleHtml": "<p>Add dark mode</p>",
                        "description": "Implements the theme switch.",
                        "descriptionHtml": "<p>Implements the theme switch.</p>",
                        "mergeCommitSha": null,
                        "labels": { "edges": [ { "node": { "title": "dist_beta" } } ] }
                    }
                }
            }
        }"#;
        let response: MergeRequestResponse = serde_json::from_str(json).unwrap();
        let node = response
            .data
            .unwrap()
            .project
            .unwrap()
            .merge_request
            .unwrap();
        let context = context_from(node);
        assert!(context.labels.contains("dist_beta"));
        let description = context.description.unwrap();
        assert_eq!(description.title, "Add dark mode");
        assert_eq!(description.description_html, "<p>Implements the theme switch.</p>");
    }

    #[test]
    fn test_decode_missing_merge_request_as_none() {
        let json = r#"{ "data": { "project": { "mergeRequest": null } } }"#;
        let response: MergeRequestResponse = serde_json::from_str(json).unwrap();
        assert!(
            response
                .data
                .unwrap()
                .project
                .unwrap()
                .merge_request
                .is_none()
        );
    }

    #[test]
    fn test_merged_request_scan_matches_commit_sha() {
        let json = r#"{
            "data": {
                "project": {
                    "mergeRequests": {
                        "edges": [
                            { "node": { "title": "one", "mergeCommitSha": "aaa", "labels": { "edges": [] } } },
                            { "node": { "title": "two", "mergeCommitSha": "bbb",
                                        "labels": { "edges": [ { "node": { "title": "beta" } } ] } } }
                        ]
                    }
                }
            }
        }"#;
        let response: MergedRequestsResponse = serde_json::from_str(json).unwrap();
        let node = response
            .data
            .unwrap()
            .project
            .unwrap()
            .merge_requests
            .edges
            .into_iter()
            .map(|edge| edge.node)
            .find(|node| node.merge_commit_sha.as_deref() == Some("bbb"))
            .unwrap();
        assert_eq!(node.title.as_deref(), Some("two"));
        assert!(context_from(node).labels.contains("beta"));
    }

    #[test]
    fn test_labels_from_message() {
        let labels = labels_from_message(
            "Fix login flow\n\n[labels: dist_internal, release]\n[labels:qa_pass]",
        );
        assert!(labels.contains("dist_internal"));
        assert!(labels.contains("release"));
        assert!(labels.contains("qa_pass"));
        assert_eq!(labels.len(), 3);
    }

    #[test]
    fn test_labels_from_message_without_blocks() {
        assert!(labels_from_message("plain message").is_empty());
    }
}
