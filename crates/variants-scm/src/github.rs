//! GitHub label queries.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;
use variants_core::LabelSet;

use crate::error::ScmResult;
use crate::{LabelContext, LabelSource, graphql};

/// GraphQL endpoint for github.com.
pub const DEFAULT_API_URL: &str = "https://api.github.com/graphql";

/// GitHub GraphQL client resolving pull-request labels.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    api_url: Url,
    token: String,
    owner: String,
    repo: String,
}

impl GithubClient {
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_url: Url::parse(DEFAULT_API_URL).expect("default endpoint is a valid url"),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Point the client at a GitHub Enterprise GraphQL endpoint.
    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = api_url;
        self
    }
}

#[async_trait]
impl LabelSource for GithubClient {
    async fn context_for_pr(&self, number: u64) -> ScmResult<Option<LabelContext>> {
        let query = format!(
            r#"{{ repository(owner: "{}", name: "{}") {{ pullRequest(number: {}) {{ labels(first: 50) {{ edges {{ node {{ name }} }} }} }} }} }}"#,
            self.owner, self.repo, number
        );
        let response: PrLabelsResponse =
            graphql::post_query(&self.client, &self.api_url, &self.token, query).await?;

        let Some(pull_request) = response
            .data
            .and_then(|data| data.repository)
            .and_then(|repository| repository.pull_request)
        else {
            return Ok(None);
        };
        Ok(Some(LabelContext {
            labels: label_names(pull_request.labels),
            description: None,
        }))
    }

    async fn context_for_commit(&self, sha: &str) -> ScmResult<Option<LabelContext>> {
        let query = format!(
            r#"{{ repository(owner: "{}", name: "{}") {{ object(oid: "{}") {{ ... on Commit {{ associatedPullRequests(last: 1) {{ edges {{ node {{ labels(first: 50) {{ edges {{ node {{ name }} }} }} }} }} }} }} }} }} }}"#,
            self.owner, self.repo, sha
        );
        let response: CommitLabelsResponse =
            graphql::post_query(&self.client, &self.api_url, &self.token, query).await?;

        let Some(pull_request) = response
            .data
            .and_then(|data| data.repository)
            .and_then(|repository| repository.object)
            .and_then(|object| object.associated_pull_requests.edges.into_iter().next())
        else {
            return Ok(None);
        };
        Ok(Some(LabelContext {
            labels: label_names(pull_request.node.labels),
            description: None,
        }))
    }
}

fn label_names(labels: LabelConnection) -> LabelSet {
    labels
        .edges
        .into_iter()
        .map(|edge| edge.node.name)
        .collect()
}

#[derive(Debug, Deserialize)]
struct PrLabelsResponse {
    data: Option<PrLabelsData>,
}

#[derive(Debug, Deserialize)]
struct PrLabelsData {
    repository: Option<PrRepository>,
}

#[derive(Debug, Deserialize)]
struct PrRepository {
    #[serde(rename = "pullRequest")]
    pull_request: Option<PullRequestNode>,
}

#[derive(Debug, Deserialize)]
struct PullRequestNode {
    #[serde(default)]
    labels: LabelConnection,
}

#[derive(Debug, Deserialize)]
struct CommitLabelsResponse {
    data: Option<CommitLabelsData>,
}

#[derive(Debug, Deserialize)]
struct CommitLabelsData {
    repository: Option<CommitRepository>,
}

#[derive(Debug, Deserialize)]
struct CommitRepository {
    object: Option<CommitObject>,
}

#[derive(Debug, Deserialize)]
struct CommitObject {
    #[serde(rename = "associatedPullRequests", default)]
    associated_pull_requests: PullRequestConnection,
}

#[derive(Debug, Default, Deserialize)]
struct PullRequestConnection {
    #[serde(default)]
    edges: Vec<PullRequestEdge>,
}

#[derive(Debug, Deserialize)]
struct PullRequestEdge {
    node: PullRequestNode,
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
    name: String,
}
