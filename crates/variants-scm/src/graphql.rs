//! HTTP plumbing shared by the provider clients.

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ScmError, ScmResult};

pub(crate) const USER_AGENT: &str = "variants-ci";

/// POST a GraphQL query and decode the response body.
pub(crate) async fn post_query<T: DeserializeOwned>(
    client: &Client,
    endpoint: &Url,
    token: &str,
    query: String,
) -> ScmResult<T> {
    let response = client
        .post(endpoint.clone())
        .header("Authorization", format!("Bearer {}", token))
        .header("User-Agent", USER_AGENT)
        .json(&serde_json::json!({ "query": query }))
        .send()
        .await
        .map_err(|e| ScmError::Request(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(ScmError::Api(format!(
            "graphql request returned {}: {}",
            status, text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| ScmError::Parse(e.to_string()))
}

/// GET a REST endpoint and decode the response body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    endpoint: Url,
    token: &str,
) -> ScmResult<T> {
    let response = client
        .get(endpoint)
        .header("Authorization", format!("Bearer {}", token))
        .header("User-Agent", USER_AGENT)
        .send()
        .await
        .map_err(|e| ScmError::Request(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(ScmError::Api(format!(
            "api request returned {}: {}",
            status, text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| ScmError::Parse(e.to_string()))
}
