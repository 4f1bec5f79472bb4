//! The resolve command: fetch labels, classify them, expand patterns and
//! export the results.

use anyhow::{Context, Result};
use tracing::{info, warn};
use variants_core::{LabelSet, labels_to_env};
use variants_scm::{GithubClient, GitlabClient, LabelContext, LabelSource};

use crate::export::Exporter;
use crate::{Provider, ResolveArgs, description};

pub async fn run(args: ResolveArgs) -> Result<()> {
    let mut parsed = super::parse_specs(&args.specs)?;

    let context = if let Some(number) = args.pull_request {
        let source = label_source(&args)?;
        let context = source.context_for_pr(number).await?;
        if context.is_none() {
            warn!("merge request not found, applying defaults");
        }
        context
    } else if let Some(sha) = &args.commit_hash {
        let source = label_source(&args)?;
        let context = source.context_for_commit(sha).await?;
        if context.is_none() {
            warn!("no merge request found for commit, applying defaults");
        }
        context
    } else {
        warn!("neither a commit hash nor a pull request given, building defaults only");
        parsed.dimensions.require_defaults()?;
        None
    };

    let labels = match context {
        Some(LabelContext {
            labels,
            description: payload,
        }) => {
            if let (Some(path), Some(payload)) = (&args.export_description, &payload) {
                description::export(path, payload);
            }
            if labels.is_empty() {
                warn!("no labels found, applying defaults");
            } else {
                let found = labels.iter().cloned().collect::<Vec<_>>().join(", ");
                info!(labels = %found, "found labels");
            }
            labels
        }
        None => LabelSet::new(),
    };

    parsed.dimensions.select_from_labels(&labels);

    let mut exporter = match &args.env_file {
        Some(path) => Exporter::env_file(path)?,
        None => Exporter::envman(),
    };

    for (key, value) in labels_to_env(&parsed.label_rules, &labels) {
        exporter.export(&key, &value)?;
    }
    for pattern in &parsed.patterns {
        let value = pattern.expand(&parsed.dimensions)?;
        exporter.export(pattern.variable(), &value)?;
    }

    Ok(())
}

fn label_source(args: &ResolveArgs) -> Result<Box<dyn LabelSource>> {
    let token = args
        .auth_token
        .as_deref()
        .context("an auth token is required to fetch labels")?;

    match args.provider {
        Provider::Github => {
            let owner = args
                .repo_owner
                .as_deref()
                .context("missing repo owner argument")?;
            let repo = args
                .repo_name
                .as_deref()
                .context("missing repo name argument")?;
            let mut client = GithubClient::new(token, owner, repo);
            if let Some(api_url) = &args.api_url {
                client = client.with_api_url(api_url.clone());
            }
            Ok(Box::new(client))
        }
        Provider::Gitlab => {
            let project_path = args
                .project_path
                .as_deref()
                .context("missing project path argument")?;
            let mut client = GitlabClient::new(token, project_path);
            if let Some(project_id) = &args.project_id {
                client = client.with_project_id(project_id);
            }
            if let Some(api_url) = &args.api_url {
                client = client.with_base_url(api_url.clone());
            }
            Ok(Box::new(client))
        }
    }
}
