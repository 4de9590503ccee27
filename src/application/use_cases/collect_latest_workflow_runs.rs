use crate::application::pagination::{PER_PAGE, fetch_all_pages};
use crate::domain::external_apis::github::{GitHubApi, GitHubApiError};
use crate::domain::models::owner::Owner;
use crate::domain::models::report::ReportRow;
use crate::domain::models::repository::Repository;
use anyhow::{Context, Error};
use async_stream::try_stream;
use futures_util::Stream;
use std::sync::Arc;

/// Separator between annotation messages in the report's message column.
const MESSAGE_SEPARATOR: &str = "|";

#[derive(Debug, Clone)]
pub struct CollectLatestWorkflowRunsUseCaseInput {
    pub owner: Owner,
    /// Workflow file name, e.g. `code-ql.yml`.
    pub workflow: String,
    /// Abort on the first repository whose run details cannot be fetched.
    pub fail_fast: bool,
}

pub trait CollectLatestWorkflowRunsUseCase {
    /// Yields one row per repository of the owner, in listing order.
    fn execute(
        &self,
        input: CollectLatestWorkflowRunsUseCaseInput,
    ) -> impl Stream<Item = Result<ReportRow, Error>> + Send;
}

pub struct CollectLatestWorkflowRunsInteractor<G: GitHubApi + Send + Sync + 'static> {
    github_api: Arc<G>,
}

impl<G: GitHubApi + Send + Sync + 'static> CollectLatestWorkflowRunsInteractor<G> {
    pub fn new(github_api: Arc<G>) -> Self {
        Self { github_api }
    }
}

impl<G: GitHubApi + Send + Sync + 'static> CollectLatestWorkflowRunsUseCase
    for CollectLatestWorkflowRunsInteractor<G>
{
    fn execute(
        &self,
        input: CollectLatestWorkflowRunsUseCaseInput,
    ) -> impl Stream<Item = Result<ReportRow, Error>> + Send {
        let github_api = self.github_api.clone();

        try_stream! {
            let api = github_api.as_ref();
            let owner = &input.owner;

            tracing::info!("Fetching repositories of {}...", owner);
            let repositories = fetch_all_pages("repositories", move |page| {
                api.fetch_repositories(owner, page, PER_PAGE)
            })
            .await
            .with_context(|| format!("Failed to list repositories of {owner}"))?;
            tracing::info!("Fetched {} repositories", repositories.len());

            for repo in &repositories {
                tracing::debug!("Processing repo: {}/{}", repo.owner, repo.name);
                let row = match resolve_latest_run(api, repo, &input.workflow).await {
                    Ok(row) => row,
                    Err(e) if input.fail_fast => Err::<ReportRow, Error>(e.context(format!(
                        "Failed to resolve the latest run of {} for {}/{}",
                        input.workflow, repo.owner, repo.name
                    )))?,
                    Err(e) => {
                        tracing::warn!(
                            "Failed to resolve the latest run for {}/{}: {:#}",
                            repo.owner,
                            repo.name,
                            e
                        );
                        ReportRow::lookup_failed(&repo.name, &e)
                    }
                };
                tracing::debug!("{:?}", row);
                yield row;
            }
        }
    }
}

#[tracing::instrument(skip(api, repo), fields(repo = %repo.name))]
async fn resolve_latest_run<G: GitHubApi + Sync + ?Sized>(
    api: &G,
    repo: &Repository,
    workflow: &str,
) -> Result<ReportRow, Error> {
    let latest = match api
        .fetch_latest_workflow_run(&repo.owner, &repo.name, workflow)
        .await
    {
        Ok(latest) => latest,
        Err(GitHubApiError::UnexpectedStatus { status, url }) => {
            tracing::debug!("Workflow lookup answered {} for {}", status, url);
            return Ok(ReportRow::workflow_not_found(&repo.name));
        }
        Err(e) => return Err(e).context("Failed to look up workflow runs"),
    };

    let Some(latest) = latest else {
        return Ok(ReportRow::no_runs(&repo.name));
    };

    let run = api
        .fetch_workflow_run(&repo.owner, &repo.name, latest.id)
        .await
        .with_context(|| format!("Failed to fetch workflow run {}", latest.id))?;

    let message = if run.succeeded() {
        None
    } else {
        Some(collect_failure_messages(api, repo, run.id).await?)
    };

    Ok(ReportRow {
        repo: repo.name.clone(),
        result: run.conclusion.unwrap_or_default(),
        url: run.html_url,
        message,
    })
}

/// Annotation messages of every job of the run that did not succeed, in job order.
async fn collect_failure_messages<G: GitHubApi + Sync + ?Sized>(
    api: &G,
    repo: &Repository,
    run_id: u64,
) -> Result<String, Error> {
    let owner = repo.owner.as_str();
    let name = repo.name.as_str();
    let jobs = fetch_all_pages("jobs", move |page| {
        api.fetch_jobs(owner, name, run_id, page, PER_PAGE)
    })
    .await
    .with_context(|| format!("Failed to fetch jobs of workflow run {run_id}"))?;

    let mut messages = Vec::new();
    for job in jobs.iter().filter(|job| !job.succeeded()) {
        let check_run_url = job.check_run_url.as_str();
        let annotations = fetch_all_pages("annotations", move |page| {
            api.fetch_annotations(check_run_url, page, PER_PAGE)
        })
        .await
        .with_context(|| format!("Failed to fetch annotations of job {}", job.name))?;
        messages.extend(annotations.into_iter().map(|annotation| annotation.message));
    }

    Ok(messages.join(MESSAGE_SEPARATOR))
}
