use crate::domain::models::owner::Owner;
use crate::domain::models::repository::Repository;
use crate::domain::models::run::{Annotation, Job, WorkflowRun};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitHubApiError {
    /// The API answered, but not with a success status.
    #[error("GitHub API returned status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },
    /// Transport or decoding failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Read-only view of the GitHub REST API used to build the report.
///
/// Paged methods return a single page; an empty page marks the end of the listing.
#[async_trait]
pub trait GitHubApi {
    async fn fetch_repositories(
        &self,
        owner: &Owner,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<Repository>, GitHubApiError>;

    /// Most recent run of `workflow` in `owner/repo`, if the workflow ever ran.
    async fn fetch_latest_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        workflow: &str,
    ) -> Result<Option<WorkflowRun>, GitHubApiError>;

    async fn fetch_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> Result<WorkflowRun, GitHubApiError>;

    async fn fetch_jobs(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<Job>, GitHubApiError>;

    async fn fetch_annotations(
        &self,
        check_run_url: &str,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<Annotation>, GitHubApiError>;
}
