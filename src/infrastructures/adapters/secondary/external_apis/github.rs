use crate::domain::external_apis::github::{GitHubApi, GitHubApiError};
use crate::domain::models::owner::Owner;
use crate::domain::models::repository::Repository;
use crate::domain::models::run::{Annotation, Job, WorkflowRun};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = "latest-workflow-runs-rust-app";

#[derive(Deserialize, Debug, Clone)]
struct GitHubRepositoryResponse {
    name: String,
    owner: GitHubOwnerResponse,
}

#[derive(Deserialize, Debug, Clone)]
struct GitHubOwnerResponse {
    login: String,
}

#[derive(Deserialize, Debug, Clone)]
struct GitHubWorkflowRunResponse {
    id: u64,
    conclusion: Option<String>, // null until the run completes
    html_url: String,
}

// The runs and jobs endpoints wrap their arrays in an object next to `total_count`.
#[derive(Deserialize, Debug)]
struct GitHubWorkflowRunsApiResponse {
    workflow_runs: Vec<GitHubWorkflowRunResponse>,
}

#[derive(Deserialize, Debug)]
struct GitHubJobsApiResponse {
    jobs: Vec<GitHubJobResponse>,
}

#[derive(Deserialize, Debug, Clone)]
struct GitHubJobResponse {
    id: u64,
    name: String,
    conclusion: Option<String>,
    check_run_url: String,
}

#[derive(Deserialize, Debug, Clone)]
struct GitHubAnnotationResponse {
    message: Option<String>,
}

impl From<GitHubWorkflowRunResponse> for WorkflowRun {
    fn from(run_res: GitHubWorkflowRunResponse) -> Self {
        WorkflowRun {
            id: run_res.id,
            conclusion: run_res.conclusion,
            html_url: run_res.html_url,
        }
    }
}

impl From<GitHubJobResponse> for Job {
    fn from(job_res: GitHubJobResponse) -> Self {
        Job {
            id: job_res.id,
            name: job_res.name,
            conclusion: job_res.conclusion,
            check_run_url: job_res.check_run_url,
        }
    }
}

fn repositories_url(base_url: &str, owner: &Owner, page: u32, per_page: u8) -> String {
    format!(
        "{}/{}?per_page={}&page={}",
        base_url,
        owner.repositories_path(),
        per_page,
        page
    )
}

fn latest_workflow_run_url(base_url: &str, owner: &str, repo: &str, workflow: &str) -> String {
    format!("{base_url}/repos/{owner}/{repo}/actions/workflows/{workflow}/runs?page=1&per_page=1")
}

fn workflow_run_url(base_url: &str, owner: &str, repo: &str, run_id: u64) -> String {
    format!("{base_url}/repos/{owner}/{repo}/actions/runs/{run_id}")
}

fn jobs_url(base_url: &str, owner: &str, repo: &str, run_id: u64, page: u32, per_page: u8) -> String {
    format!(
        "{}/jobs?per_page={}&page={}",
        workflow_run_url(base_url, owner, repo, run_id),
        per_page,
        page
    )
}

fn annotations_url(check_run_url: &str, page: u32, per_page: u8) -> String {
    format!("{check_run_url}/annotations?per_page={per_page}&page={page}")
}

pub struct GitHubApiAdapter {
    client: Client,
    base_url: String,
    github_token: String,
}

impl GitHubApiAdapter {
    pub fn new(base_url: String, github_token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            github_token,
        }
    }

    /// Single authenticated GET. Any non-success status is returned as
    /// `GitHubApiError::UnexpectedStatus`; nothing is retried.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GitHubApiError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.github_token))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))?;
        tracing::debug!("Response for {} ({}): {}", url, status, body);

        if !status.is_success() {
            return Err(GitHubApiError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let parsed: T = serde_json::from_str(&body)
            .with_context(|| format!("Failed to deserialize response from {url}"))?;
        Ok(parsed)
    }
}

#[async_trait]
impl GitHubApi for GitHubApiAdapter {
    #[tracing::instrument(name = "GitHubApiAdapter::fetch_repositories", skip(self))]
    async fn fetch_repositories(
        &self,
        owner: &Owner,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<Repository>, GitHubApiError> {
        let url = repositories_url(&self.base_url, owner, page, per_page);
        let response_items: Vec<GitHubRepositoryResponse> = self.get_json(&url).await?;

        let repositories = response_items
            .into_iter()
            .map(|repo_res| Repository {
                name: repo_res.name,
                owner: repo_res.owner.login,
            })
            .collect();

        Ok(repositories)
    }

    #[tracing::instrument(name = "GitHubApiAdapter::fetch_latest_workflow_run", skip(self))]
    async fn fetch_latest_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        workflow: &str,
    ) -> Result<Option<WorkflowRun>, GitHubApiError> {
        let url = latest_workflow_run_url(&self.base_url, owner, repo, workflow);
        let api_response: GitHubWorkflowRunsApiResponse = self.get_json(&url).await?;

        Ok(api_response
            .workflow_runs
            .into_iter()
            .next()
            .map(WorkflowRun::from))
    }

    #[tracing::instrument(name = "GitHubApiAdapter::fetch_workflow_run", skip(self))]
    async fn fetch_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> Result<WorkflowRun, GitHubApiError> {
        let url = workflow_run_url(&self.base_url, owner, repo, run_id);
        let run_res: GitHubWorkflowRunResponse = self.get_json(&url).await?;

        Ok(run_res.into())
    }

    #[tracing::instrument(name = "GitHubApiAdapter::fetch_jobs", skip(self))]
    async fn fetch_jobs(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<Job>, GitHubApiError> {
        let url = jobs_url(&self.base_url, owner, repo, run_id, page, per_page);
        let api_response: GitHubJobsApiResponse = self.get_json(&url).await?;

        Ok(api_response.jobs.into_iter().map(Job::from).collect())
    }

    #[tracing::instrument(name = "GitHubApiAdapter::fetch_annotations", skip(self))]
    async fn fetch_annotations(
        &self,
        check_run_url: &str,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<Annotation>, GitHubApiError> {
        let url = annotations_url(check_run_url, page, per_page);
        let response_items: Vec<GitHubAnnotationResponse> = self.get_json(&url).await?;

        Ok(response_items
            .into_iter()
            .map(|annotation_res| Annotation {
                message: annotation_res.message.unwrap_or_default(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_URL: &str = "https://api.github.com";

    #[test]
    fn test_repositories_url_for_org_and_user() {
        assert_eq!(
            repositories_url(BASE_URL, &Owner::Organization("acme".to_string()), 2, 100),
            "https://api.github.com/orgs/acme/repos?per_page=100&page=2"
        );
        assert_eq!(
            repositories_url(BASE_URL, &Owner::User("octocat".to_string()), 1, 100),
            "https://api.github.com/users/octocat/repos?per_page=100&page=1"
        );
    }

    #[test]
    fn test_latest_workflow_run_url_requests_a_single_run() {
        assert_eq!(
            latest_workflow_run_url(BASE_URL, "acme", "api", "code-ql.yml"),
            "https://api.github.com/repos/acme/api/actions/workflows/code-ql.yml/runs?page=1&per_page=1"
        );
    }

    #[test]
    fn test_run_jobs_and_annotations_urls() {
        assert_eq!(
            workflow_run_url(BASE_URL, "acme", "api", 42),
            "https://api.github.com/repos/acme/api/actions/runs/42"
        );
        assert_eq!(
            jobs_url(BASE_URL, "acme", "api", 42, 1, 100),
            "https://api.github.com/repos/acme/api/actions/runs/42/jobs?per_page=100&page=1"
        );
        assert_eq!(
            annotations_url("https://api.github.com/repos/acme/api/check-runs/7", 3, 100),
            "https://api.github.com/repos/acme/api/check-runs/7/annotations?per_page=100&page=3"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let adapter = GitHubApiAdapter::new(
            "https://github.example.com/api/v3/".to_string(),
            "token".to_string(),
        );
        assert_eq!(adapter.base_url, "https://github.example.com/api/v3");
    }

    #[test]
    fn test_deserializes_workflow_runs_response() -> Result<(), serde_json::Error> {
        let body = r#"{
            "total_count": 12,
            "workflow_runs": [
                {
                    "id": 30433642,
                    "name": "CodeQL",
                    "status": "completed",
                    "conclusion": "failure",
                    "html_url": "https://github.com/acme/api/actions/runs/30433642"
                }
            ]
        }"#;

        let response: GitHubWorkflowRunsApiResponse = serde_json::from_str(body)?;
        let runs: Vec<WorkflowRun> = response
            .workflow_runs
            .into_iter()
            .map(WorkflowRun::from)
            .collect();

        assert_eq!(
            runs,
            vec![WorkflowRun {
                id: 30_433_642,
                conclusion: Some("failure".to_string()),
                html_url: "https://github.com/acme/api/actions/runs/30433642".to_string(),
            }]
        );
        Ok(())
    }

    #[test]
    fn test_deserializes_in_progress_run_without_conclusion() -> Result<(), serde_json::Error> {
        let body = r#"{"id": 5, "status": "in_progress", "conclusion": null, "html_url": "https://github.com/acme/api/actions/runs/5"}"#;

        let run: WorkflowRun = serde_json::from_str::<GitHubWorkflowRunResponse>(body)?.into();

        assert_eq!(run.conclusion, None);
        Ok(())
    }

    #[test]
    fn test_deserializes_jobs_response() -> Result<(), serde_json::Error> {
        let body = r#"{
            "total_count": 1,
            "jobs": [
                {
                    "id": 399444496,
                    "run_id": 29679449,
                    "name": "analyze",
                    "status": "completed",
                    "conclusion": "failure",
                    "check_run_url": "https://api.github.com/repos/acme/api/check-runs/399444496"
                }
            ]
        }"#;

        let response: GitHubJobsApiResponse = serde_json::from_str(body)?;
        let jobs: Vec<Job> = response.jobs.into_iter().map(Job::from).collect();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "analyze");
        assert_eq!(
            jobs[0].check_run_url,
            "https://api.github.com/repos/acme/api/check-runs/399444496"
        );
        assert!(!jobs[0].succeeded());
        Ok(())
    }

    #[test]
    fn test_deserializes_annotations_response() -> Result<(), serde_json::Error> {
        let body = r#"[
            {"path": ".github", "annotation_level": "failure", "message": "Process completed with exit code 1."},
            {"path": ".github", "annotation_level": "warning", "message": null}
        ]"#;

        let annotations: Vec<GitHubAnnotationResponse> = serde_json::from_str(body)?;

        assert_eq!(
            annotations[0].message.as_deref(),
            Some("Process completed with exit code 1.")
        );
        assert_eq!(annotations[1].message, None);
        Ok(())
    }
}
