use serde::{Deserialize, Serialize};

/// Column order of the report file.
pub const REPORT_HEADER: [&str; 4] = ["repo", "result", "url", "message"];

pub const WORKFLOW_NOT_FOUND_MESSAGE: &str = "Workflow not found";
pub const NO_RUNS_MESSAGE: &str = "No runs found for the workflow";

/// One line of the report, describing the latest run of the workflow in a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub repo: String,
    pub result: String,
    pub url: String,
    pub message: Option<String>,
}

impl ReportRow {
    /// Row for a repository where no run could be inspected.
    pub fn without_run(repo: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            result: String::new(),
            url: String::new(),
            message: Some(message.into()),
        }
    }

    pub fn workflow_not_found(repo: impl Into<String>) -> Self {
        Self::without_run(repo, WORKFLOW_NOT_FOUND_MESSAGE)
    }

    pub fn no_runs(repo: impl Into<String>) -> Self {
        Self::without_run(repo, NO_RUNS_MESSAGE)
    }

    pub fn lookup_failed(repo: impl Into<String>, error: &anyhow::Error) -> Self {
        Self::without_run(repo, format!("Failed to fetch run details: {error:#}"))
    }
}
