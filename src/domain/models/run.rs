use serde::{Deserialize, Serialize};

/// Conclusion reported by GitHub for a run or job that finished successfully.
pub const SUCCESS_CONCLUSION: &str = "success";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    /// `None` while the run is still queued or in progress.
    pub conclusion: Option<String>,
    #[serde(rename = "htmlUrl")]
    pub html_url: String,
}

impl WorkflowRun {
    pub fn succeeded(&self) -> bool {
        is_success(self.conclusion.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub name: String,
    pub conclusion: Option<String>,
    #[serde(rename = "checkRunUrl")]
    pub check_run_url: String,
}

impl Job {
    pub fn succeeded(&self) -> bool {
        is_success(self.conclusion.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub message: String,
}

fn is_success(conclusion: Option<&str>) -> bool {
    conclusion == Some(SUCCESS_CONCLUSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(conclusion: Option<&str>) -> WorkflowRun {
        WorkflowRun {
            id: 1,
            conclusion: conclusion.map(str::to_string),
            html_url: "https://github.com/acme/api/actions/runs/1".to_string(),
        }
    }

    #[test]
    fn test_only_literal_success_counts_as_success() {
        assert!(run(Some("success")).succeeded());
        assert!(!run(Some("failure")).succeeded());
        assert!(!run(Some("skipped")).succeeded());
        assert!(!run(Some("Success")).succeeded());
        assert!(!run(None).succeeded());
    }
}
