use crate::application::use_cases::collect_latest_workflow_runs::{
    CollectLatestWorkflowRunsInteractor, CollectLatestWorkflowRunsUseCase,
    CollectLatestWorkflowRunsUseCaseInput,
};
use crate::domain::models::owner::Owner;
use crate::domain::report::ReportWriter;
use crate::infrastructures::adapters::secondary::external_apis::github::{
    DEFAULT_API_URL, GitHubApiAdapter,
};
use crate::infrastructures::adapters::secondary::report::csv::CsvReportWriter;
use anyhow::{Context, Error, bail};
use clap::{ArgGroup, Parser};
use futures_util::StreamExt;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

/// Environment variable holding the token used for every API call.
pub const GITHUB_TOKEN_ENV: &str = "GH_TOKEN";

#[derive(Parser, Debug)]
#[command(
    name = "latest-workflow-runs",
    about = "Gets the latest workflow runs for the repositories of an organization or user for the given workflow file"
)]
#[command(group(ArgGroup::new("owner").required(true).args(["org", "user"])))]
pub struct Cli {
    /// Organization name
    #[arg(short, long)]
    pub org: Option<String>,

    /// User name
    #[arg(short, long)]
    pub user: Option<String>,

    /// Workflow file name (ex: code-ql.yml)
    #[arg(short, long)]
    pub workflow: String,

    /// Output file name
    #[arg(short = 'f', long, default_value = "output.csv")]
    pub outfile: PathBuf,

    /// Log every request and response body
    #[arg(long)]
    pub verbose: bool,

    /// Stop at the first repository whose run details cannot be fetched
    #[arg(long)]
    pub fail_fast: bool,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GH_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

/// Everything a report run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub owner: Owner,
    pub workflow: String,
    pub outfile: PathBuf,
    pub api_url: String,
    pub github_token: String,
    pub fail_fast: bool,
}

impl ReportConfig {
    pub fn from_cli(cli: Cli, github_token: String) -> Result<Self, Error> {
        let owner = match (cli.org, cli.user) {
            (Some(_), Some(_)) => bail!("--org and --user are mutually exclusive"),
            (Some(org), None) => Owner::Organization(org),
            (None, Some(user)) => Owner::User(user),
            (None, None) => bail!("Either --org or --user must be provided"),
        };

        Ok(Self {
            owner,
            workflow: cli.workflow,
            outfile: cli.outfile,
            api_url: cli.api_url,
            github_token,
            fail_fast: cli.fail_fast,
        })
    }
}

pub fn read_github_token() -> Result<String, Error> {
    let token = env::var(GITHUB_TOKEN_ENV)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", GITHUB_TOKEN_ENV, e))?;
    if token.trim().is_empty() {
        bail!("{GITHUB_TOKEN_ENV} is empty");
    }
    Ok(token)
}

/// Builds the report for `config` and returns the number of rows written.
#[tracing::instrument(
    name = "run",
    skip(config),
    fields(owner = %config.owner, workflow = %config.workflow)
)]
pub async fn run(config: ReportConfig) -> Result<usize, Error> {
    let github_api_adapter = Arc::new(GitHubApiAdapter::new(
        config.api_url.clone(),
        config.github_token.clone(),
    ));
    let use_case = CollectLatestWorkflowRunsInteractor::new(github_api_adapter);
    let mut report = CsvReportWriter::create(&config.outfile)?;

    let input = CollectLatestWorkflowRunsUseCaseInput {
        owner: config.owner,
        workflow: config.workflow,
        fail_fast: config.fail_fast,
    };
    let written = write_report(&use_case, input, &mut report).await?;

    tracing::info!(
        "Wrote {} rows to {}",
        written,
        config.outfile.display()
    );
    Ok(written)
}

/// Drains the use case into `report`, one row at a time.
pub async fn write_report<U, R>(
    use_case: &U,
    input: CollectLatestWorkflowRunsUseCaseInput,
    report: &mut R,
) -> Result<usize, Error>
where
    U: CollectLatestWorkflowRunsUseCase,
    R: ReportWriter,
{
    let stream = use_case.execute(input);
    tokio::pin!(stream);

    let mut written = 0;
    while let Some(row) = stream.next().await {
        let row = row.context("Report aborted")?;
        report.write_row(&row)?;
        written += 1;
    }

    Ok(written)
}
