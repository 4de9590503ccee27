pub mod collect_latest_workflow_runs;
