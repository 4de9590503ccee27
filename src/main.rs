use anyhow::Context;
use clap::Parser;
use latest_workflow_runs::infrastructures::adapters::primary::cli::{
    Cli, ReportConfig, read_github_token, run,
};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::env;
use tracing::{info, info_span};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Spans are only exported when a collector endpoint is configured.
const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

fn init_tracing(verbose: bool) -> anyhow::Result<Option<SdkTracerProvider>> {
    let provider = if env::var_os(OTLP_ENDPOINT_ENV).is_some() {
        let otlp_exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .build()
            .context("Failed to create OTLP exporter")?;
        Some(
            SdkTracerProvider::builder()
                .with_batch_exporter(otlp_exporter)
                .build(),
        )
    } else {
        None
    };
    let telemetry = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer("latest-workflow-runs"))
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_file(true)
        .with_line_number(true);

    let default_filter = if verbose {
        "latest_workflow_runs=debug,info"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(telemetry)
        .with(fmt_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    Ok(provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let provider = init_tracing(cli.verbose)?;

    let config = {
        let initialize_span = info_span!("initialize");
        let _enter = initialize_span.enter();
        info!("Application starting");

        let github_token = read_github_token()?;
        ReportConfig::from_cli(cli, github_token)?
    };

    let result = run(config).await;
    if let Err(e) = &result {
        tracing::error!("Report failed: {:#}", e);
    }

    if let Some(provider) = provider {
        if let Err(e) = provider.shutdown() {
            tracing::warn!("Failed to flush spans: {}", e);
        }
    }

    result.map(|_| ())
}
