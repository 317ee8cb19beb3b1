//! ESG sentiment pipeline: binary entrypoint.
//! Loads config, initialises tracing and metrics, runs the batch once and
//! maps the outcome to a process exit code.

use std::process::ExitCode;

use esg_sentiment_pipeline::{config, metrics::Metrics, pipeline};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Events use short per-stage targets, so each one is listed.
const DEFAULT_FILTER: &str = "warn,esg_sentiment_pipeline=info,pipeline=info,ingest=info,\
analyze=info,clean=info,store=info,export=info,report=info,metrics=info";

/// Compact logs by default, JSON lines when `ESG_LOG_FORMAT=json`.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json = std::env::var("ESG_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = match config::load_default() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = ?e, "configuration error");
            return ExitCode::from(1);
        }
    };

    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics recorder not installed");
            None
        }
    };

    let code = match pipeline::run(&cfg).await {
        Ok(report) => {
            tracing::info!(
                cleaned = report.cleaned,
                bi_export = %report.bi_export.display(),
                summary = %report.summary.display(),
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, exit_code = e.exit_code(), "pipeline failed");
            ExitCode::from(e.exit_code())
        }
    };

    if let (Some(m), Some(path)) = (metrics.as_ref(), cfg.metrics_path.as_ref()) {
        if let Err(e) = m.write_to(path) {
            tracing::warn!(error = ?e, "could not write metrics file");
        }
    }
    code
}
