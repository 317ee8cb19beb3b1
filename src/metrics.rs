use std::path::Path;

use anyhow::Context;
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// Register help text for every pipeline metric (idempotent).
pub fn describe_pipeline_metrics() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("esg_records_loaded_total", "Raw records read by the loader.");
        describe_counter!(
            "esg_records_malformed_total",
            "Records whose tone or date field could not be parsed."
        );
        describe_counter!("esg_records_kept_total", "Records that survived cleaning.");
        describe_counter!(
            "esg_records_dropped_total",
            "Records dropped for a missing date or sentiment score."
        );
        describe_counter!(
            "esg_synthetic_fallback_total",
            "Runs that used generated sample data because the input was missing."
        );
        describe_histogram!("esg_stage_ms", "Wall time per pipeline stage in milliseconds.");
        describe_gauge!(
            "esg_pipeline_last_run_ts",
            "Unix timestamp of the last successful run."
        );
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder as the global one.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        describe_pipeline_metrics();
        Ok(Self { handle })
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Write the text exposition format to `path`.
    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        write_exposition(&self.handle, path)
    }
}

pub fn write_exposition(handle: &PrometheusHandle, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    std::fs::write(path, handle.render())
        .with_context(|| format!("write metrics to {}", path.display()))?;
    tracing::info!(target: "metrics", path = %path.display(), "metrics written");
    Ok(())
}

pub fn mark_run_finished() {
    let ts = chrono::Utc::now().timestamp() as f64;
    gauge!("esg_pipeline_last_run_ts").set(ts);
}
