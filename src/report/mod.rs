//! Report generator: dashboards on disk plus analytics in the log.
//!
//! Nothing in here can fail a run. Rendering errors are downgraded to
//! warnings and an empty cleaned set skips the plots entirely.

pub mod insights;
pub mod plots;

use std::path::PathBuf;

use crate::aggregate::DailySummary;
use crate::clean::CleanedArticle;
use crate::config::PipelineConfig;

/// Render both dashboards; returns the files actually written.
pub fn render_plots(
    cfg: &PipelineConfig,
    cleaned: &[CleanedArticle],
    daily: &[DailySummary],
) -> Vec<PathBuf> {
    if !cfg.render_plots {
        tracing::debug!(target: "report", "plot rendering disabled");
        return Vec::new();
    }
    if cleaned.is_empty() {
        tracing::info!(target: "report", "no cleaned records; skipping plots");
        return Vec::new();
    }

    let mut written = Vec::new();
    match plots::render_dashboard(&cfg.plots_dir, cleaned, daily) {
        Ok(p) => written.push(p),
        Err(e) => tracing::warn!(target: "report", error = ?e, "dashboard rendering failed"),
    }
    match plots::render_theme_analysis(&cfg.plots_dir, cleaned, cfg.top_n_themes) {
        Ok(p) => written.push(p),
        Err(e) => tracing::warn!(target: "report", error = ?e, "theme analysis rendering failed"),
    }
    for p in &written {
        tracing::info!(target: "report", path = %p.display(), "plot saved");
    }
    written
}

/// Advanced analytics followed by the executive summary.
pub fn log_insights(cfg: &PipelineConfig, cleaned: &[CleanedArticle]) {
    insights::log_advanced_analytics(cleaned);
    let summary = insights::executive_summary(cleaned);
    insights::log_executive_summary(summary.as_ref(), &cfg.company);
}
