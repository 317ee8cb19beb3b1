//! # Pipeline
//! Runs every stage once, in order:
//! load → derive → clean → aggregate → persist → SQL report → export → report.
//!
//! Stages share nothing but the values passed between them and the config.

use std::path::PathBuf;
use std::time::Instant;

use metrics::histogram;
use serde::Serialize;

use crate::aggregate::{self, DailySummary, Overview};
use crate::analyze::{self, DeriveStats};
use crate::clean::{self, CleanedArticle};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::export;
use crate::ingest;
use crate::metrics::mark_run_finished;
use crate::report;
use crate::store::{self, SentimentStore};

/// What a run did, for callers and tests.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub source: &'static str,
    pub synthetic: bool,
    pub loaded: usize,
    pub derive: DeriveStats,
    pub cleaned: usize,
    pub dropped: usize,
    pub daily_rows: usize,
    pub overview: Overview,
    pub bi_export: PathBuf,
    pub summary: PathBuf,
    pub plots: Vec<PathBuf>,
    pub sql_queries: usize,
}

fn stage_done(stage: &'static str, started: Instant) {
    let ms = started.elapsed().as_secs_f64() * 1000.0;
    histogram!("esg_stage_ms", "stage" => stage).record(ms);
    tracing::debug!(target: "pipeline", stage, ms = ms as u64, "stage finished");
}

async fn persist(
    cfg: &PipelineConfig,
    cleaned: &[CleanedArticle],
    daily: &[DailySummary],
) -> Result<()> {
    let db = SentimentStore::open(&cfg.db_path).await?;
    let res = db.replace_all(cleaned, daily).await;
    db.close().await;
    res
}

async fn sql_report(cfg: &PipelineConfig) -> Result<usize> {
    let db = SentimentStore::open_read_only(&cfg.db_path).await?;
    let res = store::run_sql_report(&db).await;
    db.close().await;
    Ok(res?.len())
}

fn log_overview(o: &Overview) {
    for c in &o.categories {
        tracing::info!(
            target: "pipeline",
            category = %c.category,
            count = c.count,
            pct = %format!("{:.1}", c.percentage),
            "sentiment distribution"
        );
    }
    for (rank, a) in o.most_negative.iter().enumerate() {
        tracing::info!(
            target: "pipeline",
            rank = rank + 1,
            score = %format!("{:.2}", a.score),
            date = %a.date,
            source = %a.source,
            url = %a.url,
            "most negative article"
        );
    }
    for (rank, t) in o.top_themes.iter().enumerate() {
        tracing::info!(
            target: "pipeline",
            rank = rank + 1,
            theme = %t.theme,
            count = t.count,
            "common theme"
        );
    }
    for row in &o.crosstab {
        let cells: Vec<String> = row.counts.iter().map(usize::to_string).collect();
        tracing::info!(
            target: "pipeline",
            theme = %row.theme,
            counts = %cells.join(" / "),
            "theme by sentiment (very negative / negative / positive / very positive)"
        );
    }
    let categorised: usize = o.esg.iter().map(|s| s.count).sum();
    tracing::info!(target: "pipeline", total = categorised, "categorised themes");
    for s in &o.esg {
        tracing::info!(
            target: "pipeline",
            category = %s.category,
            mentions = s.count,
            pct = %format!("{:.1}", s.percentage),
            "ESG category"
        );
    }
    for s in &o.sources {
        tracing::info!(
            target: "pipeline",
            source = %s.source,
            count = s.count,
            mean = %format!("{:.3}", s.mean),
            min = %format!("{:.3}", s.min),
            max = %format!("{:.3}", s.max),
            negative_pct = %format!("{:.1}", s.negative_pct),
            "source sentiment"
        );
    }
}

/// Execute the whole batch job against `cfg`.
pub async fn run(cfg: &PipelineConfig) -> Result<RunReport> {
    let run_started = Instant::now();
    tracing::info!(
        target: "pipeline",
        company = %cfg.company,
        input = %cfg.input_path.display(),
        db = %cfg.db_path.display(),
        "pipeline starting"
    );

    let t = Instant::now();
    let loaded = ingest::load_articles(cfg).await?;
    stage_done("load", t);
    let (source, synthetic, loaded_n) = (loaded.source, loaded.synthetic, loaded.articles.len());

    let t = Instant::now();
    let (derived, derive_stats) = analyze::derive_all(loaded.articles);
    stage_done("derive", t);

    let t = Instant::now();
    let outcome = clean::clean(derived);
    stage_done("clean", t);
    let cleaned = outcome.kept;

    let t = Instant::now();
    let daily = aggregate::daily_summary(&cleaned);
    let overview = aggregate::overview(&cleaned, cfg.top_n_themes);
    log_overview(&overview);
    stage_done("aggregate", t);

    let t = Instant::now();
    persist(cfg, &cleaned, &daily).await?;
    stage_done("persist", t);

    let sql_queries = if cfg.sql_report {
        let t = Instant::now();
        let n = sql_report(cfg).await?;
        stage_done("sql_report", t);
        n
    } else {
        0
    };

    let t = Instant::now();
    let rows = export::build_bi_rows(&cleaned, cfg.rolling);
    let bi_export = cfg.bi_export_path();
    export::write_bi_export(&bi_export, &rows)?;
    let summary = cfg.summary_path();
    let stats = export::summary_stats(&cleaned, &daily);
    export::write_summary_stats(&summary, stats.as_ref())?;
    stage_done("export", t);

    let t = Instant::now();
    let plots = report::render_plots(cfg, &cleaned, &daily);
    report::log_insights(cfg, &cleaned);
    stage_done("report", t);

    mark_run_finished();
    let report = RunReport {
        source,
        synthetic,
        loaded: loaded_n,
        derive: derive_stats,
        cleaned: cleaned.len(),
        dropped: outcome.dropped,
        daily_rows: daily.len(),
        overview,
        bi_export,
        summary,
        plots,
        sql_queries,
    };
    tracing::info!(
        target: "pipeline",
        loaded = report.loaded,
        cleaned = report.cleaned,
        dropped = report.dropped,
        synthetic = report.synthetic,
        elapsed_ms = run_started.elapsed().as_millis() as u64,
        "pipeline finished"
    );
    Ok(report)
}
