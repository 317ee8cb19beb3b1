// src/ingest/mod.rs
pub mod gkg;
pub mod providers;
pub mod types;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::ingest::providers::{csv_file::CsvSource, synthetic::SyntheticSource};
use crate::ingest::types::{ArticleSource, LoadOutcome};
use metrics::counter;

/// Stable identifier for a raw record: the GKG record id when the file has
/// one, else a short digest of the URL, else the row position.
pub fn record_id(explicit: Option<&str>, url: &str, row: usize) -> String {
    if let Some(id) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return id.to_string();
    }
    if url.trim().is_empty() {
        return format!("row-{row}");
    }
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(url.trim().as_bytes());
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Try `primary`; if it reports `SourceUnavailable`, use `fallback` instead.
/// Every other error (malformed content, I/O) is returned as-is.
pub async fn load_with_fallback(
    primary: &dyn ArticleSource,
    fallback: &dyn ArticleSource,
) -> Result<LoadOutcome> {
    match primary.fetch_all().await {
        Ok(articles) => Ok(LoadOutcome {
            articles,
            source: primary.name(),
            synthetic: false,
        }),
        Err(PipelineError::SourceUnavailable(path)) => {
            tracing::warn!(
                target: "ingest",
                path = %path.display(),
                fallback = fallback.name(),
                "input not found; generating sample data"
            );
            counter!("esg_synthetic_fallback_total").increment(1);
            let articles = fallback.fetch_all().await?;
            Ok(LoadOutcome {
                articles,
                source: fallback.name(),
                synthetic: true,
            })
        }
        Err(e) => Err(e),
    }
}

/// Loader stage: configured CSV file, seeded synthetic data if it is missing.
pub async fn load_articles(cfg: &PipelineConfig) -> Result<LoadOutcome> {
    let primary = CsvSource::new(&cfg.input_path);
    let fallback = SyntheticSource::new(cfg.synthetic.clone(), &cfg.company);
    load_with_fallback(&primary, &fallback).await
}
