//! # Exporter
//! Flat files for BI tools: the enriched article table and a two-column
//! summary of headline statistics.
//!
//! Both files always carry a header row, so an empty run still produces
//! files a BI tool can open.

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::aggregate::{self, DailySummary};
use crate::analyze::dates::quarter;
use crate::analyze::SentimentCategory;
use crate::clean::CleanedArticle;
use crate::config::RollingWindows;
use crate::error::{PipelineError, Result};
use crate::rolling::trailing_means;

pub const BI_HEADER: [&str; 21] = [
    "id",
    "date",
    "source",
    "url",
    "tone_raw",
    "themes_raw",
    "locations_raw",
    "sentiment_score",
    "sentiment_category",
    "year",
    "month",
    "day_of_week",
    "primary_theme",
    "sentiment_abs",
    "is_negative",
    "is_positive",
    "week_of_year",
    "quarter",
    "date_str",
    "sentiment_7d_avg",
    "sentiment_30d_avg",
];

pub const SUMMARY_HEADER: [&str; 2] = ["metric", "value"];

/// One exported article; field order matches `BI_HEADER`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiExportRow {
    pub id: String,
    pub date: NaiveDate,
    pub source: String,
    pub url: String,
    pub tone_raw: Option<String>,
    pub themes_raw: Option<String>,
    pub locations_raw: Option<String>,
    pub sentiment_score: f64,
    pub sentiment_category: SentimentCategory,
    pub year: i32,
    pub month: u32,
    pub day_of_week: &'static str,
    pub primary_theme: String,
    pub sentiment_abs: f64,
    pub is_negative: bool,
    pub is_positive: bool,
    pub week_of_year: u32,
    pub quarter: u32,
    pub date_str: String,
    pub sentiment_7d_avg: f64,
    pub sentiment_30d_avg: f64,
}

/// Rows in ascending date order (stable for same-day articles) with trailing means.
pub fn build_bi_rows(cleaned: &[CleanedArticle], windows: RollingWindows) -> Vec<BiExportRow> {
    let mut ordered: Vec<&CleanedArticle> = cleaned.iter().collect();
    ordered.sort_by_key(|a| a.date);

    let scores: Vec<f64> = ordered.iter().map(|a| a.sentiment_score).collect();
    let short = trailing_means(&scores, windows.short);
    let long = trailing_means(&scores, windows.long);

    ordered
        .into_iter()
        .zip(short.into_iter().zip(long))
        .map(|(a, (s7, s30))| BiExportRow {
            id: a.article.id.clone(),
            date: a.date,
            source: a.article.source.clone(),
            url: a.article.url.clone(),
            tone_raw: a.article.tone.clone(),
            themes_raw: a.article.themes.clone(),
            locations_raw: a.article.locations.clone(),
            sentiment_score: a.sentiment_score,
            sentiment_category: a.sentiment_category,
            year: a.year,
            month: a.month,
            day_of_week: a.day_name(),
            primary_theme: a.primary_theme.clone(),
            sentiment_abs: a.sentiment_score.abs(),
            is_negative: a.sentiment_score < 0.0,
            is_positive: a.sentiment_score > 0.0,
            week_of_year: a.date.iso_week().week(),
            quarter: quarter(a.date),
            date_str: a.date.format("%Y-%m-%d").to_string(),
            sentiment_7d_avg: s7,
            sentiment_30d_avg: s30,
        })
        .collect()
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn writer_for(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    ensure_parent(path)?;
    csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|source| PipelineError::Export {
            path: path.to_path_buf(),
            source,
        })
}

fn export_err(path: &Path) -> impl Fn(csv::Error) -> PipelineError + '_ {
    move |source| PipelineError::Export {
        path: path.to_path_buf(),
        source,
    }
}

pub fn write_bi_export(path: &Path, rows: &[BiExportRow]) -> Result<()> {
    let mut w = writer_for(path)?;
    w.write_record(BI_HEADER).map_err(export_err(path))?;
    for r in rows {
        w.serialize(r).map_err(export_err(path))?;
    }
    w.flush()?;
    tracing::info!(
        target: "export",
        path = %path.display(),
        records = rows.len(),
        columns = BI_HEADER.len(),
        first = ?rows.first().map(|r| r.date),
        last = ?rows.last().map(|r| r.date),
        "BI export written"
    );
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_articles: usize,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub negative_pct: f64,
    pub positive_pct: f64,
    pub most_common_source: String,
    pub most_negative_day: NaiveDate,
    pub most_positive_day: NaiveDate,
}

impl SummaryStats {
    /// `(metric, value)` pairs in file order; values rounded for display.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Articles", self.total_articles.to_string()),
            ("Date Range Start", self.date_start.to_string()),
            ("Date Range End", self.date_end.to_string()),
            ("Average Sentiment", format!("{:.3}", self.mean)),
            ("Median Sentiment", format!("{:.3}", self.median)),
            ("Standard Deviation", format!("{:.3}", self.std_dev)),
            ("Negative Articles (%)", format!("{:.2}", self.negative_pct)),
            ("Positive Articles (%)", format!("{:.2}", self.positive_pct)),
            ("Most Common Source", self.most_common_source.clone()),
            ("Most Negative Day", self.most_negative_day.to_string()),
            ("Most Positive Day", self.most_positive_day.to_string()),
        ]
    }
}

/// `None` when there is nothing to summarise.
pub fn summary_stats(cleaned: &[CleanedArticle], daily: &[DailySummary]) -> Option<SummaryStats> {
    let date_start = cleaned.iter().map(|a| a.date).min()?;
    let date_end = cleaned.iter().map(|a| a.date).max()?;
    let scores: Vec<f64> = cleaned.iter().map(|a| a.sentiment_score).collect();
    let n = scores.len() as f64;

    // earliest day wins ties
    let most_negative_day = daily
        .iter()
        .fold(None::<&DailySummary>, |best, d| match best {
            Some(b) if b.avg_sentiment <= d.avg_sentiment => Some(b),
            _ => Some(d),
        })?
        .date;
    let most_positive_day = daily
        .iter()
        .fold(None::<&DailySummary>, |best, d| match best {
            Some(b) if b.avg_sentiment >= d.avg_sentiment => Some(b),
            _ => Some(d),
        })?
        .date;

    Some(SummaryStats {
        total_articles: cleaned.len(),
        date_start,
        date_end,
        mean: aggregate::mean(&scores),
        median: aggregate::median(&scores),
        std_dev: aggregate::sample_std(&scores),
        negative_pct: scores.iter().filter(|s| **s < 0.0).count() as f64 * 100.0 / n,
        positive_pct: scores.iter().filter(|s| **s > 0.0).count() as f64 * 100.0 / n,
        most_common_source: aggregate::source_summary(cleaned)
            .first()
            .map(|s| s.source.clone())
            .unwrap_or_else(|| "N/A".to_string()),
        most_negative_day,
        most_positive_day,
    })
}

pub fn write_summary_stats(path: &Path, stats: Option<&SummaryStats>) -> Result<()> {
    let mut w = writer_for(path)?;
    w.write_record(SUMMARY_HEADER).map_err(export_err(path))?;
    if let Some(s) = stats {
        for (metric, value) in s.rows() {
            w.write_record([metric, value.as_str()])
                .map_err(export_err(path))?;
        }
    }
    w.flush()?;
    tracing::info!(
        target: "export",
        path = %path.display(),
        empty = stats.is_none(),
        "summary statistics written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::daily_summary;
    use crate::analyze::derive_all;
    use crate::clean::clean;
    use crate::ingest::types::Article;

    fn art(id: &str, date: &str, tone: &str, source: &str) -> Article {
        Article {
            id: id.into(),
            published: Some(date.into()),
            source: source.into(),
            url: format!("https://{source}/{id}"),
            tone: Some(tone.into()),
            themes: Some("ECON_STOCKMARKET".into()),
            locations: None,
            organizations: None,
        }
    }

    fn cleaned() -> Vec<CleanedArticle> {
        let (d, _) = derive_all(vec![
            art("late", "20250703", "0.0,1", "b.com"),
            art("early", "20250701", "3.0,1", "a.com"),
            art("mid", "20250702", "-2.5,1", "a.com"),
        ]);
        clean(d).kept
    }

    #[test]
    fn bi_rows_are_date_sorted_with_prefix_means() {
        let rows = build_bi_rows(&cleaned(), RollingWindows::default());
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["early", "mid", "late"]);
        assert!((rows[0].sentiment_7d_avg - 3.0).abs() < 1e-9);
        assert!((rows[1].sentiment_7d_avg - 0.25).abs() < 1e-9);
        assert!((rows[2].sentiment_7d_avg - 1.0 / 6.0).abs() < 1e-9);
        assert_eq!(rows[2].sentiment_30d_avg, rows[2].sentiment_7d_avg);
        assert!(rows[1].is_negative && !rows[1].is_positive);
        assert!(!rows[2].is_negative && !rows[2].is_positive);
        assert_eq!(rows[1].sentiment_abs, 2.5);
        assert_eq!(rows[0].week_of_year, 27);
        assert_eq!(rows[0].quarter, 3);
        assert_eq!(rows[0].date_str, "2025-07-01");
        assert_eq!(rows[0].day_of_week, "Tuesday");
    }

    #[test]
    fn summary_has_expected_metrics() {
        let c = cleaned();
        let s = summary_stats(&c, &daily_summary(&c)).unwrap();
        assert_eq!(s.total_articles, 3);
        assert_eq!(s.most_common_source, "a.com");
        assert_eq!(s.most_negative_day.to_string(), "2025-07-02");
        assert_eq!(s.most_positive_day.to_string(), "2025-07-01");
        assert_eq!(s.median, 0.0);
        let rows = s.rows();
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[6], ("Negative Articles (%)", "33.33".to_string()));
        assert!(summary_stats(&[], &[]).is_none());
    }

    #[test]
    fn empty_exports_keep_headers() {
        let dir = tempfile::tempdir().unwrap();
        let bi = dir.path().join("nested/bi.csv");
        let sum = dir.path().join("summary.csv");
        write_bi_export(&bi, &[]).unwrap();
        write_summary_stats(&sum, None).unwrap();

        let bi_text = std::fs::read_to_string(&bi).unwrap();
        assert_eq!(bi_text.lines().count(), 1);
        assert!(bi_text.starts_with("id,date,source,url"));
        assert_eq!(std::fs::read_to_string(&sum).unwrap(), "metric,value\n");
    }

    #[test]
    fn bi_export_row_count_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bi.csv");
        let rows = build_bi_rows(&cleaned(), RollingWindows::default());
        write_bi_export(&path, &rows).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers.len(), BI_HEADER.len());
        let recs: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(recs.len(), 3);
        assert_eq!(&recs[0][8], "Very Positive");
        assert_eq!(&recs[1][14], "true");
    }
}
