//! # Cleaner
//! Keeps only records with both a parsed date and a sentiment score.
//!
//! Dropped records are not repaired or reported one by one; the counts are
//! logged and returned. `CleanedArticle` has no optional date or score, so
//! every stage after this one works on complete records.

use chrono::{NaiveDate, Weekday};
use metrics::counter;

use crate::analyze::dates::weekday_name;
use crate::analyze::{DerivedArticle, SentimentCategory, Temporal};
use crate::ingest::types::Article;

#[derive(Debug, Clone, PartialEq)]
pub struct CleanedArticle {
    pub article: Article,
    pub date: NaiveDate,
    pub sentiment_score: f64,
    pub sentiment_category: SentimentCategory,
    pub year: i32,
    pub month: u32,
    pub day_of_week: Weekday,
    pub primary_theme: String,
    pub themes: Vec<String>,
}

impl CleanedArticle {
    pub fn day_name(&self) -> &'static str {
        weekday_name(self.day_of_week)
    }
}

impl From<CleanedArticle> for DerivedArticle {
    fn from(c: CleanedArticle) -> Self {
        DerivedArticle {
            article: c.article,
            date: Some(c.date),
            sentiment_score: Some(c.sentiment_score),
            sentiment_category: Some(c.sentiment_category),
            primary_theme: c.primary_theme,
            themes: c.themes,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CleanOutcome {
    pub kept: Vec<CleanedArticle>,
    pub dropped_missing_score: usize,
    pub dropped_missing_date: usize,
    pub dropped: usize,
}

fn promote(d: DerivedArticle) -> Result<CleanedArticle, (bool, bool)> {
    match (d.date, d.sentiment_score) {
        (Some(date), Some(score)) => {
            let t = Temporal::of(date);
            Ok(CleanedArticle {
                sentiment_category: d
                    .sentiment_category
                    .unwrap_or_else(|| SentimentCategory::from_score(score)),
                article: d.article,
                date,
                sentiment_score: score,
                year: t.year,
                month: t.month,
                day_of_week: t.weekday,
                primary_theme: d.primary_theme,
                themes: d.themes,
            })
        }
        (date, score) => Err((score.is_none(), date.is_none())),
    }
}

/// Cleaner stage.
pub fn clean<I>(records: I) -> CleanOutcome
where
    I: IntoIterator<Item = DerivedArticle>,
{
    let mut out = CleanOutcome::default();
    for d in records {
        match promote(d) {
            Ok(c) => out.kept.push(c),
            Err((no_score, no_date)) => {
                out.dropped += 1;
                out.dropped_missing_score += usize::from(no_score);
                out.dropped_missing_date += usize::from(no_date);
            }
        }
    }

    counter!("esg_records_kept_total").increment(out.kept.len() as u64);
    counter!("esg_records_dropped_total").increment(out.dropped as u64);
    tracing::info!(
        target: "clean",
        retained = out.kept.len(),
        dropped = out.dropped,
        missing_score = out.dropped_missing_score,
        missing_date = out.dropped_missing_date,
        "cleaning finished"
    );
    if out.kept.is_empty() {
        tracing::warn!(target: "clean", "no records survived cleaning; outputs will be empty");
    }
    out
}
