// src/analyze/mod.rs
//! Feature derivation: raw `Article` → `DerivedArticle`.
//!
//! Score and date stay `Option` here; a failed parse is never imputed. The
//! cleaner decides what survives.

pub mod category;
pub mod dates;
pub mod themes;
pub mod tone;

use chrono::NaiveDate;
use metrics::counter;
use serde::Serialize;

pub use crate::analyze::category::SentimentCategory;
pub use crate::analyze::dates::{parse_date, Temporal};
pub use crate::analyze::themes::{EsgCategory, UNKNOWN_THEME};
pub use crate::analyze::tone::parse_tone;

use crate::error::FieldError;
use crate::ingest::types::Article;

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedArticle {
    pub article: Article,
    pub date: Option<NaiveDate>,
    pub sentiment_score: Option<f64>,
    pub sentiment_category: Option<SentimentCategory>,
    pub primary_theme: String,
    pub themes: Vec<String>,
}

/// Per-field failure counts for one derivation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeriveStats {
    pub total: usize,
    pub tone_missing: usize,
    pub tone_malformed: usize,
    pub date_missing: usize,
    pub date_malformed: usize,
    pub theme_defaulted: usize,
}

impl DeriveStats {
    pub fn malformed_records(&self) -> usize {
        self.tone_malformed + self.date_malformed
    }
}

/// Derive features for a single record, tallying failures into `stats`.
pub fn derive(article: Article, stats: &mut DeriveStats) -> DerivedArticle {
    stats.total += 1;

    let sentiment_score = match parse_tone(article.tone.as_deref()) {
        Ok(v) => Some(v),
        Err(FieldError::Missing) => {
            stats.tone_missing += 1;
            None
        }
        Err(_) => {
            stats.tone_malformed += 1;
            None
        }
    };

    let date = parse_date(article.published.as_deref());
    if date.is_none() {
        if article.published.is_none() {
            stats.date_missing += 1;
        } else {
            stats.date_malformed += 1;
        }
    }

    let primary_theme = themes::primary_theme(article.themes.as_deref()).unwrap_or_else(|_| {
        stats.theme_defaulted += 1;
        UNKNOWN_THEME.to_string()
    });
    let themes = themes::extract_themes(article.themes.as_deref());

    DerivedArticle {
        sentiment_category: sentiment_score.map(SentimentCategory::from_score),
        article,
        date,
        sentiment_score,
        primary_theme,
        themes,
    }
}

/// Feature deriver stage.
pub fn derive_all(articles: Vec<Article>) -> (Vec<DerivedArticle>, DeriveStats) {
    let mut stats = DeriveStats::default();
    let out: Vec<DerivedArticle> = articles
        .into_iter()
        .map(|a| derive(a, &mut stats))
        .collect();

    counter!("esg_records_malformed_total").increment(stats.malformed_records() as u64);
    if stats.malformed_records() > 0 || stats.tone_missing > 0 || stats.date_missing > 0 {
        tracing::warn!(
            target: "analyze",
            total = stats.total,
            tone_missing = stats.tone_missing,
            tone_malformed = stats.tone_malformed,
            date_missing = stats.date_missing,
            date_malformed = stats.date_malformed,
            "records with unusable fields"
        );
    }
    tracing::info!(
        target: "analyze",
        total = stats.total,
        theme_defaulted = stats.theme_defaulted,
        "features derived"
    );
    (out, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(date: Option<&str>, tone: Option<&str>, themes: Option<&str>) -> Article {
        Article {
            id: "x".into(),
            published: date.map(str::to_string),
            source: "example.com".into(),
            url: "https://example.com/x".into(),
            tone: tone.map(str::to_string),
            themes: themes.map(str::to_string),
            locations: None,
            organizations: None,
        }
    }

    #[test]
    fn derives_score_category_and_theme() {
        let mut st = DeriveStats::default();
        let d = derive(
            art(Some("20250703"), Some("2.0,1,1"), Some("ECON_STOCKMARKET;TAX")),
            &mut st,
        );
        assert_eq!(d.sentiment_score, Some(2.0));
        assert_eq!(d.sentiment_category, Some(SentimentCategory::VeryPositive));
        assert_eq!(d.date, NaiveDate::from_ymd_opt(2025, 7, 3));
        assert_eq!(d.primary_theme, "ECON_STOCKMARKET");
        assert_eq!(d.themes.len(), 2);
        assert_eq!(st, DeriveStats { total: 1, ..Default::default() });
    }

    #[test]
    fn failures_become_none_and_are_counted() {
        let (out, st) = derive_all(vec![
            art(Some("20250703"), Some("oops,1"), None),
            art(None, None, Some("")),
            art(Some("1"), Some("1.0"), None),
        ]);
        assert_eq!(out[0].sentiment_score, None);
        assert_eq!(out[0].sentiment_category, None);
        assert_eq!(out[0].primary_theme, UNKNOWN_THEME);
        assert_eq!(out[1].date, None);
        assert_eq!(out[2].date, None);
        assert_eq!(out[2].sentiment_score, Some(1.0));
        assert_eq!(st.tone_malformed, 1);
        assert_eq!(st.tone_missing, 1);
        assert_eq!(st.date_missing, 1);
        assert_eq!(st.date_malformed, 1);
        assert_eq!(st.theme_defaulted, 3);
    }
}
