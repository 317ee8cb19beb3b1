//! # Aggregator
//! Pure rollups over the cleaned article set.
//!
//! Nothing here fails: an empty slice yields empty vectors (or zero counts),
//! and every output is ordered deterministically so reruns produce identical
//! tables.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::analyze::dates::weekday_name;
use crate::analyze::themes::categorize_themes;
use crate::analyze::{EsgCategory, SentimentCategory};
use crate::clean::CleanedArticle;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub avg_sentiment: f64,
    pub article_count: usize,
    /// Sample std-dev; 0 for single-article days.
    pub sentiment_std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: SentimentCategory,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStats {
    pub source: String,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub negative_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeCount {
    pub theme: String,
    pub count: usize,
}

/// Primary theme × sentiment category, counts indexed like `SentimentCategory::ALL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeCategoryRow {
    pub theme: String,
    pub counts: [usize; 4],
}

impl ThemeCategoryRow {
    pub fn count(&self, cat: SentimentCategory) -> usize {
        SentimentCategory::ALL
            .iter()
            .position(|c| *c == cat)
            .map(|i| self.counts[i])
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EsgShare {
    pub category: EsgCategory,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    pub count: usize,
    pub mean: f64,
    pub negative_pct: f64,
    pub volatility: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NegativeArticle {
    pub date: NaiveDate,
    pub score: f64,
    pub source: String,
    pub url: String,
}

/// Everything the aggregate stage reports for a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub categories: Vec<CategoryCount>,
    /// Over every theme token, `OVERVIEW_THEMES` long.
    pub top_themes: Vec<ThemeCount>,
    /// Cross-tab rows for the most common primary themes, most common first.
    pub crosstab: Vec<ThemeCategoryRow>,
    pub esg: Vec<EsgShare>,
    pub sources: Vec<SourceStats>,
    pub most_negative: Vec<NegativeArticle>,
}

pub const OVERVIEW_THEMES: usize = 15;
pub const OVERVIEW_SOURCES: usize = 10;
pub const OVERVIEW_NEGATIVE: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdaySummary {
    pub weekday: &'static str,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
}

// ---- small statistics helpers ----

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (n - 1); 0 when fewer than two values.
pub fn sample_std(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (xs.len() - 1) as f64).sqrt()
}

pub fn median(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mut v = xs.to_vec();
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    if v.len() % 2 == 0 {
        (v[mid - 1] + v[mid]) / 2.0
    } else {
        v[mid]
    }
}

/// Pearson correlation; `None` when either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let (mx, my) = (mean(&xs[..n]), mean(&ys[..n]));
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for i in 0..n {
        let (dx, dy) = (xs[i] - mx, ys[i] - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx.sqrt() * syy.sqrt()))
}

fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

fn negative_pct(scores: &[f64]) -> f64 {
    pct(scores.iter().filter(|s| **s < 0.0).count(), scores.len())
}

fn ranked(counts: HashMap<&str, usize>, top_n: usize) -> Vec<ThemeCount> {
    let mut v: Vec<ThemeCount> = counts
        .into_iter()
        .map(|(theme, count)| ThemeCount {
            theme: theme.to_string(),
            count,
        })
        .collect();
    v.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.theme.cmp(&b.theme)));
    v.truncate(top_n);
    v
}

// ---- rollups ----

/// One row per distinct date, ascending.
pub fn daily_summary(articles: &[CleanedArticle]) -> Vec<DailySummary> {
    let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for a in articles {
        by_day.entry(a.date).or_default().push(a.sentiment_score);
    }
    by_day
        .into_iter()
        .map(|(date, scores)| DailySummary {
            date,
            avg_sentiment: mean(&scores),
            article_count: scores.len(),
            sentiment_std: sample_std(&scores),
        })
        .collect()
}

/// All four categories in category order, including zero counts.
pub fn category_counts(articles: &[CleanedArticle]) -> Vec<CategoryCount> {
    let total = articles.len();
    SentimentCategory::ALL
        .iter()
        .map(|&category| {
            let count = articles
                .iter()
                .filter(|a| a.sentiment_category == category)
                .count();
            CategoryCount {
                category,
                count,
                percentage: pct(count, total),
            }
        })
        .collect()
}

/// Per-source stats, most prolific first.
pub fn source_summary(articles: &[CleanedArticle]) -> Vec<SourceStats> {
    let mut by_source: HashMap<&str, Vec<f64>> = HashMap::new();
    for a in articles {
        by_source
            .entry(a.article.source.as_str())
            .or_default()
            .push(a.sentiment_score);
    }
    let mut out: Vec<SourceStats> = by_source
        .into_iter()
        .map(|(source, scores)| SourceStats {
            source: source.to_string(),
            count: scores.len(),
            mean: mean(&scores),
            min: scores.iter().copied().fold(f64::INFINITY, f64::min),
            max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            negative_pct: negative_pct(&scores),
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.source.cmp(&b.source)));
    out
}

/// Primary-theme frequency, count desc then name.
pub fn theme_ranking(articles: &[CleanedArticle], top_n: usize) -> Vec<ThemeCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for a in articles {
        *counts.entry(a.primary_theme.as_str()).or_default() += 1;
    }
    ranked(counts, top_n)
}

/// Frequency over every theme token, not only the primary one.
pub fn all_theme_ranking(articles: &[CleanedArticle], top_n: usize) -> Vec<ThemeCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for t in articles.iter().flat_map(|a| a.themes.iter()) {
        *counts.entry(t.as_str()).or_default() += 1;
    }
    ranked(counts, top_n)
}

/// Rows sorted by theme name.
pub fn theme_category_crosstab(articles: &[CleanedArticle]) -> Vec<ThemeCategoryRow> {
    let mut table: BTreeMap<&str, [usize; 4]> = BTreeMap::new();
    for a in articles {
        let row = table.entry(a.primary_theme.as_str()).or_default();
        if let Some(i) = SentimentCategory::ALL
            .iter()
            .position(|c| *c == a.sentiment_category)
        {
            row[i] += 1;
        }
    }
    table
        .into_iter()
        .map(|(theme, counts)| ThemeCategoryRow {
            theme: theme.to_string(),
            counts,
        })
        .collect()
}

/// ESG category totals across all theme tokens; percentages of categorised tokens.
pub fn esg_breakdown(articles: &[CleanedArticle]) -> Vec<EsgShare> {
    let mut totals = EsgCategory::ALL.map(|c| (c, 0usize));
    for a in articles {
        for (i, (_, n)) in categorize_themes(&a.themes).iter().enumerate() {
            totals[i].1 += n;
        }
    }
    let grand: usize = totals.iter().map(|(_, n)| n).sum();
    totals
        .into_iter()
        .map(|(category, count)| EsgShare {
            category,
            count,
            percentage: pct(count, grand),
        })
        .collect()
}

/// `esg_breakdown` with the most mentioned category first; ties keep category order.
pub fn esg_ranking(articles: &[CleanedArticle]) -> Vec<EsgShare> {
    let mut v = esg_breakdown(articles);
    v.sort_by(|a, b| b.count.cmp(&a.count));
    v
}

pub fn monthly_summary(articles: &[CleanedArticle]) -> Vec<MonthlySummary> {
    let mut by_month: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for a in articles {
        by_month
            .entry((a.date.year(), a.date.month()))
            .or_default()
            .push(a.sentiment_score);
    }
    by_month
        .into_iter()
        .map(|((y, m), scores)| MonthlySummary {
            month: format!("{y:04}-{m:02}"),
            count: scores.len(),
            mean: mean(&scores),
            negative_pct: negative_pct(&scores),
            volatility: sample_std(&scores),
        })
        .collect()
}

/// Monday first; weekdays with no articles are omitted.
pub fn weekday_summary(articles: &[CleanedArticle]) -> Vec<WeekdaySummary> {
    const ORDER: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    ORDER
        .iter()
        .filter_map(|&wd| {
            let scores: Vec<f64> = articles
                .iter()
                .filter(|a| a.day_of_week == wd)
                .map(|a| a.sentiment_score)
                .collect();
            (!scores.is_empty()).then(|| WeekdaySummary {
                weekday: weekday_name(wd),
                count: scores.len(),
                mean: mean(&scores),
                std: sample_std(&scores),
            })
        })
        .collect()
}

/// The `n` lowest-scoring articles; ties keep input order.
pub fn most_negative(articles: &[CleanedArticle], n: usize) -> Vec<&CleanedArticle> {
    let mut v: Vec<&CleanedArticle> = articles.iter().collect();
    v.sort_by(|a, b| a.sentiment_score.total_cmp(&b.sentiment_score));
    v.truncate(n);
    v
}

/// Bundle the rollups logged after cleaning. `top_n_themes` bounds the cross-tab.
pub fn overview(articles: &[CleanedArticle], top_n_themes: usize) -> Overview {
    let table = theme_category_crosstab(articles);
    let crosstab = theme_ranking(articles, top_n_themes)
        .iter()
        .filter_map(|t| table.iter().find(|r| r.theme == t.theme).cloned())
        .collect();
    let mut sources = source_summary(articles);
    sources.truncate(OVERVIEW_SOURCES);

    Overview {
        categories: category_counts(articles),
        top_themes: all_theme_ranking(articles, OVERVIEW_THEMES),
        crosstab,
        esg: esg_ranking(articles),
        sources,
        most_negative: most_negative(articles, OVERVIEW_NEGATIVE)
            .into_iter()
            .map(|a| NegativeArticle {
                date: a.date,
                score: a.sentiment_score,
                source: a.article.source.clone(),
                url: a.article.url.clone(),
            })
            .collect(),
    }
}
