//! Advanced analytics and the executive summary. Everything here ends up
//! in the log; the structs exist so the numbers can be tested.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::aggregate::{self, esg_ranking, monthly_summary, weekday_summary};
use crate::analyze::EsgCategory;
use crate::clean::CleanedArticle;

pub const CORRELATION_FIELDS: [&str; 4] = ["sentiment_score", "sentiment_abs", "year", "month"];
const RECENT_DAYS: i64 = 30;

/// Pairwise Pearson coefficients over `CORRELATION_FIELDS`; `None` for
/// constant columns.
pub fn correlation_matrix(cleaned: &[CleanedArticle]) -> Vec<Vec<Option<f64>>> {
    let cols: [Vec<f64>; 4] = [
        cleaned.iter().map(|a| a.sentiment_score).collect(),
        cleaned.iter().map(|a| a.sentiment_score.abs()).collect(),
        cleaned.iter().map(|a| f64::from(a.year)).collect(),
        cleaned.iter().map(|a| f64::from(a.month)).collect(),
    ];
    cols.iter()
        .map(|x| cols.iter().map(|y| aggregate::pearson(x, y)).collect())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Improving,
    Declining,
    Steady,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trend {
    pub recent_mean: f64,
    pub overall_mean: f64,
    pub direction: TrendDirection,
    pub magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub total_articles: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub mean: f64,
    pub negative_pct: f64,
    pub positive_pct: f64,
    pub trend: Trend,
    /// ESG categories with at least one mention, most mentioned first.
    pub priorities: Vec<(EsgCategory, usize)>,
}

/// Compare the last 30 days of coverage (relative to the newest article)
/// with the whole period.
pub fn trend(cleaned: &[CleanedArticle]) -> Option<Trend> {
    let end = cleaned.iter().map(|a| a.date).max()?;
    let cutoff = end - Duration::days(RECENT_DAYS);
    let all: Vec<f64> = cleaned.iter().map(|a| a.sentiment_score).collect();
    let recent: Vec<f64> = cleaned
        .iter()
        .filter(|a| a.date >= cutoff)
        .map(|a| a.sentiment_score)
        .collect();
    let overall_mean = aggregate::mean(&all);
    let recent_mean = aggregate::mean(&recent);
    let direction = if recent_mean > overall_mean {
        TrendDirection::Improving
    } else if recent_mean < overall_mean {
        TrendDirection::Declining
    } else {
        TrendDirection::Steady
    };
    Some(Trend {
        recent_mean,
        overall_mean,
        direction,
        magnitude: (recent_mean - overall_mean).abs(),
    })
}

pub fn executive_summary(cleaned: &[CleanedArticle]) -> Option<ExecutiveSummary> {
    let trend = trend(cleaned)?;
    let start = cleaned.iter().map(|a| a.date).min()?;
    let end = cleaned.iter().map(|a| a.date).max()?;
    let n = cleaned.len() as f64;

    let priorities: Vec<(EsgCategory, usize)> = esg_ranking(cleaned)
        .into_iter()
        .filter(|s| s.count > 0)
        .map(|s| (s.category, s.count))
        .collect();

    Some(ExecutiveSummary {
        total_articles: cleaned.len(),
        start,
        end,
        mean: trend.overall_mean,
        negative_pct: cleaned.iter().filter(|a| a.sentiment_score < 0.0).count() as f64 * 100.0 / n,
        positive_pct: cleaned.iter().filter(|a| a.sentiment_score > 0.0).count() as f64 * 100.0 / n,
        trend,
        priorities,
    })
}

pub fn recommendations(cat: EsgCategory) -> (&'static str, &'static [&'static str]) {
    match cat {
        EsgCategory::Governance => (
            "Governance and compliance",
            &[
                "tighten anti-corruption and compliance controls",
                "publish clearer board oversight and audit reporting",
                "get ahead of open regulatory and legal questions",
            ],
        ),
        EsgCategory::Economic => (
            "Financial transparency",
            &[
                "expand investor disclosure on ESG metrics",
                "address executive compensation concerns directly",
            ],
        ),
        EsgCategory::Social => (
            "Workforce and community",
            &[
                "report on labour practices and employee well-being",
                "show progress on diversity and inclusion",
                "keep product safety communication proactive",
            ],
        ),
        EsgCategory::Environmental => (
            "Environmental stewardship",
            &[
                "report manufacturing emissions transparently",
                "document supply-chain sourcing standards",
            ],
        ),
        EsgCategory::Technology => (
            "Technology and data",
            &[
                "explain data-handling and autonomy safety practices",
                "coordinate public messaging on emerging technology",
            ],
        ),
        EsgCategory::Political => (
            "Political exposure",
            &[
                "separate leadership political commentary from company positions",
                "disclose lobbying and policy engagement",
            ],
        ),
    }
}

/// Correlation, monthly volatility and the weekday breakdown. Source
/// breakdowns are logged with the aggregate overview.
pub fn log_advanced_analytics(cleaned: &[CleanedArticle]) {
    if cleaned.is_empty() {
        tracing::info!(target: "report", "no data for advanced analytics");
        return;
    }

    let matrix = correlation_matrix(cleaned);
    for (name, row) in CORRELATION_FIELDS.iter().zip(&matrix) {
        let cells: Vec<String> = row
            .iter()
            .map(|c| c.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}")))
            .collect();
        tracing::info!(target: "report", field = name, row = %cells.join("  "), "correlation");
    }

    let months = monthly_summary(cleaned);
    let vols: Vec<f64> = months.iter().map(|m| m.volatility).collect();
    let highest = months.iter().max_by(|a, b| a.volatility.total_cmp(&b.volatility));
    let lowest = months.iter().min_by(|a, b| a.volatility.total_cmp(&b.volatility));
    if let (Some(hi), Some(lo)) = (highest, lowest) {
        tracing::info!(
            target: "report",
            average = %format!("{:.3}", aggregate::mean(&vols)),
            highest_month = %hi.month,
            highest = %format!("{:.3}", hi.volatility),
            lowest_month = %lo.month,
            lowest = %format!("{:.3}", lo.volatility),
            "monthly volatility"
        );
    }

    for d in weekday_summary(cleaned) {
        tracing::info!(
            target: "report",
            weekday = d.weekday,
            mean = %format!("{:.3}", d.mean),
            count = d.count,
            std = %format!("{:.3}", d.std),
            "day of week"
        );
    }
}

pub fn log_executive_summary(summary: Option<&ExecutiveSummary>, company: &str) {
    let Some(s) = summary else {
        tracing::warn!(target: "report", "no data available for the executive summary");
        return;
    };
    tracing::info!(
        target: "report",
        company,
        articles = s.total_articles,
        period = %format!("{} to {}", s.start, s.end),
        mean = %format!("{:.3}", s.mean),
        negative_pct = %format!("{:.1}", s.negative_pct),
        positive_pct = %format!("{:.1}", s.positive_pct),
        "key metrics"
    );
    tracing::info!(
        target: "report",
        recent_30d = %format!("{:.3}", s.trend.recent_mean),
        overall = %format!("{:.3}", s.trend.overall_mean),
        direction = ?s.trend.direction,
        by = %format!("{:.3}", s.trend.magnitude),
        "trend"
    );
    for (rank, (cat, mentions)) in s.priorities.iter().enumerate() {
        let (title, actions) = recommendations(*cat);
        tracing::info!(
            target: "report",
            rank = rank + 1,
            category = %cat,
            mentions,
            actions = %actions.join("; "),
            "{title}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::derive_all;
    use crate::clean::clean;
    use crate::ingest::types::Article;

    fn art(date: &str, tone: &str, themes: &str) -> Article {
        Article {
            id: date.into(),
            published: Some(date.into()),
            source: "s.com".into(),
            url: "https://s.com".into(),
            tone: Some(tone.into()),
            themes: Some(themes.into()),
            locations: None,
            organizations: None,
        }
    }

    #[test]
    fn trend_uses_last_thirty_days_of_coverage() {
        let (d, _) = derive_all(vec![
            art("20250101", "-4.0", "CORRUPTION"),
            art("20250601", "1.0", "ECON_STOCKMARKET;CORRUPTION"),
            art("20250615", "3.0", "TAX_DISEASE"),
        ]);
        let c = clean(d).kept;
        let t = trend(&c).unwrap();
        assert_eq!(t.recent_mean, 2.0);
        assert_eq!(t.overall_mean, 0.0);
        assert_eq!(t.direction, TrendDirection::Improving);

        let s = executive_summary(&c).unwrap();
        assert_eq!(s.priorities[0], (EsgCategory::Governance, 2));
        assert_eq!(s.priorities.len(), 3);
        assert!((s.negative_pct - 100.0 / 3.0).abs() < 1e-9);
        assert!(executive_summary(&[]).is_none());
    }

    #[test]
    fn correlation_diagonal_and_constants() {
        let (d, _) = derive_all(vec![
            art("20250101", "-1.0", "X"),
            art("20250201", "2.0", "X"),
            art("20250301", "0.5", "X"),
        ]);
        let m = correlation_matrix(&clean(d).kept);
        assert!((m[0][0].unwrap() - 1.0).abs() < 1e-12);
        // single year: constant column
        assert_eq!(m[2][0], None);
        assert!(m[3][3].is_some());
    }
}
