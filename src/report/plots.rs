//! SVG dashboards. Layout and pixels are not a stable interface; only the
//! file names are.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::aggregate::{all_theme_ranking, category_counts, esg_breakdown, DailySummary};
use crate::clean::CleanedArticle;

pub const DASHBOARD_FILE: &str = "sentiment_dashboard.svg";
pub const THEME_FILE: &str = "esg_theme_analysis.svg";

const SIZE: (u32, u32) = (1600, 1000);
const HISTOGRAM_BINS: usize = 50;
const THEME_LABEL_MAX: usize = 30;

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

fn bar_panel(
    area: &Area<'_>,
    caption: &str,
    labels: &[String],
    values: &[f64],
    color: RGBColor,
) -> anyhow::Result<()> {
    let n = labels.len().max(1) as i32;
    let top = values.iter().copied().fold(1.0_f64, f64::max) * 1.1;
    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(50)
        .build_cartesian_2d(0..n, 0f64..top)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().max(1))
        .x_label_formatter(&|x| labels.get(*x as usize).cloned().unwrap_or_default())
        .draw()?;
    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        let i = i as i32;
        Rectangle::new([(i, 0.0), (i + 1, *v)], color.filled())
    }))?;
    Ok(())
}

/// Most common theme tokens (any position in the theme list) as bar data.
fn theme_bars(cleaned: &[CleanedArticle], top_n: usize) -> (Vec<String>, Vec<f64>) {
    all_theme_ranking(cleaned, top_n)
        .into_iter()
        .map(|t| {
            let label = if t.theme.chars().count() > THEME_LABEL_MAX {
                let head: String = t.theme.chars().take(THEME_LABEL_MAX).collect();
                format!("{head}...")
            } else {
                t.theme
            };
            (label, t.count as f64)
        })
        .unzip()
}

fn day_offset(first: NaiveDate, d: NaiveDate) -> i32 {
    (d - first).num_days() as i32
}

fn daily_line(area: &Area<'_>, daily: &[DailySummary]) -> anyhow::Result<()> {
    let (Some(first), Some(last)) = (daily.first(), daily.last()) else {
        return Ok(());
    };
    let span = day_offset(first.date, last.date).max(1);
    let lo = daily
        .iter()
        .map(|d| d.avg_sentiment)
        .fold(0.0_f64, f64::min)
        - 0.5;
    let hi = daily
        .iter()
        .map(|d| d.avg_sentiment)
        .fold(0.0_f64, f64::max)
        + 0.5;
    let start = first.date;

    let mut chart = ChartBuilder::on(area)
        .caption("Daily Average Sentiment", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0..span, lo..hi)?;
    chart
        .configure_mesh()
        .x_labels(6)
        .x_label_formatter(&|x| (start + Duration::days(i64::from(*x))).format("%Y-%m").to_string())
        .y_desc("tone")
        .draw()?;
    chart.draw_series(LineSeries::new(
        daily.iter().map(|d| (day_offset(start, d.date), d.avg_sentiment)),
        &BLUE,
    ))?;
    chart.draw_series(LineSeries::new(
        vec![(0, 0.0), (span, 0.0)],
        &RED.mix(0.5),
    ))?;
    Ok(())
}

fn score_histogram(area: &Area<'_>, cleaned: &[CleanedArticle]) -> anyhow::Result<()> {
    if cleaned.is_empty() {
        return Ok(());
    }
    let lo = cleaned.iter().map(|a| a.sentiment_score).fold(f64::INFINITY, f64::min);
    let hi = cleaned.iter().map(|a| a.sentiment_score).fold(f64::NEG_INFINITY, f64::max);
    let width = if hi > lo {
        (hi - lo) / HISTOGRAM_BINS as f64
    } else {
        0.1
    };
    let mut bins = vec![0usize; HISTOGRAM_BINS];
    for a in cleaned {
        let idx = (((a.sentiment_score - lo) / width) as usize).min(HISTOGRAM_BINS - 1);
        bins[idx] += 1;
    }
    let peak = bins.iter().copied().max().unwrap_or(1).max(1) as f64 * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption("Sentiment Score Distribution", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(lo..(lo + width * HISTOGRAM_BINS as f64), 0f64..peak)?;
    chart.configure_mesh().x_desc("score").y_desc("articles").draw()?;
    chart.draw_series(bins.iter().enumerate().map(|(i, n)| {
        let x0 = lo + width * i as f64;
        Rectangle::new([(x0, 0.0), (x0 + width, *n as f64)], RGBColor(240, 128, 128).filled())
    }))?;
    Ok(())
}

/// Four-panel overview: daily line, score histogram, daily volume, categories.
pub fn render_dashboard(
    dir: &Path,
    cleaned: &[CleanedArticle],
    daily: &[DailySummary],
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(DASHBOARD_FILE);
    {
        let root = SVGBackend::new(&path, SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let panels = root.split_evenly((2, 2));

        daily_line(&panels[0], daily)?;
        score_histogram(&panels[1], cleaned)?;

        let day_labels: Vec<String> = daily
            .iter()
            .map(|d| d.date.format("%m-%d").to_string())
            .collect();
        let counts: Vec<f64> = daily.iter().map(|d| d.article_count as f64).collect();
        bar_panel(&panels[2], "Daily Article Count", &day_labels, &counts, RGBColor(60, 179, 113))?;

        let cats = category_counts(cleaned);
        let labels: Vec<String> = cats.iter().map(|c| c.category.label().to_string()).collect();
        let values: Vec<f64> = cats.iter().map(|c| c.count as f64).collect();
        bar_panel(&panels[3], "Sentiment Categories", &labels, &values, RGBColor(255, 165, 0))?;

        root.present()?;
    }
    Ok(path)
}

/// Most common theme tokens and ESG category totals.
pub fn render_theme_analysis(
    dir: &Path,
    cleaned: &[CleanedArticle],
    top_n: usize,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(THEME_FILE);
    {
        let root = SVGBackend::new(&path, SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let (upper, lower) = root.split_vertically(SIZE.1 / 2);

        let (labels, values) = theme_bars(cleaned, top_n);
        bar_panel(&upper, "Most Common Themes", &labels, &values, RGBColor(135, 206, 235))?;

        let esg = esg_breakdown(cleaned);
        let labels: Vec<String> = esg.iter().map(|e| e.category.label().to_string()).collect();
        let values: Vec<f64> = esg.iter().map(|e| e.count as f64).collect();
        bar_panel(&lower, "ESG Category Mentions", &labels, &values, RGBColor(147, 112, 219))?;

        root.present()?;
    }
    Ok(path)
}
