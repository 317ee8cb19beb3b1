//! # Persistence
//! SQLite store for the cleaned article table and the daily rollup.
//!
//! Every run fully replaces both tables inside one transaction, so a rerun
//! never duplicates rows and a failed write leaves the previous contents.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Column, Row, ValueRef};

use crate::aggregate::DailySummary;
use crate::clean::CleanedArticle;
use crate::error::{PipelineError, Result};

pub const ARTICLES_TABLE: &str = "tesla_esg";
pub const DAILY_TABLE: &str = "daily_sentiment";

/// The two tables a run writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Articles,
    Daily,
}

impl Table {
    pub const fn name(self) -> &'static str {
        match self {
            Table::Articles => ARTICLES_TABLE,
            Table::Daily => DAILY_TABLE,
        }
    }
}

const CREATE_ARTICLES: &str = r#"
    CREATE TABLE tesla_esg (
        id TEXT NOT NULL,
        date TEXT NOT NULL,
        source TEXT NOT NULL,
        url TEXT NOT NULL,
        tone_raw TEXT,
        themes_raw TEXT,
        locations_raw TEXT,
        sentiment_score REAL NOT NULL,
        sentiment_category TEXT NOT NULL,
        year INTEGER NOT NULL,
        month INTEGER NOT NULL,
        day_of_week TEXT NOT NULL,
        primary_theme TEXT NOT NULL
    )
"#;

const CREATE_DAILY: &str = r#"
    CREATE TABLE daily_sentiment (
        date TEXT PRIMARY KEY,
        avg_sentiment REAL NOT NULL,
        article_count INTEGER NOT NULL,
        sentiment_std REAL NOT NULL
    )
"#;

/// Column names plus JSON-typed cells of an ad-hoc query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryResult {
    /// Plain-text table for log output.
    pub fn to_text_table(&self) -> String {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| r.iter().map(cell_text).collect())
            .collect();
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        for row in &cells {
            for (i, c) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(c.len());
                }
            }
        }
        let line = |vals: &[String]| -> String {
            vals.iter()
                .zip(&widths)
                .map(|(v, w)| format!("{v:>w$}"))
                .collect::<Vec<_>>()
                .join("  ")
        };
        let mut out = line(&self.columns);
        for row in &cells {
            out.push('\n');
            out.push_str(&line(row));
        }
        out
    }
}

fn cell_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{f:.3}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

pub struct SentimentStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl SentimentStore {
    /// Open for writing, creating the file (and its directory) when missing.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::StorageWrite(sqlx::Error::Io(e)))?;
        }
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::connect(opts, path)
            .await
            .map_err(PipelineError::StorageWrite)
    }

    /// Open an existing store; any write statement on this handle fails.
    pub async fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let opts = SqliteConnectOptions::new().filename(path).read_only(true);
        Self::connect(opts, path)
            .await
            .map_err(PipelineError::StorageQuery)
    }

    async fn connect(
        opts: SqliteConnectOptions,
        path: &Path,
    ) -> std::result::Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;
        tracing::debug!(target: "store", path = %path.display(), "sqlite opened");
        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Drop, recreate and fill both tables in a single transaction.
    pub async fn replace_all(
        &self,
        articles: &[CleanedArticle],
        daily: &[DailySummary],
    ) -> Result<()> {
        self.replace_all_inner(articles, daily)
            .await
            .map_err(PipelineError::StorageWrite)?;
        tracing::info!(
            target: "store",
            articles = articles.len(),
            daily_rows = daily.len(),
            path = %self.path.display(),
            "tables replaced"
        );
        Ok(())
    }

    async fn replace_all_inner(
        &self,
        articles: &[CleanedArticle],
        daily: &[DailySummary],
    ) -> std::result::Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DROP TABLE IF EXISTS tesla_esg")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DROP TABLE IF EXISTS daily_sentiment")
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_ARTICLES).execute(&mut *tx).await?;
        sqlx::query(CREATE_DAILY).execute(&mut *tx).await?;

        for a in articles {
            sqlx::query(
                r#"
                INSERT INTO tesla_esg
                (id, date, source, url, tone_raw, themes_raw, locations_raw,
                 sentiment_score, sentiment_category, year, month, day_of_week, primary_theme)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&a.article.id)
            .bind(a.date)
            .bind(&a.article.source)
            .bind(&a.article.url)
            .bind(a.article.tone.as_deref())
            .bind(a.article.themes.as_deref())
            .bind(a.article.locations.as_deref())
            .bind(a.sentiment_score)
            .bind(a.sentiment_category.label())
            .bind(a.year)
            .bind(a.month)
            .bind(a.day_name())
            .bind(&a.primary_theme)
            .execute(&mut *tx)
            .await?;
        }

        for d in daily {
            sqlx::query(
                "INSERT INTO daily_sentiment (date, avg_sentiment, article_count, sentiment_std) VALUES (?, ?, ?, ?)",
            )
            .bind(d.date)
            .bind(d.avg_sentiment)
            .bind(d.article_count as i64)
            .bind(d.sentiment_std)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Run arbitrary SQL, returning columns and JSON-converted cells.
    pub async fn query(&self, sql: &str) -> Result<QueryResult> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(PipelineError::StorageQuery)?;

        let columns = rows
            .first()
            .map(|r| r.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let rows = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| {
                        row.try_get_raw(i)
                            .ok()
                            .and_then(|raw| {
                                if raw.is_null() {
                                    return Some(serde_json::Value::Null);
                                }
                                row.try_get::<String, _>(i)
                                    .ok()
                                    .map(serde_json::Value::String)
                                    .or_else(|| row.try_get::<i64, _>(i).ok().map(|v| json!(v)))
                                    .or_else(|| row.try_get::<f64, _>(i).ok().map(|v| json!(v)))
                            })
                            .unwrap_or(serde_json::Value::Null)
                    })
                    .collect()
            })
            .collect();

        Ok(QueryResult { columns, rows })
    }

    pub async fn count(&self, table: Table) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(PipelineError::StorageQuery)
    }
}

/// Canned analysis queries, in report order.
pub const REPORT_QUERIES: [(&str, &str); 4] = [
    (
        "daily sentiment, last 30 days of coverage",
        r#"
        SELECT date,
               ROUND(AVG(sentiment_score), 3) AS avg_sentiment,
               COUNT(*) AS article_count,
               ROUND(MIN(sentiment_score), 3) AS min_sentiment,
               ROUND(MAX(sentiment_score), 3) AS max_sentiment
        FROM tesla_esg
        WHERE date >= date((SELECT MAX(date) FROM tesla_esg), '-30 days')
        GROUP BY date
        ORDER BY date DESC
        LIMIT 10
        "#,
    ),
    (
        "sentiment category breakdown",
        r#"
        SELECT sentiment_category,
               COUNT(*) AS article_count,
               ROUND(AVG(sentiment_score), 3) AS avg_score,
               ROUND(COUNT(*) * 100.0 / (SELECT COUNT(*) FROM tesla_esg), 2) AS percentage
        FROM tesla_esg
        GROUP BY sentiment_category
        ORDER BY avg_score
        "#,
    ),
    (
        "top news sources by article count",
        r#"
        SELECT source,
               COUNT(*) AS article_count,
               ROUND(AVG(sentiment_score), 3) AS avg_sentiment,
               ROUND(MIN(sentiment_score), 3) AS min_sentiment,
               ROUND(MAX(sentiment_score), 3) AS max_sentiment
        FROM tesla_esg
        GROUP BY source
        ORDER BY article_count DESC, source
        LIMIT 10
        "#,
    ),
    (
        "monthly trend",
        r#"
        SELECT strftime('%Y-%m', date) AS month,
               COUNT(*) AS article_count,
               ROUND(AVG(sentiment_score), 3) AS avg_sentiment,
               ROUND(SUM(CASE WHEN sentiment_score < 0 THEN 1 ELSE 0 END) * 100.0 / COUNT(*), 2)
                   AS negative_percentage
        FROM tesla_esg
        GROUP BY month
        ORDER BY month DESC
        LIMIT 12
        "#,
    ),
];

/// Run the canned queries and log each result as a text table.
pub async fn run_sql_report(store: &SentimentStore) -> Result<Vec<(&'static str, QueryResult)>> {
    let mut out = Vec::with_capacity(REPORT_QUERIES.len());
    for (title, sql) in REPORT_QUERIES {
        let res = store.query(sql).await?;
        tracing::info!(
            target: "store",
            query = title,
            rows = res.rows.len(),
            "\n{}",
            res.to_text_table()
        );
        out.push((title, res));
    }
    Ok(out)
}
