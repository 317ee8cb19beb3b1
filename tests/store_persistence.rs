// tests/store_persistence.rs
use esg_sentiment_pipeline::aggregate::daily_summary;
use esg_sentiment_pipeline::analyze::derive_all;
use esg_sentiment_pipeline::clean::clean;
use esg_sentiment_pipeline::store::{run_sql_report, SentimentStore, Table};
use esg_sentiment_pipeline::{Article, PipelineError};

fn article(id: &str, date: &str, tone: &str, source: &str) -> Article {
    Article {
        id: id.into(),
        published: Some(date.into()),
        source: source.into(),
        url: format!("https://{source}/{id}"),
        tone: Some(tone.into()),
        themes: Some("ECON_STOCKMARKET,10;LEGISLATION".into()),
        locations: Some("1#United States#US#US##39#-98#US".into()),
        organizations: None,
    }
}

fn sample() -> Vec<Article> {
    vec![
        article("1", "20250601", "-3.1,1,4", "reuters.com"),
        article("2", "20250601", "1.2,2,1", "cnbc.com"),
        article("3", "20250615", "0.4,1,1", "reuters.com"),
        article("4", "20250702", "2.2,3,1", "bloomberg.com"),
    ]
}

#[tokio::test]
async fn rerun_replaces_instead_of_appending() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("db/tesla_esg.db");
    let (derived, _) = derive_all(sample());
    let cleaned = clean(derived).kept;
    let daily = daily_summary(&cleaned);

    let mut daily_totals = Vec::new();
    for _ in 0..2 {
        let db = SentimentStore::open(&path).await.unwrap();
        db.replace_all(&cleaned, &daily).await.unwrap();
        db.close().await;

        let ro = SentimentStore::open_read_only(&path).await.unwrap();
        let r = ro
            .query(
                "SELECT SUM(avg_sentiment), SUM(sentiment_std), SUM(article_count) FROM daily_sentiment",
            )
            .await
            .unwrap();
        daily_totals.push(r.rows[0].clone());
        ro.close().await;
    }
    // second run leaves the rollup values exactly as the first one did
    assert_eq!(daily_totals[0], daily_totals[1]);
    assert_eq!(daily_totals[0][2], serde_json::json!(4));
    let expected_avg: f64 = daily.iter().map(|d| d.avg_sentiment).sum();
    assert!((daily_totals[0][0].as_f64().unwrap() - expected_avg).abs() < 1e-9);

    let db = SentimentStore::open_read_only(&path).await.unwrap();
    assert_eq!(db.count(Table::Articles).await.unwrap(), 4);
    assert_eq!(db.count(Table::Daily).await.unwrap(), 3);

    let r = db
        .query("SELECT id, date, sentiment_category, day_of_week, primary_theme, month FROM tesla_esg ORDER BY id")
        .await
        .unwrap();
    assert_eq!(
        r.columns,
        ["id", "date", "sentiment_category", "day_of_week", "primary_theme", "month"]
    );
    assert_eq!(r.rows[0][1], serde_json::json!("2025-06-01"));
    assert_eq!(r.rows[0][2], serde_json::json!("Very Negative"));
    assert_eq!(r.rows[0][3], serde_json::json!("Sunday"));
    assert_eq!(r.rows[0][4], serde_json::json!("ECON_STOCKMARKET"));
    assert_eq!(r.rows[0][5], serde_json::json!(6));
    db.close().await;
}

#[tokio::test]
async fn read_only_handle_rejects_writes() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("ro.db");
    let (derived, _) = derive_all(sample());
    let cleaned = clean(derived).kept;
    let daily = daily_summary(&cleaned);

    let db = SentimentStore::open(&path).await.unwrap();
    db.replace_all(&cleaned, &daily).await.unwrap();
    db.close().await;

    let ro = SentimentStore::open_read_only(&path).await.unwrap();
    let err = ro.query("DELETE FROM tesla_esg").await.unwrap_err();
    assert!(matches!(err, PipelineError::StorageQuery(_)));
    assert_eq!(err.exit_code(), 3);
    assert!(matches!(
        ro.replace_all(&cleaned, &daily).await,
        Err(PipelineError::StorageWrite(_))
    ));
    assert_eq!(ro.count(Table::Articles).await.unwrap(), 4);
    ro.close().await;
}

#[tokio::test]
async fn unusable_db_directory_is_a_storage_error() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("not_a_dir");
    std::fs::write(&blocker, "file in the way").unwrap();

    let err = match SentimentStore::open(blocker.join("tesla_esg.db")).await {
        Ok(_) => panic!("open should fail when the parent is a file"),
        Err(e) => e,
    };
    assert!(matches!(err, PipelineError::StorageWrite(_)));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn read_only_open_of_missing_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let res = SentimentStore::open_read_only(tmp.path().join("nope.db")).await;
    assert!(matches!(res, Err(PipelineError::StorageQuery(_))));
}

#[tokio::test]
async fn canned_report_runs_all_queries() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("report.db");
    let (derived, _) = derive_all(sample());
    let cleaned = clean(derived).kept;
    let daily = daily_summary(&cleaned);

    let db = SentimentStore::open(&path).await.unwrap();
    db.replace_all(&cleaned, &daily).await.unwrap();

    let results = run_sql_report(&db).await.unwrap();
    assert_eq!(results.len(), 4);

    // last 30 days relative to 2025-07-02: 2025-06-15 and 2025-07-02
    let (_, recent) = &results[0];
    assert_eq!(recent.rows.len(), 2);
    assert_eq!(recent.rows[0][0], serde_json::json!("2025-07-02"));

    let (_, sources) = &results[2];
    assert_eq!(sources.rows[0][0], serde_json::json!("reuters.com"));
    assert_eq!(sources.rows[0][1], serde_json::json!(2));

    let (_, monthly) = &results[3];
    assert_eq!(monthly.rows[0][0], serde_json::json!("2025-07"));
    let neg = monthly.rows[1][3].as_f64().unwrap();
    assert!((neg - 33.33).abs() < 1e-9);
    db.close().await;
}
