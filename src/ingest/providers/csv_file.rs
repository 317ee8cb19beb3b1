// src/ingest/providers/csv_file.rs
use async_trait::async_trait;
use csv::StringRecord;
use metrics::{counter, histogram};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::ingest::record_id;
use crate::ingest::types::{Article, ArticleSource};

// Header aliases, most specific first. Matching is case-insensitive.
const DATE_COLS: &[&str] = &["SQLDATE", "DATE", "V21DATE", "published"];
const SOURCE_COLS: &[&str] = &[
    "SourceCommonName",
    "SourceCollectionIdentifier",
    "source",
];
const URL_COLS: &[&str] = &["DocumentIdentifier", "url"];
const TONE_COLS: &[&str] = &["V2Tone", "V15Tone", "Tone"];
const THEME_COLS: &[&str] = &["V2Themes", "V1Themes", "Themes"];
const LOCATION_COLS: &[&str] = &["V2Locations", "V1Locations", "Locations"];
const ORG_COLS: &[&str] = &["Organizations", "V1Organizations", "V2Organizations"];
const ID_COLS: &[&str] = &["GKGRECORDID", "id"];

/// Column positions resolved from a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub tone: usize,
    pub source: Option<usize>,
    pub url: Option<usize>,
    pub themes: Option<usize>,
    pub locations: Option<usize>,
    pub organizations: Option<usize>,
    pub id: Option<usize>,
}

impl ColumnMap {
    /// Resolve positions; `Err` names the first required column that is absent.
    pub fn from_headers(headers: &StringRecord) -> std::result::Result<Self, String> {
        let find = |aliases: &[&str]| -> Option<usize> {
            aliases.iter().find_map(|alias| {
                headers
                    .iter()
                    .position(|h| h.trim().eq_ignore_ascii_case(alias))
            })
        };

        let date = find(DATE_COLS).ok_or_else(|| format!("no date column (expected one of {DATE_COLS:?})"))?;
        let tone = find(TONE_COLS).ok_or_else(|| format!("no tone column (expected one of {TONE_COLS:?})"))?;

        Ok(Self {
            date,
            tone,
            source: find(SOURCE_COLS),
            url: find(URL_COLS),
            themes: find(THEME_COLS),
            locations: find(LOCATION_COLS),
            organizations: find(ORG_COLS),
            id: find(ID_COLS),
        })
    }
}

fn field(rec: &StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| rec.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a headed CSV document into articles.
///
/// Structural problems (bad header, ragged rows, invalid UTF-8) are fatal;
/// empty or garbled individual fields are kept as-is for the deriver to judge.
pub fn parse_articles(bytes: &[u8], origin: &Path) -> Result<Vec<Article>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::malformed(origin, e))?
        .clone();
    let cols = ColumnMap::from_headers(&headers).map_err(|r| PipelineError::malformed(origin, r))?;

    let mut out = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let rec = result.map_err(|e| PipelineError::malformed(origin, e))?;
        let url = field(&rec, cols.url).unwrap_or_default();
        let id = record_id(field(&rec, cols.id).as_deref(), &url, row);
        out.push(Article {
            id,
            published: field(&rec, Some(cols.date)),
            source: field(&rec, cols.source).unwrap_or_else(|| "unknown".to_string()),
            url,
            tone: field(&rec, Some(cols.tone)),
            themes: field(&rec, cols.themes),
            locations: field(&rec, cols.locations),
            organizations: field(&rec, cols.organizations),
        });
    }
    Ok(out)
}

/// Articles from a delimited file on disk (the filtered GDELT export).
pub struct CsvSource {
    pub path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ArticleSource for CsvSource {
    async fn fetch_all(&self) -> Result<Vec<Article>> {
        let t0 = std::time::Instant::now();

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::SourceUnavailable(self.path.clone()));
            }
            Err(e) => return Err(PipelineError::Io(e)),
        };
        let out = parse_articles(&bytes, &self.path)?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("esg_stage_ms", "stage" => "load").record(ms);
        counter!("esg_records_loaded_total").increment(out.len() as u64);

        tracing::info!(
            target: "ingest",
            path = %self.path.display(),
            rows = out.len(),
            "dataset loaded"
        );
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "SQLDATE,V2Themes,Organizations,V2Tone,SourceCollectionIdentifier,DocumentIdentifier";

    #[test]
    fn header_aliases_are_case_insensitive() {
        let h = StringRecord::from(vec!["date", "v2tone", "URL"]);
        let m = ColumnMap::from_headers(&h).unwrap();
        assert_eq!(m.date, 0);
        assert_eq!(m.tone, 1);
        assert_eq!(m.url, Some(2));
        assert_eq!(m.themes, None);
    }

    #[test]
    fn missing_tone_column_is_malformed() {
        let doc = "SQLDATE,DocumentIdentifier\n20250703,https://x.test/a\n";
        let err = parse_articles(doc.as_bytes(), Path::new("in.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedSource { .. }));
    }

    #[test]
    fn ragged_row_is_malformed() {
        let doc = format!("{HEADER}\n20250703,A;B\n");
        let err = parse_articles(doc.as_bytes(), Path::new("in.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedSource { .. }));
    }

    #[test]
    fn quoted_tone_and_blank_fields() {
        let doc = format!(
            "{HEADER}\n20250703,ECON_STOCKMARKET;TAX_FNCACT,tesla inc,\"-2.43,1.45,3.88\",pr-inside.com,https://x.test/a\n20250704,,,,,\n"
        );
        let arts = parse_articles(doc.as_bytes(), Path::new("in.csv")).unwrap();
        assert_eq!(arts.len(), 2);
        assert_eq!(arts[0].tone.as_deref(), Some("-2.43,1.45,3.88"));
        assert_eq!(arts[0].source, "pr-inside.com");
        assert_eq!(arts[1].tone, None);
        assert_eq!(arts[1].themes, None);
        assert_eq!(arts[1].source, "unknown");
        assert_eq!(arts[1].id, "row-1");
    }
}
