// src/ingest/gkg.rs
//! Pre-stage: pull company coverage out of a raw GDELT GKG 2.1 dump.
//!
//! GKG files are tab-delimited, header-less and unquoted. A row is kept when
//! its theme list or organization list mentions the company (case-insensitive).
//! Output is the headed CSV the loader understands.

use anyhow::{Context, Result};
use regex::Regex;
use std::io::{Read, Write};

/// Column positions inside a GKG 2.1 row. Themes and locations point at the
/// V2 (offset-annotated) columns, not the V1 ones right before them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GkgLayout {
    pub record_id: usize,
    pub date: usize,
    pub source: usize,
    pub url: usize,
    pub themes: usize,
    pub locations: usize,
    pub organizations: usize,
    pub tone: usize,
}

impl Default for GkgLayout {
    fn default() -> Self {
        Self {
            record_id: 0,
            date: 1,
            source: 3,
            url: 4,
            themes: 8,
            locations: 10,
            organizations: 13,
            tone: 15,
        }
    }
}

impl GkgLayout {
    fn min_len(&self) -> usize {
        [
            self.record_id,
            self.date,
            self.source,
            self.url,
            self.themes,
            self.locations,
            self.organizations,
            self.tone,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

pub const OUTPUT_HEADER: [&str; 8] = [
    "GKGRECORDID",
    "DATE",
    "SourceCommonName",
    "DocumentIdentifier",
    "V2Themes",
    "V2Locations",
    "Organizations",
    "V2Tone",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub scanned: usize,
    pub matched: usize,
    pub short_rows: usize,
}

pub fn company_matcher(company: &str) -> Result<Regex> {
    Regex::new(&format!("(?i){}", regex::escape(company.trim())))
        .with_context(|| format!("building matcher for {company:?}"))
}

/// Stream `reader` (raw GKG) into `writer` (headed CSV), keeping company rows.
pub fn filter_company<R: Read, W: Write>(
    reader: R,
    writer: W,
    company: &str,
    layout: &GkgLayout,
) -> Result<FilterStats> {
    let matcher = company_matcher(company)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(OUTPUT_HEADER)?;

    let need = layout.min_len();
    let mut stats = FilterStats::default();

    for result in rdr.byte_records() {
        let rec = result.context("reading GKG row")?;
        stats.scanned += 1;
        if rec.len() < need {
            stats.short_rows += 1;
            continue;
        }
        // GKG dumps are not guaranteed to be valid UTF-8.
        let col = |i: usize| String::from_utf8_lossy(rec.get(i).unwrap_or_default()).into_owned();

        let themes = col(layout.themes);
        let orgs = col(layout.organizations);
        if !(matcher.is_match(&themes) || matcher.is_match(&orgs)) {
            continue;
        }
        stats.matched += 1;
        wtr.write_record([
            col(layout.record_id),
            col(layout.date),
            col(layout.source),
            col(layout.url),
            themes,
            col(layout.locations),
            orgs,
            col(layout.tone),
        ])?;
    }
    wtr.flush()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gkg_row(id: &str, themes: &str, orgs: &str, tone: &str) -> String {
        let mut cols = vec![String::new(); 16];
        cols[0] = id.into();
        cols[1] = "20250703120000".into();
        cols[3] = "example.com".into();
        cols[4] = format!("https://example.com/{id}");
        cols[7] = "V1_ONLY_THEME".into();
        cols[8] = themes.into();
        cols[13] = orgs.into();
        cols[15] = tone.into();
        cols.join("\t")
    }

    #[test]
    fn keeps_theme_or_org_matches_only() {
        let input = [
            gkg_row("a", "ECON_STOCKMARKET", "tesla inc;apple inc", "1.5,2,0.5"),
            gkg_row("b", "TAX_FNCACT", "apple inc", "-1,0,1"),
            gkg_row("c", "SOC_TESLA_RECALL", "", "0,0,0"),
            "short\trow".to_string(),
        ]
        .join("\n");

        let mut out = Vec::new();
        let stats =
            filter_company(input.as_bytes(), &mut out, "Tesla", &GkgLayout::default()).unwrap();
        assert_eq!(
            stats,
            FilterStats {
                scanned: 4,
                matched: 2,
                short_rows: 1
            }
        );

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("GKGRECORDID,DATE"));
        assert!(lines[1].starts_with("a,20250703120000,example.com"));
        // tone contains commas, so it is quoted in the CSV output
        assert!(lines[1].ends_with("\"1.5,2,0.5\""));
        assert!(lines[2].starts_with("c,"));
    }

    #[test]
    fn v2_columns_land_under_v2_headers() {
        let mut cols = vec![String::new(); 16];
        cols[0] = "x".into();
        cols[7] = "TESLA_V1".into();
        cols[8] = "TESLA_V2,120".into();
        cols[9] = "1#France#FR".into();
        cols[10] = "1#France#FR#FR##46#2#FR#88".into();
        let input = cols.join("\t");

        let mut out = Vec::new();
        filter_company(input.as_bytes(), &mut out, "tesla", &GkgLayout::default()).unwrap();

        let mut rdr = csv::Reader::from_reader(out.as_slice());
        let headers = rdr.headers().unwrap().clone();
        let row = rdr.records().next().unwrap().unwrap();
        let get = |name: &str| {
            let i = headers.iter().position(|h| h == name).unwrap();
            row.get(i).unwrap().to_string()
        };
        assert_eq!(get("V2Themes"), "TESLA_V2,120");
        assert_eq!(get("V2Locations"), "1#France#FR#FR##46#2#FR#88");
    }
}
