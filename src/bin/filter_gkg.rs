//! Extract one company's coverage from a raw GDELT GKG 2.1 file.
//!
//! Usage: `filter-gkg <input.gkg.csv> [output.csv] [company]`
//! Defaults: output `data/tesla_esg.csv`, company from config (`tesla`).

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use esg_sentiment_pipeline::config;
use esg_sentiment_pipeline::ingest::gkg::{filter_company, GkgLayout};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        bail!("usage: filter-gkg <input.gkg.csv> [output.csv] [company]");
    };
    let cfg = config::load_default()?;
    let output = args.next().map(PathBuf::from).unwrap_or(cfg.input_path);
    let company = args.next().unwrap_or(cfg.company);

    let reader = File::open(&input).with_context(|| format!("open {}", input.display()))?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let writer = File::create(&output).with_context(|| format!("create {}", output.display()))?;

    let stats = filter_company(
        BufReader::new(reader),
        BufWriter::new(writer),
        &company,
        &GkgLayout::default(),
    )?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        company = %company,
        scanned = stats.scanned,
        matched = stats.matched,
        short_rows = stats.short_rows,
        "GKG filter finished"
    );
    if stats.matched == 0 {
        tracing::warn!(company = %company, "no matching rows; output has only a header");
    }
    Ok(())
}
