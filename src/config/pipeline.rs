// src/config/pipeline.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_seed() -> u64 {
    42
}

/// Everything a run needs, passed explicitly to each stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Company the coverage is about; used by the GKG filter and in log output.
    pub company: String,
    pub input_path: PathBuf,
    pub db_path: PathBuf,
    pub output_dir: PathBuf,
    pub bi_export_file: String,
    pub summary_file: String,
    pub plots_dir: PathBuf,
    pub render_plots: bool,
    /// Run the canned SQL queries against the freshly written store.
    pub sql_report: bool,
    /// Write Prometheus text exposition here at the end of a run.
    pub metrics_path: Option<PathBuf>,
    pub top_n_themes: usize,
    pub rolling: RollingWindows,
    pub synthetic: SyntheticConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollingWindows {
    pub short: usize,
    pub long: usize,
}

impl Default for RollingWindows {
    fn default() -> Self {
        Self { short: 7, long: 30 }
    }
}

/// Shape of the fallback dataset used when the input file is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rows: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            start: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap_or_default(),
            rows: 1_300,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            company: "tesla".to_string(),
            input_path: PathBuf::from("data/tesla_esg.csv"),
            db_path: PathBuf::from("tesla_esg.db"),
            output_dir: PathBuf::from("."),
            bi_export_file: "tesla_esg_cleaned_for_bi.csv".to_string(),
            summary_file: "tesla_esg_summary_stats.csv".to_string(),
            plots_dir: PathBuf::from("artifacts/plots"),
            render_plots: true,
            sql_report: true,
            metrics_path: None,
            top_n_themes: 10,
            rolling: RollingWindows::default(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn bi_export_path(&self) -> PathBuf {
        self.output_dir.join(&self.bi_export_file)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(&self.summary_file)
    }

    /// Convenience for tests and one-off runs: every output under `dir`.
    pub fn rooted_at(dir: &Path) -> Self {
        Self {
            input_path: dir.join("tesla_esg.csv"),
            db_path: dir.join("tesla_esg.db"),
            output_dir: dir.to_path_buf(),
            plots_dir: dir.join("plots"),
            ..Self::default()
        }
    }

    /// Clamp values that would make a stage meaningless.
    pub fn sanitize(mut self) -> Self {
        self.top_n_themes = self.top_n_themes.max(1);
        self.rolling.short = self.rolling.short.max(1);
        self.rolling.long = self.rolling.long.max(1);
        if self.synthetic.start > self.synthetic.end {
            // keep a valid interval
            std::mem::swap(&mut self.synthetic.start, &mut self.synthetic.end);
        }
        self.company = self.company.trim().to_ascii_lowercase();
        if self.company.is_empty() {
            self.company = "tesla".to_string();
        }
        self
    }
}
