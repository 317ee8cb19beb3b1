// src/config/mod.rs
pub mod pipeline;

pub use pipeline::{PipelineConfig, RollingWindows, SyntheticConfig};

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "ESG_PIPELINE_CONFIG";
pub const ENV_INPUT_PATH: &str = "ESG_INPUT_PATH";
pub const ENV_DB_PATH: &str = "ESG_DB_PATH";
pub const ENV_OUTPUT_DIR: &str = "ESG_OUTPUT_DIR";
pub const ENV_SYNTHETIC_SEED: &str = "ESG_SYNTHETIC_SEED";

/// Load configuration from an explicit path. Supports TOML or JSON formats.
pub fn load_from(path: &Path) -> Result<PipelineConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading pipeline config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing pipeline config {}", path.display()))?;
    Ok(cfg.sanitize())
}

/// Load configuration using env var + fallbacks:
/// 1) $ESG_PIPELINE_CONFIG
/// 2) config/pipeline.toml
/// 3) config/pipeline.json
/// 4) built-in defaults
///
/// Per-field env overrides are applied on top of whichever source won.
pub fn load_default() -> Result<PipelineConfig> {
    let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        load_from(&pb)?
    } else {
        let toml_p = PathBuf::from("config/pipeline.toml");
        let json_p = PathBuf::from("config/pipeline.json");
        if toml_p.exists() {
            load_from(&toml_p)?
        } else if json_p.exists() {
            load_from(&json_p)?
        } else {
            PipelineConfig::default()
        }
    };
    apply_env_overrides(base)
}

fn apply_env_overrides(mut cfg: PipelineConfig) -> Result<PipelineConfig> {
    if let Some(v) = env_non_empty(ENV_INPUT_PATH) {
        cfg.input_path = PathBuf::from(v);
    }
    if let Some(v) = env_non_empty(ENV_DB_PATH) {
        cfg.db_path = PathBuf::from(v);
    }
    if let Some(v) = env_non_empty(ENV_OUTPUT_DIR) {
        cfg.output_dir = PathBuf::from(v);
    }
    if let Some(v) = env_non_empty(ENV_SYNTHETIC_SEED) {
        cfg.synthetic.seed = v
            .parse()
            .with_context(|| format!("{ENV_SYNTHETIC_SEED}={v} is not an unsigned integer"))?;
    }
    Ok(cfg.sanitize())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<PipelineConfig> {
    if hint_ext == "json" {
        return Ok(serde_json::from_str(s)?);
    }
    // TOML first, JSON as a fallback for extension-less files.
    match toml::from_str::<PipelineConfig>(s) {
        Ok(v) => Ok(v),
        Err(toml_err) => serde_json::from_str(s).map_err(|_| anyhow!(toml_err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = parse_config(
            r#"
company = " Tesla "
top_n_themes = 0

[rolling]
short = 5
"#,
            "toml",
        )
        .unwrap()
        .sanitize();
        assert_eq!(cfg.company, "tesla");
        assert_eq!(cfg.top_n_themes, 1);
        assert_eq!(cfg.rolling.short, 5);
        assert_eq!(cfg.rolling.long, 30);
        assert_eq!(cfg.synthetic.seed, 42);
    }

    #[test]
    fn json_config_parses() {
        let cfg = parse_config(
            r#"{"db_path": "x.db", "synthetic": {"seed": 7, "rows": 10}}"#,
            "json",
        )
        .unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("x.db"));
        assert_eq!(cfg.synthetic.seed, 7);
        assert_eq!(cfg.synthetic.rows, 10);
    }

    #[test]
    fn inverted_synthetic_range_is_swapped() {
        let mut cfg = PipelineConfig::default();
        std::mem::swap(&mut cfg.synthetic.start, &mut cfg.synthetic.end);
        let cfg = cfg.sanitize();
        assert!(cfg.synthetic.start < cfg.synthetic.end);
    }
}
