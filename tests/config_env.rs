// tests/config_env.rs
use esg_sentiment_pipeline::config::{
    load_default, load_from, ENV_CONFIG_PATH, ENV_DB_PATH, ENV_INPUT_PATH, ENV_OUTPUT_DIR,
    ENV_SYNTHETIC_SEED,
};
use std::path::PathBuf;
use std::{env, fs};

fn clear_env() {
    for k in [
        ENV_CONFIG_PATH,
        ENV_INPUT_PATH,
        ENV_DB_PATH,
        ENV_OUTPUT_DIR,
        ENV_SYNTHETIC_SEED,
    ] {
        env::remove_var(k);
    }
}

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("pipeline.toml");
    fs::write(
        &p_toml,
        r#"
db_path = "store/esg.db"
render_plots = false

[rolling]
short = 0
long = 14
"#,
    )
    .unwrap();
    let c = load_from(&p_toml).unwrap();
    assert_eq!(c.db_path, PathBuf::from("store/esg.db"));
    assert!(!c.render_plots);
    assert_eq!(c.rolling.short, 1);
    assert_eq!(c.rolling.long, 14);

    let p_json = dir.path().join("pipeline.json");
    fs::write(&p_json, r#"{"company": "TESLA", "top_n_themes": 5}"#).unwrap();
    let cj = load_from(&p_json).unwrap();
    assert_eq!(cj.company, "tesla");
    assert_eq!(cj.top_n_themes, 5);

    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "rolling = [").unwrap();
    assert!(load_from(&bad).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) nothing at all → defaults
    let d = load_default().unwrap();
    assert_eq!(d.synthetic.seed, 42);
    assert_eq!(d.input_path, PathBuf::from("data/tesla_esg.csv"));

    // 2) ./config/pipeline.toml
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("pipeline.toml"), "top_n_themes = 3\n").unwrap();
    assert_eq!(load_default().unwrap().top_n_themes, 3);

    // 3) env path wins over the fallback file
    let p_env = tmp.path().join("other.json");
    fs::write(&p_env, r#"{"top_n_themes": 8}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(load_default().unwrap().top_n_themes, 8);

    // 4) env path must exist
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml"));
    assert!(load_default().is_err());
    env::remove_var(ENV_CONFIG_PATH);

    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn field_overrides_apply_on_top() {
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    env::set_var(ENV_INPUT_PATH, "in/gkg.csv");
    env::set_var(ENV_DB_PATH, "  ");
    env::set_var(ENV_OUTPUT_DIR, "out");
    env::set_var(ENV_SYNTHETIC_SEED, "1234");
    let c = load_default().unwrap();
    assert_eq!(c.input_path, PathBuf::from("in/gkg.csv"));
    // blank values are ignored
    assert_eq!(c.db_path, PathBuf::from("tesla_esg.db"));
    assert_eq!(c.bi_export_path(), PathBuf::from("out/tesla_esg_cleaned_for_bi.csv"));
    assert_eq!(c.synthetic.seed, 1234);

    env::set_var(ENV_SYNTHETIC_SEED, "not-a-number");
    assert!(load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}
