use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use cavity_detector::config::AppConfig;
use cavity_detector::diagnosis::message::Language;
use tempfile::NamedTempFile;

static ENV_LOCK: Mutex<()> = Mutex::new(());

const KEYS: [&str; 7] = [
    "CAVITY_CONFIG",
    "CAVITY_API_URL",
    "CAVITY_MODEL_ID",
    "CAVITY_API_KEY",
    "CAVITY_RECORDS_PATH",
    "CAVITY_FOCUS_RADIUS",
    "CAVITY_LANGUAGE",
];

fn clear_env() {
    for key in KEYS {
        // SAFETY: every test touching the environment holds ENV_LOCK.
        unsafe { std::env::remove_var(key) };
    }
}

fn set_env(key: &str, value: &str) {
    // SAFETY: every test touching the environment holds ENV_LOCK.
    unsafe { std::env::set_var(key, value) };
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    write!(
        file,
        r#"
        [inference]
        model_id = "cavity-73rfa/4"
        api_key = "from-file"

        [focus]
        radius = 80.0

        [records]
        path = "clinic.csv"
        "#
    )
    .expect("write config");

    set_env("CAVITY_CONFIG", file.path().to_str().unwrap());
    set_env("CAVITY_API_KEY", "from-env");
    set_env("CAVITY_LANGUAGE", "hi");

    let cfg = AppConfig::load(None).expect("load config");
    assert_eq!(cfg.inference.model_id, "cavity-73rfa/4");
    assert_eq!(cfg.inference.api_key.as_deref(), Some("from-env"));
    assert_eq!(cfg.focus_radius, 80.0);
    assert_eq!(cfg.records_path, PathBuf::from("clinic.csv"));
    assert_eq!(cfg.language, Language::Hindi);

    clear_env();
}

#[test]
fn explicit_path_wins_over_env_path() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    write!(file, "[focus]\nradius = 42.0\n").expect("write config");
    set_env("CAVITY_CONFIG", "/does/not/exist.toml");

    let cfg = AppConfig::load(Some(file.path())).expect("load config");
    assert_eq!(cfg.focus_radius, 42.0);

    clear_env();
}

#[test]
fn invalid_env_radius_is_rejected() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    set_env("CAVITY_FOCUS_RADIUS", "wide");
    assert!(AppConfig::load(None).is_err());
    set_env("CAVITY_FOCUS_RADIUS", "-1");
    assert!(AppConfig::load(None).is_err());

    clear_env();
}

#[test]
fn missing_config_file_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    set_env("CAVITY_CONFIG", "/does/not/exist.toml");
    assert!(AppConfig::load(None).is_err());

    clear_env();
}
