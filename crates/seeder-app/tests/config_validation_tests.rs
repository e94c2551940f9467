use std::env;
use std::path::PathBuf;
use std::sync::Mutex;

use seeder_app::SeederConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

const SEEDER_VARS: [&str; 7] = [
    "SEEDER_CONFIG",
    "API_BASE_URL",
    "SEEDER_TIMEOUT_MS",
    "SEEDER_DISTRICTS",
    "SEEDER_ASSUME_YES",
    "SEEDER_DRY_RUN",
    "SEEDER_RNG_SEED",
];

fn clear_env() {
    for key in SEEDER_VARS {
        env::remove_var(key);
    }
}

#[test]
fn defaults_validate() {
    let _guard = ENV_LOCK.lock().expect("env lock");
    clear_env();

    let config = SeederConfig::load().expect("load config");
    config.validate().expect("validate config");
    assert_eq!(config.api.base_url, "http://localhost:8080/api/v1");
    assert_eq!(config.api.timeout_ms, 10_000);
    assert_eq!(config.districts_path, PathBuf::from("data/districts.json"));
    assert!(!config.assume_yes);
    assert_eq!(config.rng_seed, None);
}

#[test]
fn toml_config_validates() {
    let _guard = ENV_LOCK.lock().expect("env lock");
    clear_env();
    env::set_var("SEEDER_CONFIG", fixture_path("seeder-valid.toml"));

    let config = SeederConfig::load().expect("load config");
    config.validate().expect("validate config");
    assert_eq!(config.api.base_url, "http://sensors.internal:8080/api/v1");
    assert_eq!(config.api.timeout_ms, 5_000);
    assert!(config.assume_yes);
    assert_eq!(config.rng_seed, Some(1234));

    clear_env();
}

#[test]
fn json_config_validates() {
    let _guard = ENV_LOCK.lock().expect("env lock");
    clear_env();

    let config =
        SeederConfig::load_with_path(Some(fixture_path("seeder-valid.json"))).expect("load config");
    config.validate().expect("validate config");
    assert!(config.dry_run);
    assert_eq!(config.api.base_url, "https://energy.example.org/api/v1/");
}

#[test]
fn env_overrides_file_values() {
    let _guard = ENV_LOCK.lock().expect("env lock");
    clear_env();
    env::set_var("SEEDER_CONFIG", fixture_path("seeder-valid.toml"));
    env::set_var("API_BASE_URL", "http://10.0.0.5:9000/api/v1");
    env::set_var("SEEDER_TIMEOUT_MS", "2500");
    env::set_var("SEEDER_ASSUME_YES", "false");
    env::set_var("SEEDER_RNG_SEED", "not-a-number");

    let config = SeederConfig::load().expect("load config");
    assert_eq!(config.api.base_url, "http://10.0.0.5:9000/api/v1");
    assert_eq!(config.api.timeout_ms, 2_500);
    assert!(!config.assume_yes);
    // unparsable values leave the file setting in place
    assert_eq!(config.rng_seed, Some(1234));

    clear_env();
}

#[test]
fn invalid_config_fails_validation() {
    let _guard = ENV_LOCK.lock().expect("env lock");
    clear_env();
    env::set_var("SEEDER_CONFIG", fixture_path("seeder-invalid.toml"));

    let config = SeederConfig::load().expect("load config");
    assert!(config.validate().is_err());

    clear_env();
}

#[test]
fn base_url_without_http_scheme_fails_validation() {
    let _guard = ENV_LOCK.lock().expect("env lock");
    clear_env();
    env::set_var("API_BASE_URL", "localhost:8080/api/v1");

    let config = SeederConfig::load().expect("load config");
    let err = config.validate().expect_err("scheme required");
    assert!(err.to_string().contains("http://"));

    clear_env();
}

#[test]
fn missing_config_file_is_an_error() {
    let _guard = ENV_LOCK.lock().expect("env lock");
    clear_env();

    let result = SeederConfig::load_with_path(Some(fixture_path("does-not-exist.toml")));
    assert!(result.is_err());
}

fn fixture_path(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path.to_string_lossy().to_string()
}
