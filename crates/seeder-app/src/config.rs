use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use sensor_client::ClientConfig;

const DEFAULT_DISTRICTS_PATH: &str = "data/districts.json";

#[derive(Clone, Debug, PartialEq)]
pub struct SeederConfig {
    pub api: ClientConfig,
    pub districts_path: PathBuf,
    pub assume_yes: bool,
    pub dry_run: bool,
    pub rng_seed: Option<u64>,
}

impl SeederConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_path(None)
    }

    pub fn load_with_path(config_path: Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(file_config) = load_file_config(config_path.as_deref())? {
            apply_file_config(&mut config, file_config);
        }

        apply_env_overrides(&mut config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            anyhow::bail!("api.base_url must be non-empty");
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            anyhow::bail!("api.base_url must start with http:// or https://");
        }
        if self.api.timeout_ms == 0 {
            anyhow::bail!("api.timeout_ms must be >= 1");
        }
        if self.districts_path.as_os_str().is_empty() {
            anyhow::bail!("seed.districts_path must be non-empty");
        }
        Ok(())
    }
}

impl Default for SeederConfig {
    fn default() -> Self {
        Self {
            api: ClientConfig::default(),
            districts_path: PathBuf::from(DEFAULT_DISTRICTS_PATH),
            assume_yes: false,
            dry_run: false,
            rng_seed: None,
        }
    }
}

fn apply_env_overrides(config: &mut SeederConfig) {
    if let Ok(value) = env::var("API_BASE_URL") {
        config.api.base_url = value;
    }

    if let Some(timeout_ms) = parse_env_u64("SEEDER_TIMEOUT_MS") {
        config.api.timeout_ms = timeout_ms;
    }

    if let Ok(value) = env::var("SEEDER_DISTRICTS") {
        config.districts_path = PathBuf::from(value);
    }

    config.assume_yes = parse_env_bool("SEEDER_ASSUME_YES").unwrap_or(config.assume_yes);
    config.dry_run = parse_env_bool("SEEDER_DRY_RUN").unwrap_or(config.dry_run);
    config.rng_seed = parse_env_u64("SEEDER_RNG_SEED").or(config.rng_seed);
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    api: Option<FileApiConfig>,
    seed: Option<FileSeedConfig>,
}

#[derive(Debug, Deserialize)]
struct FileApiConfig {
    base_url: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct FileSeedConfig {
    districts_path: Option<String>,
    assume_yes: Option<bool>,
    dry_run: Option<bool>,
    rng_seed: Option<u64>,
}

fn load_file_config(config_path: Option<&str>) -> Result<Option<FileConfig>> {
    let path = match config_path {
        Some(path) => path.to_string(),
        None => match env::var("SEEDER_CONFIG") {
            Ok(value) => value,
            Err(_) => return Ok(None),
        },
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("read config file {path}"))?;
    let ext = Path::new(&path).extension().and_then(|value| value.to_str());

    let config = match ext {
        Some("json") => serde_json::from_str(&content).context("parse json config")?,
        _ => toml::from_str(&content).context("parse toml config")?,
    };

    Ok(Some(config))
}

fn apply_file_config(config: &mut SeederConfig, file: FileConfig) {
    if let Some(api) = file.api {
        if let Some(base_url) = api.base_url {
            config.api.base_url = base_url;
        }
        if let Some(timeout_ms) = api.timeout_ms {
            config.api.timeout_ms = timeout_ms;
        }
    }

    if let Some(seed) = file.seed {
        if let Some(path) = seed.districts_path {
            config.districts_path = PathBuf::from(path);
        }
        if let Some(assume_yes) = seed.assume_yes {
            config.assume_yes = assume_yes;
        }
        if let Some(dry_run) = seed.dry_run {
            config.dry_run = dry_run;
        }
        if let Some(rng_seed) = seed.rng_seed {
            config.rng_seed = Some(rng_seed);
        }
    }
}

fn parse_env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|value| value.parse().ok())
}

fn parse_env_bool(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|value| match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    })
}
