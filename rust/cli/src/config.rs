//! Session configuration: a TOML file named by `DOUDIZHU_CONFIG` plus
//! per-field environment overrides. The ledger directory is always an
//! explicit value handed to the engine, never discovered at runtime.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub ledger_dir: PathBuf,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_dir: PathBuf::from("./ledger"),
            seed: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "config parse error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    ledger_dir: Option<PathBuf>,
    #[serde(default)]
    seed: Option<u64>,
}

/// Resolve the effective configuration: defaults, then the file named by
/// `DOUDIZHU_CONFIG`, then `DOUDIZHU_LEDGER_DIR` / `DOUDIZHU_SEED`.
pub fn load() -> Result<Config, ConfigError> {
    let mut cfg = Config::default();

    if let Ok(path) = std::env::var("DOUDIZHU_CONFIG") {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.ledger_dir {
            cfg.ledger_dir = v;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
        }
    }

    if let Ok(dir) = std::env::var("DOUDIZHU_LEDGER_DIR") {
        if !dir.is_empty() {
            cfg.ledger_dir = PathBuf::from(dir);
        }
    }
    if let Ok(seed) = std::env::var("DOUDIZHU_SEED") {
        if !seed.is_empty() {
            cfg.seed = Some(
                seed.parse()
                    .map_err(|_| ConfigError::Invalid("seed must be an integer".into()))?,
            );
        }
    }

    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.ledger_dir.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("ledger_dir must not be empty".into()));
    }
    Ok(())
}
