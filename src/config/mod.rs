use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub processing: ProcessingConfig,
}

/// Where inputs live and outputs go
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Cached raw game pages, one HTML file per game (written by the downloader).
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,

    /// Per-game JSON records, partitioned by division.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Schedule catalog produced by the schedule-discovery component.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Player alias groups (raw spellings → canonical name).
    #[serde(default = "default_aliases_path")]
    pub aliases_path: PathBuf,

    /// Optional event-pattern catalog override; built-in catalog when unset.
    #[serde(default)]
    pub patterns_path: Option<PathBuf>,
}

/// Processing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessingConfig {
    /// Log a progress line every N games.
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_raw_dir() -> PathBuf {
    PathBuf::from("full-game-stats-raw")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("full-game-stats-output")
}
fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/game-schedule.json")
}
fn default_aliases_path() -> PathBuf {
    PathBuf::from("data/player-aliases.json")
}
fn default_progress_every() -> usize {
    50
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("FLBB").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|_| AppConfig::default());
        Ok(app_cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                raw_dir: default_raw_dir(),
                output_dir: default_output_dir(),
                catalog_path: default_catalog_path(),
                aliases_path: default_aliases_path(),
                patterns_path: None,
            },
            processing: ProcessingConfig {
                progress_every: default_progress_every(),
            },
        }
    }
}
