// Configuration loading and parsing (config/dugout.toml).

use chrono::Datelike;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

/// Name of the config file inside `config/` (and `defaults/`).
pub const CONFIG_FILE: &str = "dugout.toml";

/// MLB headshot with a generic fallback image for unknown ids.
pub const DEFAULT_IMAGE_URL_TEMPLATE: &str = "https://img.mlbstatic.com/mlb-photos/image/upload/d_people:generic:headshot:67:current.png/w_213,q_auto:best/v1/people/{id}/headshot/67/current";

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub seasons: SeasonsConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub data: DataPaths,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file. When omitted, a `dugout.db` in the platform data
    /// directory is used.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Minimum weighted-ratio score (0-100) for a name to count as a match.
    #[serde(default = "default_score_cutoff")]
    pub score_cutoff: f64,
    /// Player image URL; `{id}` is replaced with the MLBAM id.
    #[serde(default = "default_image_url_template")]
    pub image_url_template: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonsConfig {
    /// Earliest season pulled in by ingestion.
    #[serde(default = "default_first_year")]
    pub first_year: u16,
    /// Most recent ingested season. A player whose last season equals this
    /// year is reported as active ("2019-Present").
    #[serde(default = "default_current_year")]
    pub current_year: u16,
    /// Seasons below this many plate appearances are dropped at ingestion.
    #[serde(default = "default_min_plate_appearances")]
    pub min_plate_appearances: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    /// Season the roster seeder builds lineups for.
    #[serde(default = "default_roster_season")]
    pub season: u16,
    #[serde(default = "default_stats_api_base")]
    pub stats_api_base: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Directory holding `batting_<year>.csv` files.
    #[serde(default = "default_batting_dir")]
    pub batting_dir: String,
    /// CSV mapping MLBAM ids to FanGraphs ids.
    #[serde(default = "default_register_path")]
    pub register_path: String,
}

fn default_limit() -> usize {
    5
}

fn default_score_cutoff() -> f64 {
    70.0
}

fn default_image_url_template() -> String {
    DEFAULT_IMAGE_URL_TEMPLATE.to_string()
}

fn default_first_year() -> u16 {
    2015
}

fn default_current_year() -> u16 {
    2024
}

fn default_min_plate_appearances() -> u32 {
    50
}

fn default_roster_season() -> u16 {
    u16::try_from(chrono::Utc::now().year()).unwrap_or(default_current_year())
}

fn default_stats_api_base() -> String {
    "https://statsapi.mlb.com/api/v1".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_batting_dir() -> String {
    "data/batting".to_string()
}

fn default_register_path() -> String {
    "data/register.csv".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            score_cutoff: default_score_cutoff(),
            image_url_template: default_image_url_template(),
        }
    }
}

impl Default for SeasonsConfig {
    fn default() -> Self {
        Self {
            first_year: default_first_year(),
            current_year: default_current_year(),
            min_plate_appearances: default_min_plate_appearances(),
        }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            season: default_roster_season(),
            stats_api_base: default_stats_api_base(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            batting_dir: default_batting_dir(),
            register_path: default_register_path(),
        }
    }
}

impl Config {
    /// Resolved SQLite path: the configured one, or `dugout.db` under the
    /// platform data directory, or the working directory as a last resort.
    pub fn db_path(&self) -> PathBuf {
        if let Some(path) = self.database.path.as_deref().filter(|p| !p.trim().is_empty()) {
            return PathBuf::from(path);
        }
        directories::ProjectDirs::from("", "", "dugout")
            .map(|dirs| dirs.data_dir().join("dugout.db"))
            .unwrap_or_else(|| PathBuf::from("dugout.db"))
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/dugout.toml` relative to `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&path, &text)?;
    validate(&config)?;
    Ok(config)
}

/// Parse config text without touching the filesystem. `path` is only used
/// for error messages.
pub fn parse_config(path: &Path, text: &str) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Copy `defaults/dugout.toml` to `config/dugout.toml` when the latter is
/// missing. Returns the written path, or `None` when a config file already
/// exists. Anything else in `defaults/` is left alone.
pub fn ensure_config_files(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let source = base_dir.join("defaults").join(CONFIG_FILE);
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE);

    if target.exists() {
        return Ok(None);
    }
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no {} in {} and no defaults/{} to copy; \
                 run from the project root or ensure defaults/ is present",
                CONFIG_FILE,
                config_dir.display(),
                CONFIG_FILE
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut dest) => {
            let content = std::fs::read(&source).map_err(|e| ConfigError::DefaultsCopyError {
                message: format!("failed to read {}: {e}", source.display()),
            })?;
            std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", target.display()),
                }
            })?;
            info!("Created {} from defaults", target.display());
            Ok(Some(target))
        }
        // Another process created it between the check and the open.
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", target.display()),
        }),
    }
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.search.limit == 0 {
        return Err(ConfigError::ValidationError {
            field: "search.limit".into(),
            message: "must be greater than 0".into(),
        });
    }

    let cutoff = config.search.score_cutoff;
    if !(0.0..=100.0).contains(&cutoff) {
        return Err(ConfigError::ValidationError {
            field: "search.score_cutoff".into(),
            message: format!("must be between 0 and 100 inclusive, got {cutoff}"),
        });
    }

    if !config.search.image_url_template.contains("{id}") {
        return Err(ConfigError::ValidationError {
            field: "search.image_url_template".into(),
            message: "must contain the {id} placeholder".into(),
        });
    }

    let seasons = &config.seasons;
    if seasons.first_year > seasons.current_year {
        return Err(ConfigError::ValidationError {
            field: "seasons.first_year".into(),
            message: format!(
                "must not be after seasons.current_year ({} > {})",
                seasons.first_year, seasons.current_year
            ),
        });
    }
    for (name, year) in [
        ("seasons.first_year", seasons.first_year),
        ("seasons.current_year", seasons.current_year),
        ("roster.season", config.roster.season),
    ] {
        if !(1000..=9999).contains(&year) {
            return Err(ConfigError::ValidationError {
                field: name.into(),
                message: format!("must be a four-digit year, got {year}"),
            });
        }
    }

    if config.roster.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "roster.request_timeout_secs".into(),
            message: "must be > 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
