// Configuration loading and parsing (config/league.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::roster::slots::RosterCounts;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level tables in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    database: DatabaseSection,
    data: DataSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub num_teams: usize,
    pub draft_rounds: u32,
    /// Pick clock duration in seconds. Zero disables the clock entirely
    /// (picks wait indefinitely for the human).
    #[serde(default = "default_pick_clock_secs")]
    pub pick_clock_secs: u64,
    pub roster: RosterCounts,
}

fn default_pick_clock_secs() -> u64 {
    90
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DataSection {
    players: String,
}

/// The assembled configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub db_path: String,
    pub players_path: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` relative to the
/// given base directory.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let league_path = base_dir.join("config").join("league.toml");
    let text = read_file(&league_path)?;
    let file: LeagueFile =
        toml::from_str(&text).map_err(|source| ConfigError::ParseError {
            path: league_path.clone(),
            source,
        })?;

    let config = Config {
        league: file.league,
        db_path: file.database.path,
        players_path: file.data.players,
    };
    validate(&config)?;
    Ok(config)
}

/// Load configuration from the working directory, falling back to the
/// platform config directory (e.g. `~/.config/gridiron` on Linux).
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if cwd.join("config").join("league.toml").exists() {
        return load_config_from(&cwd);
    }
    if let Some(dirs) = directories::ProjectDirs::from("", "", "gridiron") {
        let base = dirs.config_dir();
        if base.join("config").join("league.toml").exists() {
            return load_config_from(base);
        }
    }
    // Surface the primary path in the error.
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;
    if league.num_teams < 2 {
        return Err(ConfigError::ValidationError {
            field: "league.num_teams".to_string(),
            message: format!("need at least 2 teams, got {}", league.num_teams),
        });
    }
    if league.draft_rounds == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.draft_rounds".to_string(),
            message: "draft needs at least one round".to_string(),
        });
    }
    // Reject undersized rosters up front: a draft of N rounds needs N
    // starter+bench slots per member, or late picks have nowhere to land.
    let capacity = league.roster.draftable_count();
    if (league.draft_rounds as usize) > capacity {
        return Err(ConfigError::ValidationError {
            field: "league.draft_rounds".to_string(),
            message: format!(
                "{} rounds exceed the {} draftable roster slots",
                league.draft_rounds, capacity
            ),
        });
    }
    if config.db_path.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".to_string(),
            message: "database path must not be empty".to_string(),
        });
    }
    Ok(())
}
