//! Application-level configuration loading, including the broadcast cadences.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "RITUAL_QUIZ_CONFIG_PATH";

const DEFAULT_GAME_TICK_MS: u64 = 1_000;
const DEFAULT_SNAPSHOT_TICK_MS: u64 = 3_000;
const DEFAULT_TOPIC_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    game_tick: Duration,
    snapshot_tick: Duration,
    topic_capacity: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        game_tick_ms = app_config.game_tick.as_millis() as u64,
                        snapshot_tick_ms = app_config.snapshot_tick.as_millis() as u64,
                        "loaded broadcast settings from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; absent fields keep their default.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Interval between two game-state pushes for every watched room.
    pub fn game_tick(&self) -> Duration {
        self.game_tick
    }

    /// Interval between two room-list and global-leaderboard snapshots.
    pub fn snapshot_tick(&self) -> Duration {
        self.snapshot_tick
    }

    /// Capacity of the broadcast channel backing each push topic.
    pub fn topic_capacity(&self) -> usize {
        self.topic_capacity
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game_tick: Duration::from_millis(DEFAULT_GAME_TICK_MS),
            snapshot_tick: Duration::from_millis(DEFAULT_SNAPSHOT_TICK_MS),
            topic_capacity: DEFAULT_TOPIC_CAPACITY,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    game_tick_ms: Option<u64>,
    snapshot_tick_ms: Option<u64>,
    topic_capacity: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        // Tick periods and channel capacities must be non-zero.
        let positive_ms = |value: Option<u64>, default: u64| {
            Duration::from_millis(value.filter(|ms| *ms > 0).unwrap_or(default))
        };
        Self {
            game_tick: positive_ms(value.game_tick_ms, DEFAULT_GAME_TICK_MS),
            snapshot_tick: positive_ms(value.snapshot_tick_ms, DEFAULT_SNAPSHOT_TICK_MS),
            topic_capacity: value
                .topic_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(DEFAULT_TOPIC_CAPACITY),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
