use crate::controller::MeetingDefaults;
use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub meeting: MeetingConfig,
    pub timer: TimerSettings,
    pub history: HistoryConfig,
    pub server: ServerConfig,
    pub hooks: HooksConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingConfig {
    pub club_name: String,
    /// "HH:MM", empty for none
    pub scheduled_start: String,
    /// Fill a new meeting with the standard agenda.
    pub load_preset: bool,
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            club_name: crate::agenda::DEFAULT_CLUB_NAME.to_string(),
            scheduled_start: "19:30".to_string(),
            load_preset: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerSettings {
    pub tick_interval_ms: u64,
    pub audio_cues: bool,
    /// Audio player binary; found on PATH when unset.
    pub player: Option<String>,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            audio_cues: true,
            player: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_snapshots: usize,
    pub autosave_on_finalize: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_snapshots: 5,
            autosave_on_finalize: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3838 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HooksConfig {
    /// Shell command run after a role's timer is confirmed stopped.
    /// Receives the result JSON via stdin.
    /// Env vars: GAVEL_ITEM_ID, GAVEL_ROLE, GAVEL_SPEAKER,
    /// GAVEL_ELAPSED_SECONDS, GAVEL_STATUS
    pub item_complete_command: String,
    pub timeout_seconds: u64,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            item_complete_command: String::new(),
            timeout_seconds: 30,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Settings for a freshly created meeting. A malformed start time is
    /// logged and ignored.
    pub fn meeting_defaults(&self) -> MeetingDefaults {
        let start = self.meeting.scheduled_start.trim();
        let scheduled_start = if start.is_empty() {
            None
        } else {
            match crate::agenda::parse_time_of_day(start) {
                Ok(time) => Some(time),
                Err(e) => {
                    warn!("Ignoring meeting.scheduled_start: {}", e);
                    None
                }
            }
        };

        MeetingDefaults {
            club_name: self.meeting.club_name.clone(),
            scheduled_start,
            load_preset: self.meeting.load_preset,
            autosave_on_finalize: self.history.autosave_on_finalize,
        }
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}
