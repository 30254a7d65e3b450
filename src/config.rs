use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Normal,
    Hard,
    Extreme,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 4] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Normal,
        DifficultyLevel::Hard,
        DifficultyLevel::Extreme,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Normal => "normal",
            DifficultyLevel::Hard => "hard",
            DifficultyLevel::Extreme => "extreme",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Multiplier applied to every round's time budget.
    pub fn time_modifier(self) -> f64 {
        match self {
            DifficultyLevel::Easy => 1.25,
            DifficultyLevel::Normal => 1.0,
            DifficultyLevel::Hard => 0.85,
            DifficultyLevel::Extreme => 0.7,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_win_round")]
    pub win_round: u32,
    #[serde(default = "default_time_floor_ms")]
    pub time_floor_ms: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_anti_repeat_window")]
    pub anti_repeat_window: usize,
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    #[serde(default = "default_round_transition_ms")]
    pub round_transition_ms: u64,
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_win_round() -> u32 {
    50
}
fn default_time_floor_ms() -> u32 {
    2000
}
fn default_tick_interval_ms() -> u64 {
    50
}
fn default_anti_repeat_window() -> usize {
    5
}
fn default_history_cap() -> usize {
    50
}
fn default_round_transition_ms() -> u64 {
    300
}
fn default_theme() -> String {
    "terminal-default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            win_round: default_win_round(),
            time_floor_ms: default_time_floor_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            anti_repeat_window: default_anti_repeat_window(),
            history_cap: default_history_cap(),
            round_transition_ms: default_round_transition_ms(),
            difficulty: DifficultyLevel::default(),
            theme: default_theme(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pressure")
            .join("config.toml")
    }

    /// Clamp hand-edited values back into ranges the engine can work with.
    pub fn validate(&mut self) {
        self.win_round = self.win_round.max(1);
        self.time_floor_ms = self.time_floor_ms.clamp(500, 10_000);
        self.tick_interval_ms = self.tick_interval_ms.clamp(10, 100);
        self.anti_repeat_window = self.anti_repeat_window.min(20);
        self.history_cap = self.history_cap.clamp(1, 500);
        self.round_transition_ms = self.round_transition_ms.min(5_000);
        if self.theme.trim().is_empty() {
            self.theme = default_theme();
        }
    }
}
