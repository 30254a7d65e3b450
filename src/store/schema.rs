use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::session::achievements::{Achievement, AchievementBook};
use crate::session::stats::PlayerStats;

pub const SCHEMA_VERSION: u32 = 1;

pub const STATS_KEY: &str = "player_stats";
pub const ACHIEVEMENTS_KEY: &str = "achievements";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatsData {
    pub schema_version: u32,
    pub stats: PlayerStats,
}

impl Default for StatsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            stats: PlayerStats::default(),
        }
    }
}

impl StatsData {
    pub fn new(stats: PlayerStats) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            stats,
        }
    }

    /// Stats from a stale schema are discarded.
    pub fn into_current(self) -> PlayerStats {
        if self.schema_version == SCHEMA_VERSION {
            self.stats
        } else {
            log::warn!(
                "discarding stats with schema version {} (expected {SCHEMA_VERSION})",
                self.schema_version
            );
            PlayerStats::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AchievementData {
    pub schema_version: u32,
    pub achievements: Vec<Achievement>,
}

impl Default for AchievementData {
    fn default() -> Self {
        Self::new(&AchievementBook::default())
    }
}

impl AchievementData {
    pub fn new(book: &AchievementBook) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            achievements: book.achievements.clone(),
        }
    }

    pub fn into_book(self) -> AchievementBook {
        if self.schema_version == SCHEMA_VERSION {
            AchievementBook::from_saved(self.achievements)
        } else {
            log::warn!(
                "discarding achievements with schema version {} (expected {SCHEMA_VERSION})",
                self.schema_version
            );
            AchievementBook::default()
        }
    }
}

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub pressure_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub config: Config,
    pub stats: StatsData,
    pub achievements: AchievementData,
}
