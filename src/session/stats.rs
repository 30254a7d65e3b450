use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::summary::GameSessionSummary;

pub const DEFAULT_HISTORY_CAP: usize = 50;

/// Cumulative statistics across every finished game.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub total_games: u32,
    pub total_score: u64,
    pub high_score: u64,
    pub total_rounds: u32,
    pub total_correct: u32,
    pub total_incorrect: u32,
    pub average_accuracy: f64,
    pub average_reaction_time_ms: f64,
    pub longest_streak: u32,
    pub total_play_time_secs: u64,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
    /// Newest first.
    #[serde(default)]
    pub history: Vec<GameSessionSummary>,
}

impl PlayerStats {
    /// Fold one finished game into the totals, returning the new stats.
    pub fn record_session(&self, summary: &GameSessionSummary, history_cap: usize) -> PlayerStats {
        let mut next = self.clone();
        let prior_sessions = self.total_games as f64;

        next.total_games += 1;
        next.total_score += summary.score;
        next.total_rounds += summary.rounds_completed;
        next.total_play_time_secs += summary.duration_secs;
        next.last_played = Some(summary.timestamp);
        next.high_score = next.high_score.max(summary.score);
        next.longest_streak = next.longest_streak.max(summary.longest_streak);

        let correct = (summary.accuracy_percent / 100.0 * summary.rounds_completed as f64).round() as u32;
        let correct = correct.min(summary.rounds_completed);
        next.total_correct += correct;
        next.total_incorrect += summary.rounds_completed - correct;

        let answered = next.total_correct + next.total_incorrect;
        if answered > 0 {
            next.average_accuracy = next.total_correct as f64 / answered as f64 * 100.0;
        }

        next.average_reaction_time_ms = (self.average_reaction_time_ms * prior_sessions
            + summary.average_reaction_time_ms)
            / (prior_sessions + 1.0);

        next.history.insert(0, summary.clone());
        next.history.truncate(history_cap);
        next
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Best sessions in history by score, highest first.
    pub fn top_scores(&self, limit: usize) -> Vec<&GameSessionSummary> {
        let mut sorted: Vec<&GameSessionSummary> = self.history.iter().collect();
        sorted.sort_by(|a, b| b.score.cmp(&a.score).then(b.timestamp.cmp(&a.timestamp)));
        sorted.truncate(limit);
        sorted
    }
}
