use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    #[default]
    GameOver,
    Victory,
}

/// Immutable record of one finished game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSessionSummary {
    pub score: u64,
    pub rounds_completed: u32,
    pub accuracy_percent: f64,
    pub average_reaction_time_ms: f64,
    pub longest_streak: u32,
    pub duration_secs: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub outcome: SessionOutcome,
}

/// Running per-game counters, folded into a [`GameSessionSummary`] at the end.
#[derive(Clone, Debug)]
pub struct SessionTally {
    started_at: Instant,
    started_wall: DateTime<Utc>,
    reaction_times_ms: Vec<u64>,
    pub correct: u32,
    pub incorrect: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

impl SessionTally {
    pub fn new(started_at: Instant, started_wall: DateTime<Utc>) -> Self {
        Self {
            started_at,
            started_wall,
            reaction_times_ms: Vec::new(),
            correct: 0,
            incorrect: 0,
            current_streak: 0,
            longest_streak: 0,
        }
    }

    pub fn record_success(&mut self, reaction_ms: u64) {
        self.reaction_times_ms.push(reaction_ms);
        self.correct += 1;
        self.current_streak += 1;
        self.longest_streak = self.longest_streak.max(self.current_streak);
    }

    pub fn record_failure(&mut self, reaction_ms: u64) {
        self.reaction_times_ms.push(reaction_ms);
        self.incorrect += 1;
        self.current_streak = 0;
    }

    pub fn rounds(&self) -> u32 {
        self.correct + self.incorrect
    }

    pub fn reaction_times_ms(&self) -> &[u64] {
        &self.reaction_times_ms
    }

    pub fn summarize(&self, score: u64, now: Instant, outcome: SessionOutcome) -> GameSessionSummary {
        let rounds = self.rounds();
        let accuracy = if rounds > 0 {
            self.correct as f64 / rounds as f64 * 100.0
        } else {
            0.0
        };
        let average_reaction = if self.reaction_times_ms.is_empty() {
            0.0
        } else {
            self.reaction_times_ms.iter().sum::<u64>() as f64 / self.reaction_times_ms.len() as f64
        };
        let elapsed = now.saturating_duration_since(self.started_at);
        let timestamp = chrono::Duration::from_std(elapsed)
            .ok()
            .and_then(|d| self.started_wall.checked_add_signed(d))
            .unwrap_or(self.started_wall);

        GameSessionSummary {
            score,
            rounds_completed: rounds,
            accuracy_percent: (accuracy * 10.0).round() / 10.0,
            average_reaction_time_ms: average_reaction.round(),
            longest_streak: self.longest_streak,
            duration_secs: elapsed.as_secs(),
            timestamp,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_streak_tracking() {
        let mut tally = SessionTally::new(Instant::now(), Utc::now());
        tally.record_success(400);
        tally.record_success(300);
        tally.record_success(350);
        tally.record_failure(900);
        tally.record_success(200);
        assert_eq!(tally.longest_streak, 3);
        assert_eq!(tally.current_streak, 1);
        assert_eq!(tally.rounds(), 5);
    }

    #[test]
    fn test_summary_metrics() {
        let t0 = Instant::now();
        let wall = Utc::now();
        let mut tally = SessionTally::new(t0, wall);
        tally.record_success(1000);
        tally.record_success(2000);
        tally.record_failure(1501);

        let summary = tally.summarize(30, t0 + Duration::from_millis(12_400), SessionOutcome::GameOver);
        assert_eq!(summary.score, 30);
        assert_eq!(summary.rounds_completed, 3);
        assert_eq!(summary.accuracy_percent, 66.7);
        assert_eq!(summary.average_reaction_time_ms, 1500.0);
        assert_eq!(summary.longest_streak, 2);
        assert_eq!(summary.duration_secs, 12);
        assert_eq!(summary.timestamp, wall + chrono::Duration::milliseconds(12_400));
    }

    #[test]
    fn test_empty_session_summary() {
        let t0 = Instant::now();
        let summary = SessionTally::new(t0, Utc::now()).summarize(0, t0, SessionOutcome::GameOver);
        assert_eq!(summary.rounds_completed, 0);
        assert_eq!(summary.accuracy_percent, 0.0);
        assert_eq!(summary.average_reaction_time_ms, 0.0);
    }

    #[test]
    fn test_outcome_defaults_when_missing() {
        let json = r#"{
            "score": 10, "rounds_completed": 2, "accuracy_percent": 50.0,
            "average_reaction_time_ms": 800.0, "longest_streak": 1,
            "duration_secs": 9, "timestamp": "2026-01-01T00:00:00Z"
        }"#;
        let summary: GameSessionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.outcome, SessionOutcome::GameOver);
    }
}
