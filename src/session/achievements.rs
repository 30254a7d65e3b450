use chrono::{DateTime, Duration, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::session::stats::PlayerStats;
use crate::session::summary::GameSessionSummary;

/// Games started before this local hour count as late-night games.
const NIGHT_ENDS_AT_HOUR: u32 = 6;
const SHARPSHOOTER_ACCURACY: f64 = 95.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AchievementKind {
    FirstSteps,
    Dedicated,
    Veteran,
    Centurion,
    Champion,
    Legend,
    Perfectionist,
    Sharpshooter,
    ComboMaster,
    Unstoppable,
    SpeedDemon,
    Lightning,
    Marathon,
    IronWill,
    NightOwl,
    Collector,
}

/// What an achievement measures, and in which direction the threshold applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Metric {
    TotalGames,
    Score,
    PerfectAccuracy,
    AccurateGames,
    Streak,
    ReactionUnder,
    Rounds,
    NightGames,
    OthersUnlocked,
}

impl AchievementKind {
    pub const ALL: [AchievementKind; 16] = [
        AchievementKind::FirstSteps,
        AchievementKind::Dedicated,
        AchievementKind::Veteran,
        AchievementKind::Centurion,
        AchievementKind::Champion,
        AchievementKind::Legend,
        AchievementKind::Perfectionist,
        AchievementKind::Sharpshooter,
        AchievementKind::ComboMaster,
        AchievementKind::Unstoppable,
        AchievementKind::SpeedDemon,
        AchievementKind::Lightning,
        AchievementKind::Marathon,
        AchievementKind::IronWill,
        AchievementKind::NightOwl,
        AchievementKind::Collector,
    ];

    pub fn id(self) -> &'static str {
        match self {
            AchievementKind::FirstSteps => "firstSteps",
            AchievementKind::Dedicated => "dedicated",
            AchievementKind::Veteran => "veteran",
            AchievementKind::Centurion => "centurion",
            AchievementKind::Champion => "champion",
            AchievementKind::Legend => "legend",
            AchievementKind::Perfectionist => "perfectionist",
            AchievementKind::Sharpshooter => "sharpshooter",
            AchievementKind::ComboMaster => "comboMaster",
            AchievementKind::Unstoppable => "unstoppable",
            AchievementKind::SpeedDemon => "speedDemon",
            AchievementKind::Lightning => "lightning",
            AchievementKind::Marathon => "marathon",
            AchievementKind::IronWill => "ironWill",
            AchievementKind::NightOwl => "nightOwl",
            AchievementKind::Collector => "collector",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            AchievementKind::FirstSteps => "First Steps",
            AchievementKind::Dedicated => "Dedicated",
            AchievementKind::Veteran => "Veteran",
            AchievementKind::Centurion => "Centurion",
            AchievementKind::Champion => "Champion",
            AchievementKind::Legend => "Legend",
            AchievementKind::Perfectionist => "Perfectionist",
            AchievementKind::Sharpshooter => "Sharpshooter",
            AchievementKind::ComboMaster => "Combo Master",
            AchievementKind::Unstoppable => "Unstoppable",
            AchievementKind::SpeedDemon => "Speed Demon",
            AchievementKind::Lightning => "Lightning",
            AchievementKind::Marathon => "Marathon",
            AchievementKind::IronWill => "Iron Will",
            AchievementKind::NightOwl => "Night Owl",
            AchievementKind::Collector => "Collector",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AchievementKind::FirstSteps => "Complete your first game",
            AchievementKind::Dedicated => "Play 10 games",
            AchievementKind::Veteran => "Play 50 games",
            AchievementKind::Centurion => "Reach 100 points in one game",
            AchievementKind::Champion => "Reach 500 points in one game",
            AchievementKind::Legend => "Reach 1000 points in one game",
            AchievementKind::Perfectionist => "Complete a game with 100% accuracy",
            AchievementKind::Sharpshooter => "Maintain 95% accuracy in 10 games",
            AchievementKind::ComboMaster => "Achieve a streak of 10",
            AchievementKind::Unstoppable => "Achieve a streak of 25",
            AchievementKind::SpeedDemon => "Average reaction time under 300ms",
            AchievementKind::Lightning => "Average reaction time under 200ms",
            AchievementKind::Marathon => "Complete 30 rounds in one game",
            AchievementKind::IronWill => "Complete 50 rounds in one game",
            AchievementKind::NightOwl => "Play 5 games between 12 AM and 6 AM",
            AchievementKind::Collector => "Unlock all achievements",
        }
    }

    pub fn requirement(self) -> f64 {
        match self {
            AchievementKind::FirstSteps => 1.0,
            AchievementKind::Dedicated => 10.0,
            AchievementKind::Veteran => 50.0,
            AchievementKind::Centurion => 100.0,
            AchievementKind::Champion => 500.0,
            AchievementKind::Legend => 1000.0,
            AchievementKind::Perfectionist => 100.0,
            AchievementKind::Sharpshooter => 10.0,
            AchievementKind::ComboMaster => 10.0,
            AchievementKind::Unstoppable => 25.0,
            AchievementKind::SpeedDemon => 300.0,
            AchievementKind::Lightning => 200.0,
            AchievementKind::Marathon => 30.0,
            AchievementKind::IronWill => 50.0,
            AchievementKind::NightOwl => 5.0,
            AchievementKind::Collector => (Self::ALL.len() - 1) as f64,
        }
    }

    fn metric(self) -> Metric {
        match self {
            AchievementKind::FirstSteps | AchievementKind::Dedicated | AchievementKind::Veteran => {
                Metric::TotalGames
            }
            AchievementKind::Centurion | AchievementKind::Champion | AchievementKind::Legend => {
                Metric::Score
            }
            AchievementKind::Perfectionist => Metric::PerfectAccuracy,
            AchievementKind::Sharpshooter => Metric::AccurateGames,
            AchievementKind::ComboMaster | AchievementKind::Unstoppable => Metric::Streak,
            AchievementKind::SpeedDemon | AchievementKind::Lightning => Metric::ReactionUnder,
            AchievementKind::Marathon | AchievementKind::IronWill => Metric::Rounds,
            AchievementKind::NightOwl => Metric::NightGames,
            AchievementKind::Collector => Metric::OthersUnlocked,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub unlocked: bool,
    pub unlocked_date: Option<DateTime<Utc>>,
    /// 0-100. Always 100 once unlocked.
    pub progress: f64,
    pub requirement: f64,
}

impl Achievement {
    pub fn locked(kind: AchievementKind) -> Self {
        Self {
            id: kind.id().to_string(),
            unlocked: false,
            unlocked_date: None,
            progress: 0.0,
            requirement: kind.requirement(),
        }
    }

    pub fn kind(&self) -> Option<AchievementKind> {
        AchievementKind::from_id(&self.id)
    }

    fn unlock(&mut self, at: DateTime<Utc>) {
        self.unlocked = true;
        self.unlocked_date = Some(at);
        self.progress = 100.0;
    }
}

fn percent_of(current: f64, requirement: f64) -> f64 {
    if requirement <= 0.0 {
        return 100.0;
    }
    (current / requirement * 100.0).round().clamp(0.0, 100.0)
}

/// Whether the game began in the small hours, local time. The summary is
/// stamped when the game ends, so its duration is subtracted.
fn started_at_night(summary: &GameSessionSummary) -> bool {
    let started = summary.timestamp - Duration::seconds(summary.duration_secs as i64);
    started.with_timezone(&Local).hour() < NIGHT_ENDS_AT_HOUR
}

/// The player's achievement list, in catalogue order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AchievementBook {
    pub achievements: Vec<Achievement>,
}

impl Default for AchievementBook {
    fn default() -> Self {
        Self {
            achievements: AchievementKind::ALL.into_iter().map(Achievement::locked).collect(),
        }
    }
}

impl AchievementBook {
    /// Rebuild the catalogue, keeping saved state for ids that still exist.
    /// Achievements added since the save start locked.
    pub fn from_saved(saved: Vec<Achievement>) -> Self {
        let achievements = AchievementKind::ALL
            .into_iter()
            .map(|kind| {
                saved
                    .iter()
                    .find(|a| a.id == kind.id())
                    .cloned()
                    .map(|mut a| {
                        a.requirement = kind.requirement();
                        if a.unlocked {
                            a.progress = 100.0;
                        }
                        a
                    })
                    .unwrap_or_else(|| Achievement::locked(kind))
            })
            .collect();
        Self { achievements }
    }

    pub fn get(&self, kind: AchievementKind) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == kind.id())
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| a.unlocked)
    }

    pub fn locked(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| !a.unlocked)
    }

    /// Re-check every locked achievement against the finished game and the
    /// cumulative stats (which already include that game). Returns the ones
    /// unlocked by this call.
    pub fn evaluate(
        &mut self,
        summary: &GameSessionSummary,
        stats: &PlayerStats,
        now: DateTime<Utc>,
    ) -> Vec<Achievement> {
        let mut newly_unlocked = Vec::new();

        for achievement in &mut self.achievements {
            if achievement.unlocked {
                continue;
            }
            let Some(kind) = achievement.kind() else {
                continue;
            };
            let requirement = kind.requirement();
            let (progress, met) = match kind.metric() {
                Metric::OthersUnlocked => continue,
                Metric::TotalGames => {
                    let games = stats.total_games as f64;
                    (percent_of(games, requirement), games >= requirement)
                }
                Metric::Score => {
                    let score = summary.score as f64;
                    (percent_of(score, requirement), score >= requirement)
                }
                Metric::PerfectAccuracy => (
                    percent_of(summary.accuracy_percent, requirement),
                    summary.accuracy_percent >= requirement && summary.rounds_completed > 0,
                ),
                Metric::AccurateGames => {
                    let games = stats
                        .history
                        .iter()
                        .filter(|s| s.rounds_completed > 0 && s.accuracy_percent >= SHARPSHOOTER_ACCURACY)
                        .count() as f64;
                    (percent_of(games, requirement), games >= requirement)
                }
                Metric::Streak => {
                    let streak = summary.longest_streak as f64;
                    (percent_of(streak, requirement), streak >= requirement)
                }
                Metric::ReactionUnder => {
                    let avg = summary.average_reaction_time_ms;
                    if avg > 0.0 {
                        (percent_of(requirement, avg), avg < requirement)
                    } else {
                        (0.0, false)
                    }
                }
                Metric::Rounds => {
                    let rounds = summary.rounds_completed as f64;
                    (percent_of(rounds, requirement), rounds >= requirement)
                }
                Metric::NightGames => {
                    let games = stats.history.iter().filter(|s| started_at_night(s)).count() as f64;
                    (percent_of(games, requirement), games >= requirement)
                }
            };

            achievement.progress = progress;
            if met {
                achievement.unlock(now);
                newly_unlocked.push(achievement.clone());
            }
        }

        // Depends on every other unlock, so it goes last.
        let others_unlocked = self
            .achievements
            .iter()
            .filter(|a| a.unlocked && a.kind() != Some(AchievementKind::Collector))
            .count() as f64;
        if let Some(collector) = self
            .achievements
            .iter_mut()
            .find(|a| a.kind() == Some(AchievementKind::Collector) && !a.unlocked)
        {
            let requirement = AchievementKind::Collector.requirement();
            collector.progress = percent_of(others_unlocked, requirement);
            if others_unlocked >= requirement {
                collector.unlock(now);
                newly_unlocked.push(collector.clone());
            }
        }

        for achievement in &newly_unlocked {
            log::info!("achievement unlocked: {}", achievement.id);
        }
        newly_unlocked
    }

    /// Explicit full reset: the only way an unlock is ever cleared.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::session::stats::DEFAULT_HISTORY_CAP;
    use crate::session::summary::SessionOutcome;

    fn noon() -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2026, 5, 4, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn summary(score: u64, rounds: u32, accuracy: f64, streak: u32, reaction: f64) -> GameSessionSummary {
        GameSessionSummary {
            score,
            rounds_completed: rounds,
            accuracy_percent: accuracy,
            average_reaction_time_ms: reaction,
            longest_streak: streak,
            duration_secs: 60,
            timestamp: noon(),
            outcome: SessionOutcome::GameOver,
        }
    }

    fn play(book: &mut AchievementBook, stats: &mut PlayerStats, s: &GameSessionSummary) -> Vec<Achievement> {
        *stats = stats.record_session(s, DEFAULT_HISTORY_CAP);
        book.evaluate(s, stats, s.timestamp)
    }

    fn ids(list: &[Achievement]) -> Vec<&str> {
        list.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_score_threshold_unlocks() {
        let mut book = AchievementBook::default();
        let mut stats = PlayerStats::default();
        let unlocked = play(&mut book, &mut stats, &summary(100, 5, 80.0, 4, 900.0));
        assert!(ids(&unlocked).contains(&"centurion"));
        let centurion = book.get(AchievementKind::Centurion).unwrap();
        assert!(centurion.unlocked);
        assert_eq!(centurion.progress, 100.0);
        assert_eq!(centurion.unlocked_date, Some(noon()));
    }

    #[test]
    fn test_partial_progress_stays_locked() {
        let mut book = AchievementBook::default();
        let mut stats = PlayerStats::default();
        play(&mut book, &mut stats, &summary(50, 3, 66.7, 2, 900.0));
        let centurion = book.get(AchievementKind::Centurion).unwrap();
        assert!(!centurion.unlocked);
        assert_eq!(centurion.progress, 50.0);
        assert_eq!(book.get(AchievementKind::Champion).unwrap().progress, 10.0);
    }

    #[test]
    fn test_first_game_unlocks_first_steps_only_once() {
        let mut book = AchievementBook::default();
        let mut stats = PlayerStats::default();
        let first = play(&mut book, &mut stats, &summary(10, 2, 50.0, 1, 900.0));
        assert_eq!(ids(&first), vec!["firstSteps"]);
        let second = play(&mut book, &mut stats, &summary(10, 2, 50.0, 1, 900.0));
        assert!(second.is_empty());
        assert_eq!(book.get(AchievementKind::Dedicated).unwrap().progress, 20.0);
    }

    #[test]
    fn test_unlocked_never_regresses() {
        let mut book = AchievementBook::default();
        let mut stats = PlayerStats::default();
        play(&mut book, &mut stats, &summary(120, 6, 100.0, 6, 900.0));
        play(&mut book, &mut stats, &summary(0, 1, 0.0, 0, 900.0));
        let centurion = book.get(AchievementKind::Centurion).unwrap();
        assert!(centurion.unlocked);
        assert_eq!(centurion.progress, 100.0);
    }

    #[test]
    fn test_locked_progress_is_recomputed_each_game() {
        let mut book = AchievementBook::default();
        let mut stats = PlayerStats::default();
        play(&mut book, &mut stats, &summary(80, 4, 75.0, 3, 900.0));
        assert_eq!(book.get(AchievementKind::Centurion).unwrap().progress, 80.0);
        play(&mut book, &mut stats, &summary(20, 2, 50.0, 1, 900.0));
        assert_eq!(book.get(AchievementKind::Centurion).unwrap().progress, 20.0);
    }

    #[test]
    fn test_reaction_time_achievements() {
        let mut book = AchievementBook::default();
        let mut stats = PlayerStats::default();
        let unlocked = play(&mut book, &mut stats, &summary(10, 2, 50.0, 1, 250.0));
        assert!(ids(&unlocked).contains(&"speedDemon"));
        assert!(!ids(&unlocked).contains(&"lightning"));
        assert_eq!(book.get(AchievementKind::Lightning).unwrap().progress, 80.0);
    }

    #[test]
    fn test_zero_reaction_time_does_not_count_as_fast() {
        let mut book = AchievementBook::default();
        let mut stats = PlayerStats::default();
        let unlocked = play(&mut book, &mut stats, &summary(0, 0, 0.0, 0, 0.0));
        assert!(!ids(&unlocked).contains(&"speedDemon"));
        assert!(!ids(&unlocked).contains(&"perfectionist"));
    }

    #[test]
    fn test_perfect_game() {
        let mut book = AchievementBook::default();
        let mut stats = PlayerStats::default();
        let unlocked = play(&mut book, &mut stats, &summary(150, 5, 100.0, 5, 900.0));
        assert!(ids(&unlocked).contains(&"perfectionist"));
    }

    #[test]
    fn test_sharpshooter_counts_accurate_games_in_history() {
        let mut book = AchievementBook::default();
        let mut stats = PlayerStats::default();
        for _ in 0..9 {
            play(&mut book, &mut stats, &summary(40, 20, 95.0, 19, 900.0));
        }
        assert_eq!(book.get(AchievementKind::Sharpshooter).unwrap().progress, 90.0);
        let unlocked = play(&mut book, &mut stats, &summary(40, 20, 95.0, 19, 900.0));
        assert!(ids(&unlocked).contains(&"sharpshooter"));
        assert!(ids(&unlocked).contains(&"dedicated"));
    }

    #[test]
    fn test_night_owl_uses_local_hour() {
        let mut book = AchievementBook::default();
        let mut stats = PlayerStats::default();
        let late = Local
            .with_ymd_and_hms(2026, 5, 4, 2, 30, 0)
            .unwrap()
            .with_timezone(&Utc);
        let mut s = summary(10, 2, 50.0, 1, 900.0);
        s.timestamp = late;
        for _ in 0..4 {
            play(&mut book, &mut stats, &s);
        }
        assert!(!book.get(AchievementKind::NightOwl).unwrap().unlocked);
        let unlocked = play(&mut book, &mut stats, &s);
        assert!(ids(&unlocked).contains(&"nightOwl"));
    }

    #[test]
    fn test_night_owl_counts_when_the_game_started() {
        let mut book = AchievementBook::default();
        let mut stats = PlayerStats::default();
        // Began at 05:50, finished at 06:10.
        let ended = Local
            .with_ymd_and_hms(2026, 5, 4, 6, 10, 0)
            .unwrap()
            .with_timezone(&Utc);
        let mut s = summary(10, 2, 50.0, 1, 900.0);
        s.timestamp = ended;
        s.duration_secs = 20 * 60;
        for _ in 0..5 {
            play(&mut book, &mut stats, &s);
        }
        assert!(book.get(AchievementKind::NightOwl).unwrap().unlocked);

        // Began at 23:50 the night before, finished at 00:10: not counted.
        let mut book = AchievementBook::default();
        let mut stats = PlayerStats::default();
        s.timestamp = Local
            .with_ymd_and_hms(2026, 5, 4, 0, 10, 0)
            .unwrap()
            .with_timezone(&Utc);
        for _ in 0..5 {
            play(&mut book, &mut stats, &s);
        }
        let night_owl = book.get(AchievementKind::NightOwl).unwrap();
        assert!(!night_owl.unlocked);
        assert_eq!(night_owl.progress, 0.0);
    }

    #[test]
    fn test_collector_unlocks_after_everything_else() {
        let mut book = AchievementBook::default();
        for a in &mut book.achievements {
            if a.id != "collector" && a.id != "legend" {
                a.unlock(noon());
            }
        }
        let mut stats = PlayerStats::default();
        let unlocked = play(&mut book, &mut stats, &summary(1000, 50, 100.0, 50, 150.0));
        assert_eq!(ids(&unlocked), vec!["legend", "collector"]);
    }

    #[test]
    fn test_from_saved_merges_new_achievements() {
        let mut saved = Achievement::locked(AchievementKind::Centurion);
        saved.unlock(noon());
        let book = AchievementBook::from_saved(vec![
            saved,
            Achievement {
                id: "retired".to_string(),
                unlocked: true,
                unlocked_date: None,
                progress: 100.0,
                requirement: 1.0,
            },
        ]);
        assert_eq!(book.achievements.len(), AchievementKind::ALL.len());
        assert!(book.get(AchievementKind::Centurion).unwrap().unlocked);
        assert_eq!(book.unlocked().count(), 1);
    }

    #[test]
    fn test_reset_clears_unlocks() {
        let mut book = AchievementBook::default();
        let mut stats = PlayerStats::default();
        play(&mut book, &mut stats, &summary(100, 5, 100.0, 5, 900.0));
        assert!(book.unlocked().count() > 0);
        book.reset();
        assert_eq!(book.unlocked().count(), 0);
        assert!(book.achievements.iter().all(|a| a.progress == 0.0));
    }
}
