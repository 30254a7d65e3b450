use std::time::Instant;

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::challenge::catalog::Catalog;
use crate::challenge::rule::Button;
use crate::config::Config;
use crate::engine::round::{GameEvent, GameOverReason, Phase, RoundEngine};
use crate::engine::timer::TimerProgress;
use crate::session::achievements::{Achievement, AchievementBook};
use crate::session::stats::PlayerStats;
use crate::session::summary::{GameSessionSummary, SessionOutcome};
use crate::store::kv::{KeyValueStore, Persistence};
use crate::store::schema::{ACHIEVEMENTS_KEY, AchievementData, STATS_KEY, StatsData};
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Game,
    GameResult,
    Stats,
    Achievements,
}

/// Everything the result screen shows about the game that just ended.
#[derive(Clone, Debug)]
pub struct GameOutcome {
    pub outcome: SessionOutcome,
    pub reason: Option<GameOverReason>,
    pub final_round: u32,
    pub summary: GameSessionSummary,
    pub unlocked: Vec<Achievement>,
    pub new_high_score: bool,
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub engine: RoundEngine,
    pub stats: PlayerStats,
    pub achievements: AchievementBook,
    pub last_outcome: Option<GameOutcome>,
    pub last_error: Option<String>,
    /// Latest countdown reported by the engine for the running round.
    pub timer: Option<TimerProgress>,
    pub stats_scroll: usize,
    pub should_quit: bool,
    persistence: Persistence<Box<dyn KeyValueStore>>,
    events: Vec<GameEvent>,
}

impl App {
    pub fn new(
        config: Config,
        store: Box<dyn KeyValueStore>,
        seed: Option<u64>,
        theme: &'static Theme,
    ) -> Result<Self> {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let catalog = Catalog::standard();
        catalog.validate()?;
        let engine = RoundEngine::new(config.clone(), catalog, rng)?;

        let persistence = Persistence::new(store);
        let stats = persistence.get::<StatsData>(STATS_KEY).into_current();
        let achievements = persistence
            .get::<AchievementData>(ACHIEVEMENTS_KEY)
            .into_book();
        log::info!(
            "loaded {} past games, {} achievements unlocked",
            stats.total_games,
            achievements.unlocked().count()
        );

        Ok(Self {
            screen: AppScreen::Menu,
            menu: Menu::new(theme, config.difficulty),
            theme,
            config,
            engine,
            stats,
            achievements,
            last_outcome: None,
            last_error: None,
            timer: None,
            stats_scroll: 0,
            should_quit: false,
            persistence,
            events: Vec::new(),
        })
    }

    pub fn start_game(&mut self, now: Instant) {
        self.engine.restart();
        self.last_outcome = None;
        self.last_error = None;
        self.timer = None;
        self.events.clear();
        let result = self.engine.start(now);
        self.after_engine_call(result);
        self.screen = AppScreen::Game;
    }

    pub fn press(&mut self, button: Button) {
        self.engine.press(button);
    }

    pub fn tick(&mut self, now: Instant) {
        let result = self.engine.tick(now);
        self.after_engine_call(result);
    }

    pub fn stop_round(&mut self, now: Instant) {
        let result = self.engine.stop_round(now);
        self.after_engine_call(result);
    }

    fn after_engine_call(&mut self, result: Result<(), crate::error::GameError>) {
        if let Err(e) = result {
            log::error!("{e}");
            self.last_error = Some(e.to_string());
        }
        for event in self.engine.drain_events() {
            match &event {
                GameEvent::Countdown { progress, .. } => self.timer = Some(*progress),
                GameEvent::AchievementsUnlocked { .. } => {}
                _ => self.timer = None,
            }
            self.events.push(event.clone());
            match event {
                GameEvent::GameOver { reason, summary } => {
                    let final_round = self.engine.state().round;
                    self.finish_session(summary, Some(reason), final_round);
                }
                GameEvent::Victory {
                    final_round,
                    summary,
                    ..
                } => self.finish_session(summary, None, final_round),
                _ => {}
            }
        }
    }

    /// Engine events seen since the last call, followed by an
    /// `AchievementsUnlocked` after any game that unlocked something.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Fold a finished game into stats and achievements and persist both.
    fn finish_session(
        &mut self,
        summary: GameSessionSummary,
        reason: Option<GameOverReason>,
        final_round: u32,
    ) {
        let new_high_score = summary.score > self.stats.high_score;
        self.stats = self
            .stats
            .record_session(&summary, self.config.history_cap);
        let unlocked = self
            .achievements
            .evaluate(&summary, &self.stats, summary.timestamp);
        self.save();
        if !unlocked.is_empty() {
            self.events.push(GameEvent::AchievementsUnlocked {
                achievements: unlocked.clone(),
            });
        }

        self.last_outcome = Some(GameOutcome {
            outcome: summary.outcome,
            reason,
            final_round,
            summary,
            unlocked,
            new_high_score,
        });
        self.screen = AppScreen::GameResult;
    }

    fn save(&self) {
        self.persistence
            .set(STATS_KEY, &StatsData::new(self.stats.clone()));
        self.persistence
            .set(ACHIEVEMENTS_KEY, &AchievementData::new(&self.achievements));
    }

    /// Wipe all stats and achievements, in memory and on disk.
    pub fn reset_progress(&mut self) {
        self.stats.reset();
        self.achievements.reset();
        self.persistence.remove(STATS_KEY);
        self.persistence.remove(ACHIEVEMENTS_KEY);
        log::info!("progress reset");
    }

    pub fn go_to_menu(&mut self) {
        if !self.engine.phase().is_finished() && self.engine.phase() != Phase::Idle {
            log::info!("game abandoned at round {}", self.engine.state().round);
        }
        self.engine.restart();
        self.timer = None;
        self.events.clear();
        self.screen = AppScreen::Menu;
    }

    pub fn go_to_stats(&mut self) {
        self.stats_scroll = 0;
        self.screen = AppScreen::Stats;
    }

    pub fn go_to_achievements(&mut self) {
        self.screen = AppScreen::Achievements;
    }

    pub fn cycle_difficulty(&mut self, forward: bool) {
        let level = if forward {
            self.config.difficulty.next()
        } else {
            self.config.difficulty.prev()
        };
        self.config.difficulty = level;
        self.engine.set_difficulty(level);
        self.menu.difficulty = level;
        if let Err(e) = self.config.save() {
            log::warn!("failed to save config: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::challenge::rule::Presses;
    use crate::store::kv::MemoryStore;

    fn theme() -> &'static Theme {
        Box::leak(Box::new(Theme::default()))
    }

    fn app_with(store: Rc<MemoryStore>) -> App {
        App::new(Config::default(), Box::new(store), Some(17), theme()).unwrap()
    }

    fn play_to_game_over(app: &mut App, t0: Instant) {
        app.start_game(t0);
        let challenge = *app.engine.catalog().get("press-red").unwrap();
        app.engine.restart();
        app.engine.start_at(1, challenge, t0).unwrap();
        app.press(Button::Red);
        app.stop_round(t0 + Duration::from_millis(250));
        app.tick(t0 + Duration::from_millis(600));
        assert_eq!(app.engine.phase(), Phase::RoundActive);

        // Second round: answer wrongly, whatever the challenge is.
        let rule = app.engine.state().challenge.unwrap().rule;
        let (red, blue) = [(0, 0), (1, 0), (0, 1), (1, 1)]
            .into_iter()
            .find(|&(r, b)| rule.evaluate(Presses::new(r, b)) == Ok(false))
            .unwrap();
        for _ in 0..red {
            app.press(Button::Red);
        }
        for _ in 0..blue {
            app.press(Button::Blue);
        }
        app.stop_round(t0 + Duration::from_millis(900));
    }

    #[test]
    fn test_finished_game_updates_and_persists_everything() {
        let store = Rc::new(MemoryStore::new());
        let mut app = app_with(store.clone());
        let t0 = Instant::now();
        play_to_game_over(&mut app, t0);

        assert_eq!(app.screen, AppScreen::GameResult);
        assert_eq!(app.stats.total_games, 1);
        assert_eq!(app.stats.high_score, 10);
        let outcome = app.last_outcome.as_ref().unwrap();
        assert_eq!(outcome.outcome, SessionOutcome::GameOver);
        assert_eq!(outcome.reason, Some(GameOverReason::WrongPresses));
        assert_eq!(outcome.summary.rounds_completed, 2);
        assert!(outcome.new_high_score);
        assert!(outcome.unlocked.iter().any(|a| a.id == "firstSteps"));

        assert!(store.contains(STATS_KEY));
        assert!(store.contains(ACHIEVEMENTS_KEY));
        let reloaded = app_with(store);
        assert_eq!(reloaded.stats, app.stats);
        assert_eq!(reloaded.achievements, app.achievements);
    }

    #[test]
    fn test_unlocks_are_reported_as_an_event() {
        let mut app = app_with(Rc::new(MemoryStore::new()));
        play_to_game_over(&mut app, Instant::now());

        let events = app.drain_events();
        let game_over_at = events
            .iter()
            .position(|e| matches!(e, GameEvent::GameOver { .. }))
            .unwrap();
        match events.last() {
            Some(GameEvent::AchievementsUnlocked { achievements }) => {
                assert!(achievements.iter().any(|a| a.id == "firstSteps"));
                assert_eq!(achievements, &app.last_outcome.as_ref().unwrap().unlocked);
            }
            other => panic!("expected unlocks last, got {other:?}"),
        }
        assert_eq!(game_over_at, events.len() - 2);
        assert!(app.drain_events().is_empty());

        // Nothing new to unlock the second time round.
        play_to_game_over(&mut app, Instant::now());
        assert!(
            !app.drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::AchievementsUnlocked { .. }))
        );
    }

    #[test]
    fn test_timer_follows_countdown_events() {
        let mut app = app_with(Rc::new(MemoryStore::new()));
        let t0 = Instant::now();
        app.start_game(t0);
        assert!(app.timer.is_none());

        app.tick(t0 + Duration::from_millis(500));
        let budget = app.engine.state().time_budget_ms as u64;
        assert_eq!(app.timer.unwrap().remaining_ms, budget - 500);

        app.stop_round(t0 + Duration::from_millis(600));
        assert!(app.timer.is_none());
    }

    #[test]
    fn test_storage_failure_does_not_interrupt_play() {
        let store = Rc::new(MemoryStore::new());
        store.set_failing(true);
        let mut app = app_with(store.clone());
        play_to_game_over(&mut app, Instant::now());

        assert_eq!(app.screen, AppScreen::GameResult);
        assert_eq!(app.stats.total_games, 1);
        assert!(app.last_error.is_none());
        store.set_failing(false);
        assert!(!store.contains(STATS_KEY));
    }

    #[test]
    fn test_reset_progress() {
        let store = Rc::new(MemoryStore::new());
        let mut app = app_with(store.clone());
        play_to_game_over(&mut app, Instant::now());
        app.reset_progress();
        assert_eq!(app.stats, PlayerStats::default());
        assert_eq!(app.achievements.unlocked().count(), 0);
        assert!(!store.contains(STATS_KEY));
    }

    #[test]
    fn test_leaving_mid_game_discards_it() {
        let store = Rc::new(MemoryStore::new());
        let mut app = app_with(store);
        app.start_game(Instant::now());
        assert_eq!(app.engine.phase(), Phase::RoundActive);
        app.go_to_menu();
        assert_eq!(app.engine.phase(), Phase::Idle);
        assert_eq!(app.stats.total_games, 0);
    }
}
