use std::time::{Duration, Instant};

use chrono::Utc;
use rand::Rng;
use rand::rngs::SmallRng;

use crate::challenge::catalog::{Catalog, Challenge};
use crate::challenge::rule::{Button, Presses};
use crate::challenge::selector::{RecentChallenges, max_difficulty, select_next};
use crate::config::{Config, DifficultyLevel};
use crate::engine::scoring::{adjusted_round_time_ms, round_points};
use crate::engine::timer::{RoundTimer, TimerId, TimerProgress, TimerSignal};
use crate::error::GameError;
use crate::session::achievements::Achievement;
use crate::session::summary::{GameSessionSummary, SessionOutcome, SessionTally};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    RoundActive,
    /// Between a resolved round and the next one (or the end of the game).
    Resolving,
    GameOver,
    Victory,
}

impl Phase {
    pub fn is_finished(self) -> bool {
        matches!(self, Phase::GameOver | Phase::Victory)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOverReason {
    /// The presses did not satisfy the challenge.
    WrongPresses,
    /// The challenge rule could not be evaluated.
    RuleFailed,
}

impl GameOverReason {
    pub fn message(self) -> &'static str {
        match self {
            GameOverReason::WrongPresses => "Wrong response",
            GameOverReason::RuleFailed => "Challenge could not be checked",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    RoundStarted {
        round: u32,
        challenge: Challenge,
        time_budget_ms: u32,
    },
    /// Emitted at the timer's cadence while a round is running.
    Countdown {
        round: u32,
        progress: TimerProgress,
    },
    RoundResolved {
        round: u32,
        success: bool,
        presses: Presses,
        reaction_ms: u64,
        score: u64,
    },
    GameOver {
        reason: GameOverReason,
        summary: GameSessionSummary,
    },
    Victory {
        final_score: u64,
        final_round: u32,
        summary: GameSessionSummary,
    },
    /// Raised by the app layer once a finished game has been evaluated.
    AchievementsUnlocked { achievements: Vec<Achievement> },
}

/// Mutable state of the game in progress.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundState {
    /// The round being played, or about to be played.
    pub round: u32,
    pub score: u64,
    pub presses: Presses,
    pub challenge: Option<Challenge>,
    pub time_budget_ms: u32,
    /// True only while presses are accepted and the round is unresolved.
    pub active: bool,
    pub streak: u32,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            round: 1,
            score: 0,
            presses: Presses::default(),
            challenge: None,
            time_budget_ms: 0,
            active: false,
            streak: 0,
        }
    }
}

/// The game state machine: one instance per game, driven by presses and
/// clock ticks. All timing comes from the `Instant`s passed in.
pub struct RoundEngine<R = SmallRng> {
    config: Config,
    catalog: Catalog,
    rng: R,
    recent: RecentChallenges,
    timer: RoundTimer,
    round_timer: Option<TimerId>,
    phase: Phase,
    state: RoundState,
    tally: Option<SessionTally>,
    round_started_at: Option<Instant>,
    next_round_at: Option<Instant>,
    events: Vec<GameEvent>,
}

impl<R: Rng> RoundEngine<R> {
    /// Fails fast on an empty catalog: no round could ever start.
    pub fn new(config: Config, catalog: Catalog, rng: R) -> Result<Self, GameError> {
        if catalog.is_empty() {
            return Err(GameError::EmptyCatalog);
        }
        let recent = RecentChallenges::new(config.anti_repeat_window);
        let timer = RoundTimer::new(Duration::from_millis(config.tick_interval_ms));
        Ok(Self {
            config,
            catalog,
            rng,
            recent,
            timer,
            round_timer: None,
            phase: Phase::Idle,
            state: RoundState::default(),
            tally: None,
            round_started_at: None,
            next_round_at: None,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn timer_progress(&self, now: Instant) -> Option<TimerProgress> {
        if self.phase == Phase::RoundActive {
            self.timer.progress(now)
        } else {
            None
        }
    }

    /// Takes effect from the next round started.
    pub fn set_difficulty(&mut self, level: DifficultyLevel) {
        self.config.difficulty = level;
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin a new game at round 1. Ignored while a game is running.
    pub fn start(&mut self, now: Instant) -> Result<(), GameError> {
        if matches!(self.phase, Phase::RoundActive | Phase::Resolving) {
            return Ok(());
        }
        self.reset();
        self.tally = Some(SessionTally::new(now, Utc::now()));
        log::info!("game started ({} difficulty)", self.config.difficulty.as_str());
        self.begin_round(now, None)
    }

    /// Begin a new game directly at `round` with a fixed first challenge.
    /// The score starts as if every earlier round had been won.
    pub fn start_at(&mut self, round: u32, challenge: Challenge, now: Instant) -> Result<(), GameError> {
        if matches!(self.phase, Phase::RoundActive | Phase::Resolving) {
            return Ok(());
        }
        self.reset();
        let round = round.max(1);
        self.state.round = round;
        self.state.score = (1..round).map(round_points).sum();
        self.tally = Some(SessionTally::new(now, Utc::now()));
        self.begin_round(now, Some(challenge))
    }

    /// Back to `Idle`, discarding the game in progress.
    pub fn restart(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.timer.stop();
        self.round_timer = None;
        self.recent.clear();
        self.phase = Phase::Idle;
        self.state = RoundState::default();
        self.tally = None;
        self.round_started_at = None;
        self.next_round_at = None;
        self.events.clear();
    }

    fn begin_round(&mut self, now: Instant, forced: Option<Challenge>) -> Result<(), GameError> {
        let round = self.state.round;
        let challenge = match forced {
            Some(challenge) => {
                self.recent.push(challenge.id);
                challenge
            }
            None => *select_next(round, &self.catalog, &mut self.recent, &mut self.rng)?,
        };
        let budget = adjusted_round_time_ms(
            challenge.difficulty,
            round,
            self.config.time_floor_ms,
            self.config.difficulty,
        );

        self.state.presses = Presses::default();
        self.state.challenge = Some(challenge);
        self.state.time_budget_ms = budget;
        self.state.active = true;
        self.round_started_at = Some(now);
        self.next_round_at = None;
        self.round_timer = Some(self.timer.start(Duration::from_millis(budget as u64), now));
        self.phase = Phase::RoundActive;

        log::debug!(
            "round {round}: '{}' (difficulty {}, cap {}), {budget}ms",
            challenge.id,
            challenge.difficulty,
            max_difficulty(round)
        );
        self.events.push(GameEvent::RoundStarted {
            round,
            challenge,
            time_budget_ms: budget,
        });
        Ok(())
    }

    pub fn press(&mut self, button: Button) {
        if self.phase == Phase::RoundActive && self.state.active {
            self.state.presses.press(button);
        }
    }

    pub fn press_red(&mut self) {
        self.press(Button::Red);
    }

    pub fn press_blue(&mut self) {
        self.press(Button::Blue);
    }

    /// Advance the clock: resolves the round on timer expiry and starts the
    /// next round once the transition delay has passed.
    pub fn tick(&mut self, now: Instant) -> Result<(), GameError> {
        match self.phase {
            Phase::RoundActive => match self.timer.poll(now) {
                Some(TimerSignal::Expired(id)) if self.round_timer == Some(id) => self.resolve(now),
                Some(TimerSignal::Progress(progress)) => {
                    self.events.push(GameEvent::Countdown {
                        round: self.state.round,
                        progress,
                    });
                    Ok(())
                }
                _ => Ok(()),
            },
            Phase::Resolving => match self.next_round_at {
                Some(at) if now >= at => self.begin_round(now, None),
                _ => Ok(()),
            },
            Phase::Idle | Phase::GameOver | Phase::Victory => Ok(()),
        }
    }

    /// Resolve the current round now instead of waiting for the timer.
    pub fn stop_round(&mut self, now: Instant) -> Result<(), GameError> {
        self.resolve(now)
    }

    fn resolve(&mut self, now: Instant) -> Result<(), GameError> {
        if !self.state.active {
            return Ok(());
        }
        self.state.active = false;
        self.timer.stop();
        self.round_timer = None;
        self.phase = Phase::Resolving;

        let Some(challenge) = self.state.challenge else {
            return Ok(());
        };
        let round = self.state.round;
        let presses = self.state.presses;
        let reaction_ms = self
            .round_started_at
            .map_or(0, |start| now.saturating_duration_since(start).as_millis() as u64);

        let verdict = challenge.rule.evaluate(presses);
        let success = verdict == Ok(true);
        if let Some(tally) = self.tally.as_mut() {
            if success {
                tally.record_success(reaction_ms);
            } else {
                tally.record_failure(reaction_ms);
            }
        }

        if success {
            self.state.score += round_points(round);
            self.state.streak += 1;
            self.state.round += 1;
        } else {
            self.state.streak = 0;
        }
        log::debug!(
            "round {round} resolved: success={success} presses={}/{} score={}",
            presses.red,
            presses.blue,
            self.state.score
        );
        self.events.push(GameEvent::RoundResolved {
            round,
            success,
            presses,
            reaction_ms,
            score: self.state.score,
        });

        match verdict {
            Ok(true) if round >= self.config.win_round => {
                self.finish(SessionOutcome::Victory, GameOverReason::WrongPresses, now);
                Ok(())
            }
            Ok(true) => {
                let delay = Duration::from_millis(self.config.round_transition_ms);
                if delay.is_zero() {
                    self.begin_round(now, None)
                } else {
                    self.next_round_at = Some(now + delay);
                    Ok(())
                }
            }
            Ok(false) => {
                self.finish(SessionOutcome::GameOver, GameOverReason::WrongPresses, now);
                Ok(())
            }
            Err(source) => {
                log::error!("rule for '{}' failed: {source}", challenge.id);
                self.finish(SessionOutcome::GameOver, GameOverReason::RuleFailed, now);
                Err(GameError::Rule {
                    challenge: challenge.id.to_string(),
                    source,
                })
            }
        }
    }

    fn finish(&mut self, outcome: SessionOutcome, reason: GameOverReason, now: Instant) {
        let score = self.state.score;
        let summary = match &self.tally {
            Some(tally) => tally.summarize(score, now, outcome),
            None => SessionTally::new(now, Utc::now()).summarize(score, now, outcome),
        };
        self.next_round_at = None;

        match outcome {
            SessionOutcome::Victory => {
                let final_round = self.state.round.saturating_sub(1);
                log::info!("victory at round {final_round} with {score} points");
                self.phase = Phase::Victory;
                self.events.push(GameEvent::Victory {
                    final_score: score,
                    final_round,
                    summary,
                });
            }
            SessionOutcome::GameOver => {
                log::info!(
                    "game over at round {} with {score} points ({})",
                    self.state.round,
                    reason.message()
                );
                self.phase = Phase::GameOver;
                self.events.push(GameEvent::GameOver { reason, summary });
            }
        }
    }
}
