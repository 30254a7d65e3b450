use crate::challenge::catalog::{MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::config::DifficultyLevel;

/// Base time budget per challenge difficulty (index 0 = difficulty 1).
pub const BASE_TIME_MS: [u32; 5] = [6500, 6000, 5500, 5000, 4500];

pub const DEFAULT_TIME_FLOOR_MS: u32 = 2000;

/// Rounds up to this one shave time off slowly; later rounds speed up.
const SLOW_RAMP_LAST_ROUND: u32 = 20;
const SLOW_REDUCTION_MS: u32 = 30;
const FAST_REDUCTION_MS: u32 = 60;

pub fn round_points(round: u32) -> u64 {
    10 * round as u64
}

pub fn base_time_ms(difficulty: u8) -> u32 {
    let idx = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY) - MIN_DIFFICULTY;
    BASE_TIME_MS[idx as usize]
}

/// Time allowed for a challenge of `difficulty` in `round`, never below `floor_ms`
/// and non-increasing in `round`.
pub fn round_time_ms(difficulty: u8, round: u32, floor_ms: u32) -> u32 {
    let base = base_time_ms(difficulty);
    let reduction_per_round = if round <= SLOW_RAMP_LAST_ROUND {
        SLOW_REDUCTION_MS
    } else {
        FAST_REDUCTION_MS
    };
    let max_reduction = base.saturating_sub(floor_ms);
    let reduction = round
        .saturating_sub(1)
        .saturating_mul(reduction_per_round)
        .min(max_reduction);
    base.saturating_sub(reduction).max(floor_ms)
}

/// [`round_time_ms`] scaled by the player's difficulty setting, still floored.
pub fn adjusted_round_time_ms(
    difficulty: u8,
    round: u32,
    floor_ms: u32,
    level: DifficultyLevel,
) -> u32 {
    let raw = round_time_ms(difficulty, round, floor_ms);
    let scaled = (raw as f64 * level.time_modifier()).round() as u32;
    scaled.max(floor_ms)
}
