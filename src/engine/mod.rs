pub mod round;
pub mod scoring;
pub mod timer;

pub use round::{GameEvent, Phase, RoundEngine, RoundState};
pub use timer::{RoundTimer, TimerPhase, TimerProgress, TimerSignal};
