use std::time::{Duration, Instant};

/// Cadence used when none is configured.
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Urgency band derived from the fraction of time remaining.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerPhase {
    Normal,
    Warning,
    Danger,
    Critical,
}

impl TimerPhase {
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction < 0.12 {
            TimerPhase::Critical
        } else if fraction > 0.5 {
            TimerPhase::Normal
        } else if fraction > 0.25 {
            TimerPhase::Warning
        } else {
            TimerPhase::Danger
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimerProgress {
    pub timer: TimerId,
    pub remaining_ms: u64,
    pub duration_ms: u64,
    pub fraction_remaining: f64,
}

impl TimerProgress {
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_ms.div_ceil(1000)
    }

    pub fn phase(&self) -> TimerPhase {
        TimerPhase::from_fraction(self.fraction_remaining)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimerSignal {
    Progress(TimerProgress),
    Expired(TimerId),
}

#[derive(Clone, Copy, Debug)]
struct Countdown {
    id: TimerId,
    started_at: Instant,
    duration: Duration,
    next_tick_at: Instant,
}

impl Countdown {
    fn snapshot(&self, now: Instant) -> TimerProgress {
        let elapsed = now.saturating_duration_since(self.started_at);
        let remaining = self.duration.saturating_sub(elapsed);
        let fraction = if self.duration.is_zero() {
            0.0
        } else {
            remaining.as_secs_f64() / self.duration.as_secs_f64()
        };
        TimerProgress {
            timer: self.id,
            remaining_ms: remaining.as_millis() as u64,
            duration_ms: self.duration.as_millis() as u64,
            fraction_remaining: fraction.clamp(0.0, 1.0),
        }
    }
}

/// Countdown for a single round.
///
/// Elapsed time is always measured from the captured start instant, so late
/// or irregular polls never accumulate drift. Expiry is reported exactly once.
#[derive(Debug)]
pub struct RoundTimer {
    cadence: Duration,
    next_id: u64,
    countdown: Option<Countdown>,
}

impl RoundTimer {
    pub fn new(cadence: Duration) -> Self {
        Self {
            cadence: cadence.max(Duration::from_millis(1)),
            next_id: 0,
            countdown: None,
        }
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    /// Start counting down `duration` from `now`, replacing any running countdown.
    pub fn start(&mut self, duration: Duration, now: Instant) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.countdown = Some(Countdown {
            id,
            started_at: now,
            duration,
            next_tick_at: now,
        });
        id
    }

    /// Cancel the running countdown. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        self.countdown.take().is_some()
    }

    pub fn is_running(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn current(&self) -> Option<TimerId> {
        self.countdown.map(|c| c.id)
    }

    /// Current progress without consuming a cadence slot.
    pub fn progress(&self, now: Instant) -> Option<TimerProgress> {
        self.countdown.map(|c| c.snapshot(now))
    }

    /// Advance the timer to `now`.
    ///
    /// Yields `Expired` once the duration has fully elapsed (and stops the
    /// timer), a `Progress` signal when a cadence boundary has been crossed,
    /// and `None` otherwise.
    pub fn poll(&mut self, now: Instant) -> Option<TimerSignal> {
        let countdown = self.countdown.as_mut()?;
        let elapsed = now.saturating_duration_since(countdown.started_at);

        if elapsed >= countdown.duration {
            let id = countdown.id;
            self.countdown = None;
            return Some(TimerSignal::Expired(id));
        }

        if now < countdown.next_tick_at {
            return None;
        }

        let cadence_nanos = self.cadence.as_nanos();
        let ticks_elapsed = elapsed.as_nanos() / cadence_nanos + 1;
        countdown.next_tick_at =
            countdown.started_at + Duration::from_nanos((ticks_elapsed * cadence_nanos) as u64);

        Some(TimerSignal::Progress(countdown.snapshot(now)))
    }
}

impl Default for RoundTimer {
    fn default() -> Self {
        Self::new(DEFAULT_CADENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_progress_then_single_expiry() {
        let t0 = Instant::now();
        let mut timer = RoundTimer::new(ms(50));
        let id = timer.start(ms(200), t0);

        match timer.poll(t0) {
            Some(TimerSignal::Progress(p)) => {
                assert_eq!(p.timer, id);
                assert_eq!(p.remaining_ms, 200);
                assert!((p.fraction_remaining - 1.0).abs() < 1e-9);
            }
            other => panic!("expected progress, got {other:?}"),
        }

        match timer.poll(t0 + ms(100)) {
            Some(TimerSignal::Progress(p)) => {
                assert_eq!(p.remaining_ms, 100);
                assert!((p.fraction_remaining - 0.5).abs() < 1e-9);
            }
            other => panic!("expected progress, got {other:?}"),
        }

        assert_eq!(timer.poll(t0 + ms(200)), Some(TimerSignal::Expired(id)));
        assert_eq!(timer.poll(t0 + ms(250)), None);
        assert_eq!(timer.poll(t0 + ms(900)), None);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_polls_between_cadence_boundaries_are_quiet() {
        let t0 = Instant::now();
        let mut timer = RoundTimer::new(ms(50));
        timer.start(ms(1000), t0);
        assert!(timer.poll(t0).is_some());
        assert_eq!(timer.poll(t0 + ms(10)), None);
        assert_eq!(timer.poll(t0 + ms(49)), None);
        assert!(timer.poll(t0 + ms(50)).is_some());
    }

    #[test]
    fn test_late_polls_do_not_drift() {
        let t0 = Instant::now();
        let mut timer = RoundTimer::new(ms(50));
        timer.start(ms(1000), t0);
        // Irregular, jittery polling: remaining time tracks wall clock exactly.
        for at in [0, 73, 161, 488, 777] {
            match timer.poll(t0 + ms(at)) {
                Some(TimerSignal::Progress(p)) => assert_eq!(p.remaining_ms, 1000 - at),
                other => panic!("expected progress at {at}ms, got {other:?}"),
            }
        }
        assert!(matches!(timer.poll(t0 + ms(1003)), Some(TimerSignal::Expired(_))));
    }

    #[test]
    fn test_stop_is_idempotent_and_cancels() {
        let t0 = Instant::now();
        let mut timer = RoundTimer::default();
        timer.start(ms(100), t0);
        assert!(timer.stop());
        assert!(!timer.stop());
        assert_eq!(timer.poll(t0 + ms(500)), None);
    }

    #[test]
    fn test_restart_replaces_previous_countdown() {
        let t0 = Instant::now();
        let mut timer = RoundTimer::default();
        let first = timer.start(ms(100), t0);
        let second = timer.start(ms(1000), t0 + ms(50));
        assert_ne!(first, second);
        assert_eq!(timer.current(), Some(second));
        // The first countdown would have expired here; the second has not.
        assert!(matches!(timer.poll(t0 + ms(150)), Some(TimerSignal::Progress(_))));
        assert_eq!(
            timer.poll(t0 + ms(1050)),
            Some(TimerSignal::Expired(second))
        );
    }

    #[test]
    fn test_zero_duration_expires_immediately() {
        let t0 = Instant::now();
        let mut timer = RoundTimer::default();
        let id = timer.start(Duration::ZERO, t0);
        assert_eq!(timer.poll(t0), Some(TimerSignal::Expired(id)));
    }

    #[test]
    fn test_phase_bands() {
        assert_eq!(TimerPhase::from_fraction(0.9), TimerPhase::Normal);
        assert_eq!(TimerPhase::from_fraction(0.5), TimerPhase::Warning);
        assert_eq!(TimerPhase::from_fraction(0.3), TimerPhase::Warning);
        assert_eq!(TimerPhase::from_fraction(0.2), TimerPhase::Danger);
        assert_eq!(TimerPhase::from_fraction(0.05), TimerPhase::Critical);
    }

    #[test]
    fn test_remaining_secs_rounds_up() {
        let t0 = Instant::now();
        let mut timer = RoundTimer::default();
        timer.start(ms(2500), t0);
        let p = timer.progress(t0 + ms(1000)).unwrap();
        assert_eq!(p.remaining_ms, 1500);
        assert_eq!(p.remaining_secs(), 2);
    }
}
