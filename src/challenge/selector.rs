use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::challenge::catalog::{Catalog, Challenge, MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::error::GameError;

pub const DEFAULT_RECENT_WINDOW: usize = 5;

/// Highest difficulty allowed in `round`: ramps every 10 rounds, capped at 5.
pub fn max_difficulty(round: u32) -> u8 {
    let ramp = round.div_ceil(10).min(MAX_DIFFICULTY as u32) as u8;
    ramp.max(MIN_DIFFICULTY)
}

/// Bounded FIFO of recently selected challenge ids (the anti-repeat window).
#[derive(Clone, Debug)]
pub struct RecentChallenges {
    ids: VecDeque<&'static str>,
    cap: usize,
}

impl RecentChallenges {
    pub fn new(cap: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(cap + 1),
            cap,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|recent| *recent == id)
    }

    pub fn push(&mut self, id: &'static str) {
        self.ids.push_back(id);
        while self.ids.len() > self.cap {
            self.ids.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ids.iter().copied()
    }
}

impl Default for RecentChallenges {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_WINDOW)
    }
}

/// Pick the challenge for `round`.
///
/// Candidates are filtered by the difficulty cap and the anti-repeat window.
/// When nothing survives, the repeat filter is dropped first (and the window
/// cleared); only if the capped pool is itself empty is the cap dropped too.
pub fn select_next<'c, R: Rng + ?Sized>(
    round: u32,
    catalog: &'c Catalog,
    recent: &mut RecentChallenges,
    rng: &mut R,
) -> Result<&'c Challenge, GameError> {
    if catalog.is_empty() {
        return Err(GameError::EmptyCatalog);
    }

    let cap = max_difficulty(round);
    let within_cap: Vec<&Challenge> = catalog
        .challenges()
        .iter()
        .filter(|c| c.difficulty <= cap)
        .collect();

    let mut candidates: Vec<&Challenge> = within_cap
        .iter()
        .copied()
        .filter(|c| !recent.contains(c.id))
        .collect();

    if candidates.is_empty() {
        recent.clear();
        if within_cap.is_empty() {
            log::debug!("no challenge at difficulty <= {cap}; using the full catalog");
            candidates = catalog.challenges().iter().collect();
        } else {
            log::debug!("anti-repeat window exhausted at difficulty <= {cap}; allowing repeats");
            candidates = within_cap;
        }
    }

    let chosen = candidates
        .choose(rng)
        .copied()
        .ok_or(GameError::EmptyCatalog)?;
    recent.push(chosen.id);
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::catalog::{CHALLENGES, Category};
    use crate::challenge::rule::{Bound, Rule};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn challenge(id: &'static str, difficulty: u8) -> Challenge {
        Challenge::new(
            id,
            id,
            difficulty,
            Category::NoPress,
            Rule::counts(Bound::Exactly(0), Bound::Exactly(0)),
        )
    }

    #[test]
    fn test_max_difficulty_ramp() {
        assert_eq!(max_difficulty(1), 1);
        assert_eq!(max_difficulty(10), 1);
        assert_eq!(max_difficulty(11), 2);
        assert_eq!(max_difficulty(20), 2);
        assert_eq!(max_difficulty(21), 3);
        assert_eq!(max_difficulty(41), 5);
        assert_eq!(max_difficulty(50), 5);
        assert_eq!(max_difficulty(500), 5);
        assert_eq!(max_difficulty(0), 1);
    }

    #[test]
    fn test_recent_window_evicts_oldest() {
        let mut recent = RecentChallenges::new(3);
        for id in ["a", "b", "c", "d"] {
            recent.push(id);
        }
        assert_eq!(recent.iter().collect::<Vec<_>>(), vec!["b", "c", "d"]);
        assert!(!recent.contains("a"));
    }

    #[test]
    fn test_respects_difficulty_cap() {
        let catalog = Catalog::standard();
        let mut recent = RecentChallenges::default();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let c = select_next(5, &catalog, &mut recent, &mut rng).unwrap();
            assert_eq!(c.difficulty, 1);
        }
        for _ in 0..200 {
            let c = select_next(25, &catalog, &mut recent, &mut rng).unwrap();
            assert!(c.difficulty <= 3);
        }
    }

    #[test]
    fn test_no_repeat_within_window() {
        let catalog = Catalog::standard();
        let mut recent = RecentChallenges::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let picks: Vec<&str> = (0..300)
            .map(|_| select_next(1, &catalog, &mut recent, &mut rng).unwrap().id)
            .collect();
        for (i, id) in picks.iter().enumerate() {
            let start = i.saturating_sub(DEFAULT_RECENT_WINDOW);
            assert!(
                !picks[start..i].contains(id),
                "{id} repeated within the window at pick {i}"
            );
        }
    }

    #[test]
    fn test_small_pool_relaxes_repeat_filter_but_keeps_cap() {
        let catalog = Catalog::new(vec![challenge("easy-a", 1), challenge("easy-b", 1), challenge("hard", 5)]);
        let mut recent = RecentChallenges::default();
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            let c = select_next(1, &catalog, &mut recent, &mut rng).unwrap();
            assert_ne!(c.id, "hard");
        }
    }

    #[test]
    fn test_relaxation_clears_window() {
        let catalog = Catalog::new(vec![challenge("only", 1)]);
        let mut recent = RecentChallenges::default();
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(select_next(1, &catalog, &mut recent, &mut rng).unwrap().id, "only");
        assert_eq!(select_next(1, &catalog, &mut recent, &mut rng).unwrap().id, "only");
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn test_drops_cap_when_nothing_is_easy_enough() {
        let catalog = Catalog::new(vec![challenge("hard-a", 4), challenge("hard-b", 5)]);
        let mut recent = RecentChallenges::default();
        recent.push("stale");
        let mut rng = SmallRng::seed_from_u64(9);
        let c = select_next(1, &catalog, &mut recent, &mut rng).unwrap();
        assert!(c.difficulty >= 4);
        assert!(!recent.contains("stale"));
    }

    #[test]
    fn test_empty_catalog_is_an_error() {
        let catalog = Catalog::new(Vec::new());
        let mut recent = RecentChallenges::default();
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(matches!(
            select_next(1, &catalog, &mut recent, &mut rng),
            Err(GameError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_selection_covers_the_capped_pool() {
        let catalog = Catalog::new(CHALLENGES.to_vec());
        let pool: Vec<&str> = CHALLENGES.iter().filter(|c| c.difficulty == 1).map(|c| c.id).collect();
        let mut recent = RecentChallenges::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(select_next(3, &catalog, &mut recent, &mut rng).unwrap().id);
        }
        assert_eq!(seen.len(), pool.len());
    }

    proptest! {
        #[test]
        fn prop_max_difficulty_ramp(round in 1u32..1_000) {
            let expected = round.div_ceil(10).min(5) as u8;
            prop_assert_eq!(max_difficulty(round), expected);
            prop_assert!(max_difficulty(round + 1) >= max_difficulty(round));
        }

        #[test]
        fn prop_selection_within_cap(round in 1u32..60, seed in any::<u64>()) {
            let catalog = Catalog::standard();
            let mut recent = RecentChallenges::default();
            let mut rng = SmallRng::seed_from_u64(seed);
            let chosen = select_next(round, &catalog, &mut recent, &mut rng).unwrap();
            prop_assert!(chosen.difficulty <= max_difficulty(round));
        }
    }
}
