//! Choosing which ranked candidates to show.
//!
//! Pure functions over a ranking snapshot. They never fail: short supply
//! yields fewer results, and `n == 0` yields none.


use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::cache::ScoredEntity;

/// Up to `n` entries whose ids are not in `shown`.
///
/// Rank order is kept unless `randomize` is set, in which case the remaining
/// entries are shuffled before truncating.
pub fn top_n_excluding<R: Rng + ?Sized>(
    ranked: &[ScoredEntity],
    n: usize,
    shown: &HashSet<String>,
    randomize: bool,
    rng: &mut R,
) -> Vec<ScoredEntity> {
    if n == 0 {
        return Vec::new();
    }

    let remaining = ranked.iter().filter(|e| !shown.contains(&e.entity_id));
    if !randomize {
        return remaining.take(n).cloned().collect();
    }

    let mut pool: Vec<&ScoredEntity> = remaining.collect();
    pool.shuffle(rng);
    pool.into_iter().take(n).cloned().collect()
}

/// A contiguous run of `n` entries starting at a uniformly random offset.
///
/// Rankings of `n` entries or fewer come back whole.
pub fn random_block<R: Rng + ?Sized>(
    ranked: &[ScoredEntity],
    n: usize,
    rng: &mut R,
) -> Vec<ScoredEntity> {
    if n == 0 {
        return Vec::new();
    }
    if ranked.len() <= n {
        return ranked.to_vec();
    }

    let start = rng.gen_range(0..=ranked.len() - n);
    ranked[start..start + n].to_vec()
}

/// How a recommendation call picks from the ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Best entries not yet shown, optionally shuffled.
    Top {
        shown: HashSet<String>,
        randomize: bool,
    },
    /// A random contiguous slice of the ranking.
    RandomBlock,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::Top {
            shown: HashSet::new(),
            randomize: false,
        }
    }
}

impl SelectionPolicy {
    pub fn select<R: Rng + ?Sized>(
        &self,
        ranked: &[ScoredEntity],
        n: usize,
        rng: &mut R,
    ) -> Vec<ScoredEntity> {
        match self {
            SelectionPolicy::Top { shown, randomize } => {
                top_n_excluding(ranked, n, shown, *randomize, rng)
            }
            SelectionPolicy::RandomBlock => random_block(ranked, n, rng),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SelectionPolicy::Top { .. } => "top",
            SelectionPolicy::RandomBlock => "block",
        }
    }
}
