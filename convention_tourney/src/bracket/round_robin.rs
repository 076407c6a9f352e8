//! Round robin generation: every pair of groups meets once.

use super::SeedingPlan;
use crate::competition::{GroupId, MatchSeed};

/// Number of matches in a round robin of `group_count` groups
pub fn match_count(group_count: usize) -> usize {
    group_count * group_count.saturating_sub(1) / 2
}

/// One round 1 match per unordered pair, numbered in lexicographic pair order
pub(super) fn generate(seeds: &[GroupId]) -> SeedingPlan {
    let mut matches = Vec::with_capacity(match_count(seeds.len()));
    let mut number = 1;
    for (i, &home) in seeds.iter().enumerate() {
        for &away in &seeds[i + 1..] {
            let seed = MatchSeed::new(1, number);
            matches.push(seed.with_groups(Some(home), Some(away)));
            number += 1;
        }
    }

    SeedingPlan {
        matches,
        notices: Vec::new(),
    }
}
