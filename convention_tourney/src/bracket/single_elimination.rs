//! Single elimination generation with byes.

use super::layout::BracketLayout;
use super::{BracketNotice, SeedingPlan};
use crate::competition::{GroupId, MatchSeed};

/// Build every match of a single elimination bracket
///
/// Round 1 pairs seeds in order (1 v 2, 3 v 4, ...); the tail of the seed list
/// takes the byes into round 2. Later rounds are empty placeholders.
pub(super) fn generate(seeds: &[GroupId], layout: &BracketLayout) -> SeedingPlan {
    let mut matches = Vec::with_capacity(layout.total_matches() as usize);

    let paired = (layout.first_round_matches * 2) as usize;
    for (index, pair) in seeds[..paired].chunks_exact(2).enumerate() {
        let seed = MatchSeed::new(1, index as u32 + 1);
        matches.push(seed.with_groups(Some(pair[0]), Some(pair[1])));
    }

    let round_two_start = matches.len();
    for round in 2..=layout.rounds {
        for number in 1..=layout.matches_in_round(round) {
            matches.push(MatchSeed::new(round, number));
        }
    }

    for (index, &group) in seeds[paired..].iter().enumerate() {
        if let Some((target, slot)) = layout.bye_target(index as u32) {
            let seed = &mut matches[round_two_start + target.number as usize - 1];
            *seed.slot_mut(slot) = Some(group);
        }
    }

    let notices = matches[round_two_start..]
        .iter()
        .filter(|m| m.round_number == 2)
        .filter_map(|m| match (m.slot_a, m.slot_b) {
            (Some(slot_a), Some(slot_b)) => Some(BracketNotice::ByeVersusBye {
                position: m.position(),
                slot_a,
                slot_b,
            }),
            _ => None,
        })
        .collect();

    SeedingPlan { matches, notices }
}
