//! Fixed winner-to-slot mapping between rounds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::layout::BracketLayout;
use crate::competition::{BracketType, Match, MatchRef, Slot, TourneyError, TourneyResult};

/// The winner of `from` fills `slot` of `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub from: MatchRef,
    pub to: MatchRef,
    pub slot: Slot,
}

/// Every feed of a bracket, keyed by source match
///
/// Each source writes to exactly one fixed slot, so filling slots is
/// commutative regardless of the order in which matches complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMap {
    targets: BTreeMap<MatchRef, (MatchRef, Slot)>,
}

impl FeedMap {
    /// Round robin brackets have no feeds
    pub fn empty() -> Self {
        Self::default()
    }

    /// All feeds of a single elimination bracket
    pub fn for_layout(layout: &BracketLayout) -> Self {
        let mut targets = BTreeMap::new();
        for round in 1..layout.rounds {
            for number in 1..=layout.matches_in_round(round) {
                if let Some(target) = layout.winner_target(round, number) {
                    targets.insert(MatchRef::new(round, number), target);
                }
            }
        }
        Self { targets }
    }

    /// Rebuild the feed map of a persisted bracket
    pub fn for_matches(bracket_type: BracketType, matches: &[Match]) -> TourneyResult<Self> {
        match bracket_type {
            BracketType::RoundRobin => Ok(Self::empty()),
            BracketType::DoubleElimination => Err(TourneyError::Unsupported(bracket_type)),
            BracketType::SingleElimination => {
                if matches.is_empty() {
                    return Ok(Self::empty());
                }
                let round_size = |round: u32| {
                    let count = matches.iter().filter(|m| m.round_number == round).count();
                    count as u32
                };
                let layout = BracketLayout::from_round_sizes(round_size(1), round_size(2))?;
                Ok(Self::for_layout(&layout))
            }
        }
    }

    /// Where the winner of `from` goes, if anywhere
    pub fn target(&self, from: MatchRef) -> Option<Feed> {
        self.targets
            .get(&from)
            .map(|&(to, slot)| Feed { from, to, slot })
    }

    /// Matches whose winners feed `to`
    pub fn sources(&self, to: MatchRef) -> Vec<Feed> {
        self.iter().filter(|feed| feed.to == to).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Feed> + '_ {
        self.targets
            .iter()
            .map(|(&from, &(to, slot))| Feed { from, to, slot })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
