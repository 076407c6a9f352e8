//! Bracket generation from an ordered list of seeded groups.
//!
//! This module provides:
//! - Single elimination brackets with byes for non power-of-two rosters
//! - Round robin brackets (every pair meets once)
//! - The fixed winner-to-slot feed map used to advance winners
//! - Bracket previews and round naming for the results board
//!
//! Generation is a pure function of the discipline and the seed order: the same
//! input always yields the same rounds, match numbers and initial slots.
//!
//! ## Example
//!
//! ```
//! use convention_tourney::bracket::generate;
//! use convention_tourney::competition::BracketType;
//! use uuid::Uuid;
//!
//! let seeds: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
//! let bracket = generate(BracketType::SingleElimination, &seeds).unwrap();
//!
//! assert_eq!(bracket.matches.len(), 4);
//! assert_eq!(bracket.total_rounds(), 3);
//! ```

pub mod feeds;
pub mod layout;
pub mod round_robin;
pub mod single_elimination;

pub use feeds::{Feed, FeedMap};
pub use layout::{BracketLayout, round_name};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::competition::{BracketType, GroupId, MatchRef, MatchSeed, TourneyError, TourneyResult};

/// Something about a generated bracket an administrator has to decide on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BracketNotice {
    /// Two bye groups meet in round 2 without either having played.
    /// The match is left Scheduled; nothing is auto-completed.
    ByeVersusBye {
        position: MatchRef,
        slot_a: GroupId,
        slot_b: GroupId,
    },
}

/// Matches and notices produced by one discipline
pub(crate) struct SeedingPlan {
    pub matches: Vec<MatchSeed>,
    pub notices: Vec<BracketNotice>,
}

/// A freshly generated bracket, ready for bulk insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub bracket_type: BracketType,
    /// Single elimination shape (None for round robin)
    pub layout: Option<BracketLayout>,
    /// Ordered by round, then match number
    pub matches: Vec<MatchSeed>,
    pub feeds: FeedMap,
    pub notices: Vec<BracketNotice>,
}

impl Bracket {
    pub fn total_rounds(&self) -> u32 {
        self.matches.iter().map(|m| m.round_number).max().unwrap_or(0)
    }

    pub fn round(&self, round: u32) -> impl Iterator<Item = &MatchSeed> {
        self.matches.iter().filter(move |m| m.round_number == round)
    }

    pub fn get(&self, position: MatchRef) -> Option<&MatchSeed> {
        self.matches.iter().find(|m| m.position() == position)
    }
}

/// Check the seed list: at least two groups, no group twice
pub fn validate_seeds(seeds: &[GroupId]) -> TourneyResult<()> {
    if seeds.len() < 2 {
        return Err(TourneyError::invalid(
            "seeds",
            format!("at least two groups are required, got {}", seeds.len()),
        ));
    }
    let mut seen = HashSet::with_capacity(seeds.len());
    for group in seeds {
        if !seen.insert(group) {
            return Err(TourneyError::invalid(
                "seeds",
                format!("group {group} is seeded more than once"),
            ));
        }
    }
    Ok(())
}

/// Generate every match of a bracket
///
/// # Arguments
///
/// * `bracket_type` - Discipline to generate
/// * `seeds` - Distinct groups in seeding order (position 0 is seed 1)
///
/// # Errors
///
/// * `InvalidInput` - fewer than two seeds, or a duplicated seed
/// * `Unsupported` - Double Elimination
pub fn generate(bracket_type: BracketType, seeds: &[GroupId]) -> TourneyResult<Bracket> {
    let (layout, plan, feeds) = match bracket_type {
        BracketType::DoubleElimination => return Err(TourneyError::Unsupported(bracket_type)),
        BracketType::SingleElimination => {
            validate_seeds(seeds)?;
            let layout = BracketLayout::for_groups(seeds.len())?;
            let plan = single_elimination::generate(seeds, &layout);
            (Some(layout), plan, FeedMap::for_layout(&layout))
        }
        BracketType::RoundRobin => {
            validate_seeds(seeds)?;
            (None, round_robin::generate(seeds), FeedMap::empty())
        }
    };

    for notice in &plan.notices {
        let BracketNotice::ByeVersusBye { position, .. } = notice;
        log::warn!("Bracket match {position} pairs two bye groups and needs review");
    }

    Ok(Bracket {
        bracket_type,
        layout,
        matches: plan.matches,
        feeds,
        notices: plan.notices,
    })
}

/// Random seeding order, optionally limited to the first `limit` groups drawn
pub fn shuffle_seeds<R: Rng + ?Sized>(
    groups: &[GroupId],
    limit: Option<usize>,
    rng: &mut R,
) -> Vec<GroupId> {
    let mut seeds = groups.to_vec();
    seeds.shuffle(rng);
    if let Some(limit) = limit {
        seeds.truncate(limit);
    }
    seeds
}
