//! Single elimination bracket arithmetic.
//!
//! Everything here is derived from the number of seeded groups alone, so the
//! same layout can be rebuilt later from a persisted bracket.

use serde::{Deserialize, Serialize};

use crate::competition::{BracketType, MatchRef, Slot, TourneyError, TourneyResult};

/// Shape of a single elimination bracket for `group_count` seeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketLayout {
    /// Number of seeded groups (N)
    pub group_count: u32,
    /// Next power of two >= N (P)
    pub bracket_size: u32,
    /// Groups advanced straight to round 2 (B = P - N)
    pub byes: u32,
    /// Matches played in round 1 (F = (N - B) / 2)
    pub first_round_matches: u32,
    /// Number of rounds including the final (log2 P)
    pub rounds: u32,
}

impl BracketLayout {
    /// Compute the layout for `group_count` seeds
    pub fn for_groups(group_count: usize) -> TourneyResult<Self> {
        if group_count < 2 {
            return Err(TourneyError::invalid(
                "seeds",
                format!("at least two groups are required, got {group_count}"),
            ));
        }
        let n = u32::try_from(group_count)
            .ok()
            .filter(|n| n.checked_next_power_of_two().is_some())
            .ok_or_else(|| TourneyError::invalid("seeds", "too many groups"))?;

        let bracket_size = n.next_power_of_two();
        let byes = bracket_size - n;

        Ok(Self {
            group_count: n,
            bracket_size,
            byes,
            first_round_matches: (n - byes) / 2,
            rounds: bracket_size.trailing_zeros(),
        })
    }

    /// Rebuild the layout from the persisted size of rounds 1 and 2
    ///
    /// `second_round` is 0 for a two-group bracket, which has a single round.
    pub fn from_round_sizes(first_round: u32, second_round: u32) -> TourneyResult<Self> {
        let group_count = if second_round == 0 {
            first_round * 2
        } else {
            first_round + second_round * 2
        };
        let layout = Self::for_groups(group_count as usize)?;
        let sizes = (layout.matches_in_round(1), layout.matches_in_round(2));
        if sizes != (first_round, second_round) {
            return Err(TourneyError::invalid(
                "bracket",
                format!("round sizes {first_round}/{second_round} do not fit a bracket"),
            ));
        }
        Ok(layout)
    }

    /// Number of matches in `round` (0 outside the bracket)
    pub fn matches_in_round(&self, round: u32) -> u32 {
        match round {
            1 => self.first_round_matches,
            r if r >= 2 && r <= self.rounds => self.bracket_size >> r,
            _ => 0,
        }
    }

    /// Total matches across all rounds; always N - 1
    pub fn total_matches(&self) -> u32 {
        (1..=self.rounds).map(|r| self.matches_in_round(r)).sum()
    }

    /// Round 2 matches that pair a bye group with a round 1 winner
    pub fn mixed_matches(&self) -> u32 {
        self.first_round_matches.min(self.byes)
    }

    /// Round 2 matches where both groups arrive on a bye
    pub fn bye_versus_bye_matches(&self) -> u32 {
        self.byes.saturating_sub(self.first_round_matches) / 2
    }

    /// Round 2 position of the `index`-th (0-based) bye group
    ///
    /// The first byes face round 1 winners from slot B; any byes left over
    /// once every round 1 match is paired are placed against each other.
    pub fn bye_target(&self, index: u32) -> Option<(MatchRef, Slot)> {
        if index >= self.byes {
            return None;
        }
        let mixed = self.mixed_matches();
        if index < mixed {
            return Some((MatchRef::new(2, index + 1), Slot::B));
        }
        let j = index - mixed;
        Some((MatchRef::new(2, mixed + j / 2 + 1), Slot::for_position(j + 1)))
    }

    /// Round `round + 1` position fed by the winner of match `number` in `round`
    ///
    /// With byes, round 1 winners first take slot A of the mixed round 2
    /// matches, where a bye group already holds slot B. The rest pair up.
    pub fn winner_target(&self, round: u32, number: u32) -> Option<(MatchRef, Slot)> {
        if round >= self.rounds || number == 0 || number > self.matches_in_round(round) {
            return None;
        }
        if round == 1 && self.byes > 0 {
            let mixed = self.mixed_matches();
            if number <= mixed {
                return Some((MatchRef::new(2, number), Slot::A));
            }
            let j = number - mixed;
            return Some((MatchRef::new(2, mixed + j.div_ceil(2)), Slot::for_position(j)));
        }
        Some((MatchRef::new(round + 1, number.div_ceil(2)), Slot::for_position(number)))
    }
}

/// Display name of a round on the results board
pub fn round_name(round: u32, total_rounds: u32, bracket_type: BracketType) -> String {
    if bracket_type == BracketType::RoundRobin {
        return "All Matches".to_string();
    }
    if round == total_rounds {
        "Finals".to_string()
    } else if round + 1 == total_rounds {
        "Semi-Finals".to_string()
    } else if round + 2 == total_rounds {
        "Quarter-Finals".to_string()
    } else {
        format!("Round {round}")
    }
}
