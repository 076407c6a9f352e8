//! Competition, group and match data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::{TourneyError, TourneyResult};

/// Group (tribe) ID type
pub type GroupId = Uuid;

/// Competition ID type
pub type CompetitionId = Uuid;

/// Match ID type
pub type MatchId = Uuid;

/// A competing group. Owned outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group ID
    pub id: GroupId,
    /// Display name
    pub name: String,
    /// Display color (hex string)
    pub color: Option<String>,
}

/// Competition category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompetitionCategory {
    #[serde(rename = "Sports")]
    Sports,
    #[serde(rename = "Mind Games")]
    MindGames,
    #[serde(rename = "Creative Arts")]
    CreativeArts,
}

impl CompetitionCategory {
    pub const ALL: [CompetitionCategory; 3] = [
        CompetitionCategory::Sports,
        CompetitionCategory::MindGames,
        CompetitionCategory::CreativeArts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionCategory::Sports => "Sports",
            CompetitionCategory::MindGames => "Mind Games",
            CompetitionCategory::CreativeArts => "Creative Arts",
        }
    }
}

impl fmt::Display for CompetitionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompetitionCategory {
    type Err = TourneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| TourneyError::invalid("category", format!("unknown category '{s}'")))
    }
}

/// Bracket discipline (tournament format)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BracketType {
    #[serde(rename = "Single Elimination")]
    SingleElimination,
    /// Reserved, not generated by this engine
    #[serde(rename = "Double Elimination")]
    DoubleElimination,
    #[serde(rename = "Round Robin")]
    RoundRobin,
}

impl BracketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BracketType::SingleElimination => "Single Elimination",
            BracketType::DoubleElimination => "Double Elimination",
            BracketType::RoundRobin => "Round Robin",
        }
    }
}

impl fmt::Display for BracketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BracketType {
    type Err = TourneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Single Elimination" => Ok(BracketType::SingleElimination),
            "Double Elimination" => Ok(BracketType::DoubleElimination),
            "Round Robin" => Ok(BracketType::RoundRobin),
            _ => Err(TourneyError::invalid(
                "bracket_type",
                format!("unknown bracket type '{s}'"),
            )),
        }
    }
}

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Created, not started
    Scheduled,
    /// Being played, running scores may be recorded
    #[serde(rename = "In Progress")]
    InProgress,
    /// Final scores recorded
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "Scheduled",
            MatchStatus::InProgress => "In Progress",
            MatchStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = TourneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(MatchStatus::Scheduled),
            "In Progress" => Ok(MatchStatus::InProgress),
            "Completed" => Ok(MatchStatus::Completed),
            _ => Err(TourneyError::invalid(
                "status",
                format!("unknown match status '{s}'"),
            )),
        }
    }
}

/// One of the two group positions in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    /// Slot fed by the `k`-th (1-based) source of a pairing: odd → A, even → B
    pub fn for_position(k: u32) -> Self {
        if k % 2 == 1 { Slot::A } else { Slot::B }
    }

    pub fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

/// Position of a match inside its bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchRef {
    /// Round number (1-indexed)
    pub round: u32,
    /// Match number within the round (1-indexed)
    pub number: u32,
}

impl MatchRef {
    pub fn new(round: u32, number: u32) -> Self {
        Self { round, number }
    }
}

impl fmt::Display for MatchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}M{}", self.round, self.number)
    }
}

/// Competition record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    /// Competition ID
    pub id: CompetitionId,
    /// Display name
    pub name: String,
    /// Category
    pub category: CompetitionCategory,
    /// Bracket discipline
    pub bracket_type: BracketType,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
}

/// Request to create a competition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompetition {
    pub name: String,
    pub category: CompetitionCategory,
    pub bracket_type: BracketType,
}

impl NewCompetition {
    pub fn new(
        name: impl Into<String>,
        category: CompetitionCategory,
        bracket_type: BracketType,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            bracket_type,
        }
    }

    /// Trim the name and reject empty names
    pub fn validated(self) -> TourneyResult<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(TourneyError::invalid("name", "name is required"));
        }
        Ok(Self { name, ..self })
    }
}

/// Match record as emitted by the bracket generator, before persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSeed {
    pub round_number: u32,
    pub match_number: u32,
    pub slot_a: Option<GroupId>,
    pub slot_b: Option<GroupId>,
}

impl MatchSeed {
    pub fn new(round_number: u32, match_number: u32) -> Self {
        Self {
            round_number,
            match_number,
            slot_a: None,
            slot_b: None,
        }
    }

    pub fn position(&self) -> MatchRef {
        MatchRef::new(self.round_number, self.match_number)
    }

    pub fn with_groups(mut self, slot_a: Option<GroupId>, slot_b: Option<GroupId>) -> Self {
        self.slot_a = slot_a;
        self.slot_b = slot_b;
        self
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Option<GroupId> {
        match slot {
            Slot::A => &mut self.slot_a,
            Slot::B => &mut self.slot_b,
        }
    }
}

/// Persisted match record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Match ID
    pub id: MatchId,
    /// Owning competition
    pub competition_id: CompetitionId,
    /// Round number (1-indexed, increasing toward the final)
    pub round_number: u32,
    /// Match number within the round (1-indexed)
    pub match_number: u32,
    pub slot_a: Option<GroupId>,
    pub slot_b: Option<GroupId>,
    pub score_a: Option<i32>,
    pub score_b: Option<i32>,
    /// Winner, only set on Completed matches with unequal scores
    pub winner: Option<GroupId>,
    pub status: MatchStatus,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency counter, bumped on every mutation
    pub revision: i32,
}

impl Match {
    /// Materialize a generated seed into a fresh Scheduled match
    pub fn from_seed(competition_id: CompetitionId, seed: &MatchSeed) -> Self {
        Self {
            id: Uuid::new_v4(),
            competition_id,
            round_number: seed.round_number,
            match_number: seed.match_number,
            slot_a: seed.slot_a,
            slot_b: seed.slot_b,
            score_a: None,
            score_b: None,
            winner: None,
            status: MatchStatus::Scheduled,
            scheduled_time: None,
            completed_at: None,
            revision: 0,
        }
    }

    pub fn position(&self) -> MatchRef {
        MatchRef::new(self.round_number, self.match_number)
    }

    pub fn slot(&self, slot: Slot) -> Option<GroupId> {
        match slot {
            Slot::A => self.slot_a,
            Slot::B => self.slot_b,
        }
    }

    pub fn set_slot(&mut self, slot: Slot, group: Option<GroupId>) {
        match slot {
            Slot::A => self.slot_a = group,
            Slot::B => self.slot_b = group,
        }
    }

    /// Both slots hold a group
    pub fn is_resolved(&self) -> bool {
        self.slot_a.is_some() && self.slot_b.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Completed with equal scores
    pub fn is_tie(&self) -> bool {
        self.is_completed() && self.winner.is_none()
    }

    /// Groups with their own score, in slot order
    pub fn participants(&self) -> impl Iterator<Item = (GroupId, Option<i32>)> + '_ {
        [(self.slot_a, self.score_a), (self.slot_b, self.score_b)]
            .into_iter()
            .filter_map(|(group, score)| group.map(|g| (g, score)))
    }

    /// Check the record-level invariants of a match
    pub fn check_invariants(&self) -> TourneyResult<()> {
        if self.round_number == 0 || self.match_number == 0 {
            return Err(TourneyError::invalid(
                "match_number",
                "round and match numbers are 1-based",
            ));
        }
        if self.slot_a.is_some() && self.slot_a == self.slot_b {
            return Err(TourneyError::invalid(
                "slot_b",
                "a group cannot occupy both slots of a match",
            ));
        }
        if let Some(winner) = self.winner {
            if self.slot_a != Some(winner) && self.slot_b != Some(winner) {
                return Err(TourneyError::invalid(
                    "winner",
                    "winner must occupy one of the match slots",
                ));
            }
            if !self.is_completed() {
                return Err(TourneyError::invalid(
                    "winner",
                    "only completed matches have a winner",
                ));
            }
        }
        if self.is_completed() && (self.score_a.is_none() || self.score_b.is_none()) {
            return Err(TourneyError::invalid(
                "score",
                "completed matches must have both scores",
            ));
        }
        Ok(())
    }
}

/// Competition together with its matches, as shown on the results board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionOverview {
    pub competition: Competition,
    /// Ordered by round, then match number
    pub matches: Vec<Match>,
    pub total_matches: usize,
    pub completed_matches: usize,
}

impl CompetitionOverview {
    pub fn new(competition: Competition, mut matches: Vec<Match>) -> Self {
        matches.sort_by_key(|m| m.position());
        let completed_matches = matches.iter().filter(|m| m.is_completed()).count();
        Self {
            competition,
            total_matches: matches.len(),
            completed_matches,
            matches,
        }
    }
}
