//! Competition data model shared by the bracket, progression and leaderboard engines.
//!
//! A competition owns a set of matches laid out in rounds. Matches are created in
//! bulk by the bracket generator and mutated only by score submission.

pub mod errors;
pub mod models;

pub use errors::{ErrorKind, TourneyError, TourneyResult};
pub use models::{
    BracketType, Competition, CompetitionCategory, CompetitionId, CompetitionOverview, Group,
    GroupId, Match, MatchId, MatchRef, MatchSeed, MatchStatus, NewCompetition, Slot,
};
