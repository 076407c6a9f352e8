//! # Convention Tourney
//!
//! Tournament engine for convention competitions between groups (tribes).
//!
//! The engine generates brackets from an ordered seed list, advances winners as
//! scores come in, and ranks every group on a leaderboard computed from the
//! completed matches.
//!
//! ## Core Modules
//!
//! - [`bracket`]: Single elimination (with byes) and round robin generation
//! - [`progression`]: Score submission, winner determination and advancement
//! - [`leaderboard`]: Standings from completed matches
//! - [`competition`]: Shared data model and error types
//! - [`db`]: PostgreSQL pool, configuration and repositories
//! - [`service`]: Role-checked operations tying the engines to storage
//!
//! The bracket, progression and leaderboard engines are pure functions over
//! in-memory records; only [`service`] touches storage.
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use convention_tourney::bracket::generate;
//! use convention_tourney::competition::{BracketType, Match};
//! use convention_tourney::progression::{ScoreSubmission, submit_score};
//! use uuid::Uuid;
//!
//! let seeds: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
//! let bracket = generate(BracketType::SingleElimination, &seeds).unwrap();
//! let competition_id = Uuid::new_v4();
//! let first = Match::from_seed(competition_id, &bracket.matches[0]);
//!
//! let submission = ScoreSubmission::completed(3, 1);
//! let outcome = submit_score(&first, &submission, &bracket.feeds, Utc::now()).unwrap();
//! assert_eq!(outcome.winner(), Some(seeds[0]));
//! assert_eq!(outcome.advancement.unwrap().group, Some(seeds[0]));
//! ```

/// Bracket generation and the winner feed map.
pub mod bracket;

/// Competition, group and match records.
pub mod competition;
pub use competition::{
    BracketType, Competition, CompetitionCategory, Group, GroupId, Match, MatchStatus, TourneyError,
    TourneyResult,
};

/// Database pool, configuration and repositories.
pub mod db;

/// Standings from completed matches.
pub mod leaderboard;
pub use leaderboard::{Leaderboard, LeaderboardScope};

/// Score submission and advancement.
pub mod progression;

/// Role-checked competition operations.
pub mod service;
pub use service::{Actor, CompetitionManager, Role};
