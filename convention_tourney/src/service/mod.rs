//! Competition service: the operations exposed to the convention app.

pub mod access;
pub mod manager;
pub mod notify;

pub use access::{Actor, Role};
pub use manager::{CompetitionManager, ScoreReport, SeedReport};
pub use notify::{LogNotifier, MatchNotifier, NotifyError};
