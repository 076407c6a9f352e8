//! Result notifications for live viewers.

use async_trait::async_trait;
use thiserror::Error;

use crate::competition::Match;

/// Notification delivery failure
#[derive(Debug, Error)]
#[error("Notification failed: {0}")]
pub struct NotifyError(pub String);

/// Receives completed match results
#[async_trait]
pub trait MatchNotifier: Send + Sync {
    async fn match_completed(&self, completed: &Match) -> Result<(), NotifyError>;
}

/// Notifier that only writes the result to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl MatchNotifier for LogNotifier {
    async fn match_completed(&self, completed: &Match) -> Result<(), NotifyError> {
        log::info!(
            "Result {}: {:?}-{:?}, winner {:?}",
            completed.position(),
            completed.score_a,
            completed.score_b,
            completed.winner
        );
        Ok(())
    }
}
