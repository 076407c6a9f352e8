//! Tournament engine error types.

use thiserror::Error;

use super::models::{BracketType, MatchId};

/// Coarse error classification surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or contradictory request
    InvalidInput,
    /// Referenced record missing, or a match is not ready to be scored
    NotFound,
    /// Bracket discipline not implemented
    Unsupported,
    /// Concurrent update lost a race
    Conflict,
    /// Caller lacks the required role
    Forbidden,
    /// Storage failure
    Internal,
}

/// Tournament engine errors
#[derive(Debug, Error)]
pub enum TourneyError {
    /// Malformed or contradictory input
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// Referenced record does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Scoring attempted before both slots are filled
    #[error("Match {match_id} does not have both groups assigned yet")]
    UnresolvedSlots { match_id: MatchId },

    /// Bracket discipline not implemented
    #[error("Unsupported bracket type: {0}")]
    Unsupported(BracketType),

    /// Record was modified concurrently
    #[error("Conflicting update on {entity} {id}")]
    Conflict { entity: &'static str, id: String },

    /// Caller role does not permit the action
    #[error("Not permitted: {action}")]
    Forbidden { action: &'static str },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl TourneyError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        TourneyError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        TourneyError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(entity: &'static str, id: impl ToString) -> Self {
        TourneyError::Conflict {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TourneyError::InvalidInput { .. } => ErrorKind::InvalidInput,
            TourneyError::NotFound { .. } | TourneyError::UnresolvedSlots { .. } => {
                ErrorKind::NotFound
            }
            TourneyError::Unsupported(_) => ErrorKind::Unsupported,
            TourneyError::Conflict { .. } => ErrorKind::Conflict,
            TourneyError::Forbidden { .. } => ErrorKind::Forbidden,
            TourneyError::Database(_) => ErrorKind::Internal,
        }
    }

    /// Offending field for input errors
    pub fn field(&self) -> Option<&'static str> {
        match self {
            TourneyError::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Get a client-safe error message
    ///
    /// Database errors are replaced with a generic message so SQL details
    /// never reach the user.
    pub fn client_message(&self) -> String {
        match self {
            TourneyError::Database(_) => "Internal server error".to_string(),
            TourneyError::Conflict { entity, .. } => {
                format!("The {entity} was changed meanwhile, reload and try again")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament engine operations
pub type TourneyResult<T> = Result<T, TourneyError>;
