//! Role checks for competition operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::competition::{TourneyError, TourneyResult};

/// Convention role of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    #[serde(rename = "Chapter Leader")]
    ChapterLeader,
    #[serde(rename = "Committee Head")]
    CommitteeHead,
    Attendee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::ChapterLeader => "Chapter Leader",
            Role::CommitteeHead => "Committee Head",
            Role::Attendee => "Attendee",
        }
    }

    /// Create, delete and seed competitions
    pub fn can_manage_brackets(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Record match scores
    pub fn can_score(&self) -> bool {
        matches!(self, Role::Admin | Role::CommitteeHead)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TourneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Chapter Leader" => Ok(Role::ChapterLeader),
            "Committee Head" => Ok(Role::CommitteeHead),
            "Attendee" => Ok(Role::Attendee),
            _ => Err(TourneyError::invalid("role", format!("unknown role '{s}'"))),
        }
    }
}

/// The user performing an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub(crate) fn require_bracket_admin(&self, action: &'static str) -> TourneyResult<()> {
        if self.role.can_manage_brackets() {
            Ok(())
        } else {
            log::warn!("User {} ({}) denied: {}", self.user_id, self.role, action);
            Err(TourneyError::Forbidden { action })
        }
    }

    pub(crate) fn require_scorer(&self) -> TourneyResult<()> {
        if self.role.can_score() {
            Ok(())
        } else {
            log::warn!("User {} ({}) denied: submit score", self.user_id, self.role);
            Err(TourneyError::Forbidden {
                action: "submit score",
            })
        }
    }
}
