//! Match progression: score submission, winner determination and advancement.
//!
//! Submitting a score never touches other matches directly. It returns the
//! updated match together with the slot assignment the caller has to apply to
//! the downstream match, so the caller can persist both in one batch.
//! Assignments always target a fixed slot and are safe to replay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bracket::FeedMap;
use crate::competition::{GroupId, Match, MatchRef, MatchStatus, Slot, TourneyError, TourneyResult};

/// Reported result for a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub score_a: Option<i32>,
    pub score_b: Option<i32>,
    /// Target status, Completed when omitted
    pub status: Option<MatchStatus>,
}

impl ScoreSubmission {
    /// Final score
    pub fn completed(score_a: i32, score_b: i32) -> Self {
        Self {
            score_a: Some(score_a),
            score_b: Some(score_b),
            status: None,
        }
    }

    /// Running score of a match still being played
    pub fn in_progress(score_a: i32, score_b: i32) -> Self {
        Self {
            score_a: Some(score_a),
            score_b: Some(score_b),
            status: Some(MatchStatus::InProgress),
        }
    }

    fn validated(&self) -> TourneyResult<(i32, i32, MatchStatus)> {
        let score_a = require_score("score_a", self.score_a)?;
        let score_b = require_score("score_b", self.score_b)?;
        let status = self.status.unwrap_or(MatchStatus::Completed);
        if status == MatchStatus::Scheduled {
            return Err(TourneyError::invalid(
                "status",
                "a scored match cannot go back to Scheduled",
            ));
        }
        Ok((score_a, score_b, status))
    }
}

fn require_score(field: &'static str, score: Option<i32>) -> TourneyResult<i32> {
    match score {
        None => Err(TourneyError::invalid(field, "both scores are required")),
        Some(s) if s < 0 => Err(TourneyError::invalid(field, format!("score {s} is negative"))),
        Some(s) => Ok(s),
    }
}

/// Write `group` into `slot` of the match at `target`; `None` clears the slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub source: MatchRef,
    pub target: MatchRef,
    pub slot: Slot,
    pub group: Option<GroupId>,
}

/// Result of a score submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    /// Match with scores, status and winner applied
    pub updated: Match,
    /// Winner before this submission
    pub previous_winner: Option<GroupId>,
    /// Downstream slot to fill or clear, if the match feeds one
    pub advancement: Option<SlotAssignment>,
}

impl ScoreOutcome {
    pub fn winner(&self) -> Option<GroupId> {
        self.updated.winner
    }

    pub fn winner_changed(&self) -> bool {
        self.updated.winner != self.previous_winner
    }

    /// Viewers should be told about completed results
    pub fn should_notify(&self) -> bool {
        self.updated.is_completed()
    }
}

/// Higher score wins; equal scores are a tie with no winner
pub fn determine_winner(m: &Match, score_a: i32, score_b: i32) -> Option<GroupId> {
    match score_a.cmp(&score_b) {
        std::cmp::Ordering::Greater => m.slot_a,
        std::cmp::Ordering::Less => m.slot_b,
        std::cmp::Ordering::Equal => None,
    }
}

/// Apply a reported score to a match
///
/// Resubmitting a completed match recomputes the winner; the returned
/// advancement then overwrites (or clears) whatever was propagated before.
///
/// # Errors
///
/// * `InvalidInput` - a score is missing or negative, or the target status is Scheduled
/// * `NotFound` - the match does not have both groups assigned yet
pub fn submit_score(
    current: &Match,
    submission: &ScoreSubmission,
    feeds: &FeedMap,
    now: DateTime<Utc>,
) -> TourneyResult<ScoreOutcome> {
    let (score_a, score_b, status) = submission.validated()?;
    if !current.is_resolved() {
        return Err(TourneyError::UnresolvedSlots {
            match_id: current.id,
        });
    }

    let winner = if status == MatchStatus::Completed {
        determine_winner(current, score_a, score_b)
    } else {
        None
    };

    let mut updated = current.clone();
    updated.score_a = Some(score_a);
    updated.score_b = Some(score_b);
    updated.winner = winner;
    updated.status = status;
    updated.completed_at = (status == MatchStatus::Completed).then_some(now);
    updated.revision += 1;

    let advancement = feeds
        .target(current.position())
        .filter(|_| winner.is_some() || current.winner.is_some())
        .map(|feed| SlotAssignment {
            source: feed.from,
            target: feed.to,
            slot: feed.slot,
            group: winner,
        });

    match (status, winner) {
        (MatchStatus::Completed, Some(w)) => {
            log::info!("Match {} completed, winner {}", current.position(), w)
        }
        (MatchStatus::Completed, None) => {
            log::info!("Match {} completed as a tie", current.position())
        }
        _ => log::debug!("Match {} in progress {}-{}", current.position(), score_a, score_b),
    }

    Ok(ScoreOutcome {
        updated,
        previous_winner: current.winner,
        advancement,
    })
}

/// Apply a slot assignment to its downstream match
///
/// Returns `None` when the slot already holds the assigned group.
///
/// # Errors
///
/// * `InvalidInput` - wrong target match, or the group already holds the other slot
/// * `Conflict` - the downstream match has started, so its groups can no longer change
pub fn apply_assignment(
    downstream: &Match,
    assignment: &SlotAssignment,
) -> TourneyResult<Option<Match>> {
    if downstream.position() != assignment.target {
        return Err(TourneyError::invalid(
            "target",
            format!(
                "assignment for {} applied to {}",
                assignment.target,
                downstream.position()
            ),
        ));
    }
    if downstream.slot(assignment.slot) == assignment.group {
        return Ok(None);
    }
    if downstream.status != MatchStatus::Scheduled {
        return Err(TourneyError::conflict("match", downstream.id));
    }
    let other = downstream.slot(assignment.slot.other());
    if assignment.group.is_some() && other == assignment.group {
        return Err(TourneyError::invalid(
            "slot",
            "a group cannot occupy both slots of a match",
        ));
    }

    let mut updated = downstream.clone();
    updated.set_slot(assignment.slot, assignment.group);
    updated.revision += 1;
    log::debug!(
        "Slot {:?} of match {} set to {:?} from {}",
        assignment.slot,
        assignment.target,
        assignment.group,
        assignment.source
    );
    Ok(Some(updated))
}

/// Every downstream slot as implied by the current results
pub fn derive_assignments(matches: &[Match], feeds: &FeedMap) -> Vec<SlotAssignment> {
    let by_position: BTreeMap<MatchRef, &Match> =
        matches.iter().map(|m| (m.position(), m)).collect();

    feeds
        .iter()
        .filter_map(|feed| {
            by_position.get(&feed.from).map(|source| SlotAssignment {
                source: feed.from,
                target: feed.to,
                slot: feed.slot,
                group: source.winner,
            })
        })
        .collect()
}

/// Downstream matches that have to change for the bracket to agree with its results
///
/// # Errors
///
/// * `NotFound` - a feed points at a match missing from `matches`
/// * `Conflict` - a started match would have to change groups
pub fn reconcile(matches: &[Match], feeds: &FeedMap) -> TourneyResult<Vec<Match>> {
    let mut current: BTreeMap<MatchRef, Match> =
        matches.iter().map(|m| (m.position(), m.clone())).collect();
    let mut changed = Vec::new();

    for assignment in derive_assignments(matches, feeds) {
        let downstream = current
            .get(&assignment.target)
            .ok_or_else(|| TourneyError::not_found("match", assignment.target))?;
        if let Some(updated) = apply_assignment(downstream, &assignment)? {
            if !changed.contains(&assignment.target) {
                changed.push(assignment.target);
            }
            current.insert(assignment.target, updated);
        }
    }

    Ok(changed
        .into_iter()
        .filter_map(|position| current.remove(&position))
        .collect())
}
