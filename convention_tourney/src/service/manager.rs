//! Competition manager: role checks, persistence and notification around the
//! pure bracket, progression and leaderboard engines.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::access::Actor;
use super::notify::MatchNotifier;
use crate::bracket::{self, BracketLayout, BracketNotice, FeedMap};
use crate::competition::{
    Competition, CompetitionCategory, CompetitionId, CompetitionOverview, GroupId, Match, MatchId,
    NewCompetition, Slot, TourneyError, TourneyResult,
};
use crate::db::{
    CompetitionRepository, GroupRepository, MatchRepository, MatchUpdate, SlotFill, TournamentStore,
};
use crate::leaderboard::{Leaderboard, LeaderboardScope};
use crate::progression::{self, ScoreOutcome, ScoreSubmission};

/// Persisted result of seeding a bracket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedReport {
    /// Ordered by round, then match number
    pub matches: Vec<Match>,
    pub layout: Option<BracketLayout>,
    pub notices: Vec<BracketNotice>,
}

/// Persisted result of a score submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub outcome: ScoreOutcome,
    /// Downstream match after advancement, when a slot changed
    pub downstream: Option<Match>,
}

/// Competition manager
#[derive(Clone)]
pub struct CompetitionManager {
    store: Arc<dyn TournamentStore>,
    notifier: Option<Arc<dyn MatchNotifier>>,
}

impl CompetitionManager {
    /// Create a new competition manager
    ///
    /// # Arguments
    ///
    /// * `store` - Repositories for groups, competitions and matches
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self {
            store,
            notifier: None,
        }
    }

    /// Send completed results to `notifier`
    pub fn with_notifier(mut self, notifier: Arc<dyn MatchNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Create a competition
    ///
    /// # Errors
    ///
    /// * `Forbidden` - actor is not an Admin
    /// * `InvalidInput` - empty name
    pub async fn create_competition(
        &self,
        actor: &Actor,
        request: NewCompetition,
    ) -> TourneyResult<Competition> {
        actor.require_bracket_admin("create competition")?;
        let request = request.validated()?;

        let competition = self.store.create_competition(&request).await?;
        log::info!(
            "Competition '{}' created ({}, {})",
            competition.name,
            competition.category,
            competition.bracket_type
        );
        Ok(competition)
    }

    /// Delete a competition together with its matches
    pub async fn delete_competition(&self, actor: &Actor, id: CompetitionId) -> TourneyResult<()> {
        actor.require_bracket_admin("delete competition")?;

        if !self.store.delete_competition(id).await? {
            return Err(TourneyError::not_found("competition", id));
        }
        log::info!("Competition {} deleted", id);
        Ok(())
    }

    /// Competitions ordered by category, then name
    pub async fn list_competitions(
        &self,
        category: Option<CompetitionCategory>,
    ) -> TourneyResult<Vec<Competition>> {
        self.store.list_competitions(category).await
    }

    /// Competition with its matches
    pub async fn get_competition(&self, id: CompetitionId) -> TourneyResult<CompetitionOverview> {
        let competition = self.require_competition(id).await?;
        let matches = self.store.list_matches(id).await?;
        Ok(CompetitionOverview::new(competition, matches))
    }

    /// Generate and store the bracket of a competition
    ///
    /// Any existing matches of the competition are replaced in one transaction.
    ///
    /// # Arguments
    ///
    /// * `actor` - Must be an Admin
    /// * `competition_id` - Competition to seed
    /// * `seeds` - Distinct groups in seeding order
    ///
    /// # Returns
    ///
    /// * `TourneyResult<SeedReport>` - Stored matches and bracket notices
    pub async fn seed_bracket(
        &self,
        actor: &Actor,
        competition_id: CompetitionId,
        seeds: &[GroupId],
    ) -> TourneyResult<SeedReport> {
        actor.require_bracket_admin("seed bracket")?;
        let competition = self.require_competition(competition_id).await?;

        let bracket = bracket::generate(competition.bracket_type, seeds)?;

        let known: HashSet<GroupId> = self
            .store
            .find_groups(seeds)
            .await?
            .into_iter()
            .map(|g| g.id)
            .collect();
        if let Some(missing) = seeds.iter().find(|id| !known.contains(id)) {
            return Err(TourneyError::not_found("group", missing));
        }

        let matches: Vec<Match> = bracket
            .matches
            .iter()
            .map(|seed| Match::from_seed(competition_id, seed))
            .collect();
        self.store.replace_matches(competition_id, &matches).await?;

        log::info!(
            "Seeded '{}' ({}) with {} groups, {} matches",
            competition.name,
            competition.bracket_type,
            seeds.len(),
            matches.len()
        );

        Ok(SeedReport {
            matches,
            layout: bracket.layout,
            notices: bracket.notices,
        })
    }

    /// Record a score and advance the winner
    ///
    /// The scored match and the downstream slot are written in one batch.
    /// The scored match is guarded by its revision and the downstream write
    /// touches only the fed slot, so results of the two matches feeding one
    /// slot pair can be submitted at the same time. A concurrent change to
    /// the scored match, or to the fed slot, fails the whole submission with
    /// `Conflict`.
    pub async fn submit_score(
        &self,
        actor: &Actor,
        match_id: MatchId,
        submission: ScoreSubmission,
    ) -> TourneyResult<ScoreReport> {
        actor.require_scorer()?;

        let current = self
            .store
            .find_match(match_id)
            .await?
            .ok_or_else(|| TourneyError::not_found("match", match_id))?;
        let competition = self.require_competition(current.competition_id).await?;
        let matches = self.store.list_matches(competition.id).await?;
        let feeds = FeedMap::for_matches(competition.bracket_type, &matches)?;

        let outcome = progression::submit_score(&current, &submission, &feeds, Utc::now())?;

        let mut fills = Vec::new();
        let mut downstream = None;
        if let Some(assignment) = &outcome.advancement {
            let target = matches
                .iter()
                .find(|m| m.position() == assignment.target)
                .ok_or_else(|| TourneyError::not_found("match", assignment.target))?;
            if let Some(updated) = progression::apply_assignment(target, assignment)? {
                fills.push(SlotFill::new(
                    target.id,
                    assignment.slot,
                    target.slot(assignment.slot),
                    assignment.group,
                ));
                downstream = Some(updated);
            }
        }

        let scored = MatchUpdate::new(outcome.updated.clone(), current.revision);
        self.store.update_matches(&[scored], &fills).await?;

        if outcome.should_notify() {
            self.notify(&outcome.updated).await;
        }

        Ok(ScoreReport {
            outcome,
            downstream,
        })
    }

    /// Bring every downstream slot in line with the recorded results
    ///
    /// # Returns
    ///
    /// * `TourneyResult<Vec<Match>>` - Matches that were changed
    pub async fn reconcile_bracket(
        &self,
        actor: &Actor,
        competition_id: CompetitionId,
    ) -> TourneyResult<Vec<Match>> {
        actor.require_bracket_admin("reconcile bracket")?;
        let competition = self.require_competition(competition_id).await?;
        let matches = self.store.list_matches(competition_id).await?;
        let feeds = FeedMap::for_matches(competition.bracket_type, &matches)?;

        let changed = progression::reconcile(&matches, &feeds)?;
        if changed.is_empty() {
            return Ok(changed);
        }

        let before: HashMap<MatchId, &Match> = matches.iter().map(|m| (m.id, m)).collect();
        let mut fills = Vec::new();
        for m in &changed {
            let Some(stored) = before.get(&m.id) else {
                return Err(TourneyError::not_found("match", m.id));
            };
            for slot in [Slot::A, Slot::B] {
                if stored.slot(slot) != m.slot(slot) {
                    fills.push(SlotFill::new(m.id, slot, stored.slot(slot), m.slot(slot)));
                }
            }
        }
        self.store.update_matches(&[], &fills).await?;

        log::info!(
            "Reconciled '{}': {} matches updated",
            competition.name,
            changed.len()
        );
        Ok(changed)
    }

    /// Current standings for all groups
    pub async fn leaderboard(&self, scope: LeaderboardScope) -> TourneyResult<Leaderboard> {
        let groups = self.store.list_groups().await?;
        let matches = self.store.completed_matches(scope.category()).await?;
        Ok(Leaderboard::build(scope, &groups, &matches))
    }

    async fn require_competition(&self, id: CompetitionId) -> TourneyResult<Competition> {
        self.store
            .find_competition(id)
            .await?
            .ok_or_else(|| TourneyError::not_found("competition", id))
    }

    async fn notify(&self, completed: &Match) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if let Err(e) = notifier.match_completed(completed).await {
            log::error!("Failed to announce result of match {}: {}", completed.id, e);
        }
    }
}
