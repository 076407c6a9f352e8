//! Repository trait definitions for testability and dependency injection.
//!
//! The engine never talks to storage itself. The service layer goes through
//! these traits, which enables mock implementations in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::competition::{
    Competition, CompetitionCategory, CompetitionId, Group, GroupId, Match, MatchId, NewCompetition,
    Slot, TourneyError, TourneyResult,
};

/// Optimistic update of one match
#[derive(Debug, Clone, PartialEq)]
pub struct MatchUpdate {
    /// New state of the match
    pub updated: Match,
    /// Revision the stored row must still have
    pub expected_revision: i32,
}

impl MatchUpdate {
    pub fn new(updated: Match, expected_revision: i32) -> Self {
        Self {
            updated,
            expected_revision,
        }
    }
}

/// Write of a single slot of a scheduled match
///
/// Guarded by the previous value of that slot only, so fills of the two
/// slots of one match do not conflict with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotFill {
    pub match_id: MatchId,
    pub slot: Slot,
    /// Group the slot must still hold
    pub expected: Option<GroupId>,
    pub group: Option<GroupId>,
}

impl SlotFill {
    pub fn new(
        match_id: MatchId,
        slot: Slot,
        expected: Option<GroupId>,
        group: Option<GroupId>,
    ) -> Self {
        Self {
            match_id,
            slot,
            expected,
            group,
        }
    }

    fn column(&self) -> &'static str {
        match self.slot {
            Slot::A => "tribe_1_id",
            Slot::B => "tribe_2_id",
        }
    }
}

/// Trait for group (tribe) lookups
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// All groups, ordered by name
    async fn list_groups(&self) -> TourneyResult<Vec<Group>>;

    /// Groups with the given IDs; unknown IDs are skipped
    async fn find_groups(&self, ids: &[GroupId]) -> TourneyResult<Vec<Group>>;
}

/// Trait for competition operations
#[async_trait]
pub trait CompetitionRepository: Send + Sync {
    /// Create a competition
    async fn create_competition(&self, request: &NewCompetition) -> TourneyResult<Competition>;

    /// Find competition by ID
    async fn find_competition(&self, id: CompetitionId) -> TourneyResult<Option<Competition>>;

    /// List competitions ordered by category, then name
    async fn list_competitions(
        &self,
        category: Option<CompetitionCategory>,
    ) -> TourneyResult<Vec<Competition>>;

    /// Delete a competition and all its matches; false if it did not exist
    async fn delete_competition(&self, id: CompetitionId) -> TourneyResult<bool>;
}

/// Trait for match operations
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Replace every match of a competition in one transaction
    async fn replace_matches(
        &self,
        competition_id: CompetitionId,
        matches: &[Match],
    ) -> TourneyResult<()>;

    /// Matches of a competition ordered by round, then match number
    async fn list_matches(&self, competition_id: CompetitionId) -> TourneyResult<Vec<Match>>;

    /// Find match by ID
    async fn find_match(&self, id: MatchId) -> TourneyResult<Option<Match>>;

    /// Apply all updates and slot fills or none
    ///
    /// Fails with `Conflict` when a stored revision differs from the expected
    /// one, or when a filled match is no longer Scheduled or its slot no longer
    /// holds the expected group.
    async fn update_matches(
        &self,
        updates: &[MatchUpdate],
        fills: &[SlotFill],
    ) -> TourneyResult<()>;

    /// Completed matches, optionally limited to one category
    async fn completed_matches(
        &self,
        category: Option<CompetitionCategory>,
    ) -> TourneyResult<Vec<Match>>;
}

/// Everything the competition service needs from storage
pub trait TournamentStore: GroupRepository + CompetitionRepository + MatchRepository {}

impl<T: GroupRepository + CompetitionRepository + MatchRepository> TournamentStore for T {}

/// Default PostgreSQL implementation of the repositories
#[derive(Clone)]
pub struct PgTournamentStore {
    pool: PgPool,
}

impl PgTournamentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const MATCH_COLUMNS: &str = "id, competition_event_id, round_number, match_number, \
     tribe_1_id, tribe_2_id, tribe_1_score, tribe_2_score, winner_tribe_id, status, \
     scheduled_time, completed_at, revision";

fn group_from_row(row: &PgRow) -> TourneyResult<Group> {
    Ok(Group {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        color: row.try_get("color")?,
    })
}

fn competition_from_row(row: &PgRow) -> TourneyResult<Competition> {
    let category: String = row.try_get("category")?;
    let bracket_type: String = row.try_get("bracket_type")?;
    Ok(Competition {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: category.parse()?,
        bracket_type: bracket_type.parse()?,
        created_at: row.try_get("created_at")?,
    })
}

fn position_number(field: &'static str, raw: i32) -> TourneyResult<u32> {
    u32::try_from(raw).map_err(|_| TourneyError::invalid(field, format!("{raw} is negative")))
}

fn match_from_row(row: &PgRow) -> TourneyResult<Match> {
    let status: String = row.try_get("status")?;
    Ok(Match {
        id: row.try_get("id")?,
        competition_id: row.try_get("competition_event_id")?,
        round_number: position_number("round_number", row.try_get("round_number")?)?,
        match_number: position_number("match_number", row.try_get("match_number")?)?,
        slot_a: row.try_get("tribe_1_id")?,
        slot_b: row.try_get("tribe_2_id")?,
        score_a: row.try_get("tribe_1_score")?,
        score_b: row.try_get("tribe_2_score")?,
        winner: row.try_get("winner_tribe_id")?,
        status: status.parse()?,
        scheduled_time: row.try_get::<Option<DateTime<Utc>>, _>("scheduled_time")?,
        completed_at: row.try_get::<Option<DateTime<Utc>>, _>("completed_at")?,
        revision: row.try_get("revision")?,
    })
}

#[async_trait]
impl GroupRepository for PgTournamentStore {
    async fn list_groups(&self) -> TourneyResult<Vec<Group>> {
        let rows = sqlx::query("SELECT id, name, color FROM tribes ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(group_from_row).collect()
    }

    async fn find_groups(&self, ids: &[GroupId]) -> TourneyResult<Vec<Group>> {
        let rows = sqlx::query("SELECT id, name, color FROM tribes WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(group_from_row).collect()
    }
}

#[async_trait]
impl CompetitionRepository for PgTournamentStore {
    async fn create_competition(&self, request: &NewCompetition) -> TourneyResult<Competition> {
        let row = sqlx::query(
            r#"
            INSERT INTO competition_events (id, name, category, bracket_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, category, bracket_type, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(request.category.as_str())
        .bind(request.bracket_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        competition_from_row(&row)
    }

    async fn find_competition(&self, id: CompetitionId) -> TourneyResult<Option<Competition>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, category, bracket_type, created_at
            FROM competition_events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(competition_from_row).transpose()
    }

    async fn list_competitions(
        &self,
        category: Option<CompetitionCategory>,
    ) -> TourneyResult<Vec<Competition>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, category, bracket_type, created_at
            FROM competition_events
            WHERE $1::TEXT IS NULL OR category = $1
            ORDER BY category, name
            "#,
        )
        .bind(category.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(competition_from_row).collect()
    }

    async fn delete_competition(&self, id: CompetitionId) -> TourneyResult<bool> {
        // matches go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM competition_events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MatchRepository for PgTournamentStore {
    async fn replace_matches(
        &self,
        competition_id: CompetitionId,
        matches: &[Match],
    ) -> TourneyResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM matches WHERE competition_event_id = $1")
            .bind(competition_id)
            .execute(&mut *tx)
            .await?;

        for m in matches {
            sqlx::query(
                r#"
                INSERT INTO matches (id, competition_event_id, round_number, match_number,
                                     tribe_1_id, tribe_2_id, status, scheduled_time, revision)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(m.id)
            .bind(competition_id)
            .bind(m.round_number as i32)
            .bind(m.match_number as i32)
            .bind(m.slot_a)
            .bind(m.slot_b)
            .bind(m.status.as_str())
            .bind(m.scheduled_time)
            .bind(m.revision)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_matches(&self, competition_id: CompetitionId) -> TourneyResult<Vec<Match>> {
        let rows = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE competition_event_id = $1 \
             ORDER BY round_number, match_number"
        ))
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(match_from_row).collect()
    }

    async fn find_match(&self, id: MatchId) -> TourneyResult<Option<Match>> {
        let row = sqlx::query(&format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    async fn update_matches(
        &self,
        updates: &[MatchUpdate],
        fills: &[SlotFill],
    ) -> TourneyResult<()> {
        let mut tx = self.pool.begin().await?;

        for update in updates {
            let m = &update.updated;
            let result = sqlx::query(
                r#"
                UPDATE matches
                SET tribe_1_id = $1, tribe_2_id = $2, tribe_1_score = $3, tribe_2_score = $4,
                    winner_tribe_id = $5, status = $6, completed_at = $7, revision = $8,
                    updated_at = NOW()
                WHERE id = $9 AND revision = $10
                "#,
            )
            .bind(m.slot_a)
            .bind(m.slot_b)
            .bind(m.score_a)
            .bind(m.score_b)
            .bind(m.winner)
            .bind(m.status.as_str())
            .bind(m.completed_at)
            .bind(m.revision)
            .bind(m.id)
            .bind(update.expected_revision)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // dropping the transaction rolls back earlier updates
                return Err(TourneyError::conflict("match", m.id));
            }
        }

        for fill in fills {
            let column = fill.column();
            let result = sqlx::query(&format!(
                "UPDATE matches SET {column} = $1, revision = revision + 1, updated_at = NOW() \
                 WHERE id = $2 AND status = 'Scheduled' AND {column} IS NOT DISTINCT FROM $3"
            ))
            .bind(fill.group)
            .bind(fill.match_id)
            .bind(fill.expected)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(TourneyError::conflict("match", fill.match_id));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn completed_matches(
        &self,
        category: Option<CompetitionCategory>,
    ) -> TourneyResult<Vec<Match>> {
        let rows = sqlx::query(
            r#"
            SELECT m.id, m.competition_event_id, m.round_number, m.match_number,
                   m.tribe_1_id, m.tribe_2_id, m.tribe_1_score, m.tribe_2_score,
                   m.winner_tribe_id, m.status, m.scheduled_time, m.completed_at, m.revision
            FROM matches m
            JOIN competition_events c ON c.id = m.competition_event_id
            WHERE m.status = 'Completed' AND ($1::TEXT IS NULL OR c.category = $1)
            ORDER BY m.completed_at, m.id
            "#,
        )
        .bind(category.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(match_from_row).collect()
    }
}
