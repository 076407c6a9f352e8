//! Leaderboard computed from completed matches.
//!
//! Standings are recomputed from scratch on every request; nothing is cached.
//! Ranking order: wins (desc), total points (desc), losses (asc). Rows still
//! level after that keep their first-appearance order.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::competition::{CompetitionCategory, Group, GroupId, Match};

/// Which matches feed a leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderboardScope {
    /// Every competition
    All,
    /// Competitions of one category
    Category(CompetitionCategory),
}

impl LeaderboardScope {
    pub fn includes(&self, category: CompetitionCategory) -> bool {
        match self {
            LeaderboardScope::All => true,
            LeaderboardScope::Category(c) => *c == category,
        }
    }

    pub fn category(&self) -> Option<CompetitionCategory> {
        match self {
            LeaderboardScope::All => None,
            LeaderboardScope::Category(c) => Some(*c),
        }
    }
}

/// Aggregated results of one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStanding {
    pub group_id: GroupId,
    /// Completed matches the group appeared in, ties included
    pub matches_played: u32,
    pub wins: u32,
    /// Completed matches with a winner other than this group
    pub losses: u32,
    /// Sum of the group's own scores, win, lose or tie
    pub total_points: i64,
}

impl GroupStanding {
    fn new(group_id: GroupId) -> Self {
        Self {
            group_id,
            matches_played: 0,
            wins: 0,
            losses: 0,
            total_points: 0,
        }
    }

    /// Tied matches: played but neither won nor lost
    pub fn ties(&self) -> u32 {
        self.matches_played - self.wins - self.losses
    }
}

/// Rank standings from completed matches
///
/// Groups in `roster` are listed even without a completed match, ahead of
/// groups first seen in `matches`. Non-completed matches are ignored.
pub fn compute_standings<'a>(
    roster: &[GroupId],
    matches: impl IntoIterator<Item = &'a Match>,
) -> Vec<GroupStanding> {
    let mut standings: Vec<GroupStanding> = Vec::with_capacity(roster.len());
    let mut index: HashMap<GroupId, usize> = HashMap::with_capacity(roster.len());

    for &group_id in roster {
        index.entry(group_id).or_insert_with(|| {
            standings.push(GroupStanding::new(group_id));
            standings.len() - 1
        });
    }

    for m in matches.into_iter().filter(|m| m.is_completed()) {
        for (group_id, score) in m.participants() {
            let i = *index.entry(group_id).or_insert_with(|| {
                standings.push(GroupStanding::new(group_id));
                standings.len() - 1
            });
            let standing = &mut standings[i];
            standing.matches_played += 1;
            standing.total_points += i64::from(score.unwrap_or(0));
            match m.winner {
                Some(winner) if winner == group_id => standing.wins += 1,
                Some(_) => standing.losses += 1,
                None => {}
            }
        }
    }

    // stable: equal keys keep first-appearance order
    standings.sort_by_key(|s| (Reverse(s.wins), Reverse(s.total_points), s.losses));
    standings
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedGroup {
    /// 1-based position
    pub rank: usize,
    pub group: Group,
    pub standing: GroupStanding,
}

/// Leaderboard for a scope, with group display details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub scope: LeaderboardScope,
    pub rows: Vec<RankedGroup>,
}

impl Leaderboard {
    /// Build the leaderboard for `groups` from `matches`
    ///
    /// Every group is listed. Results of groups missing from `groups` are dropped.
    pub fn build<'a>(
        scope: LeaderboardScope,
        groups: &[Group],
        matches: impl IntoIterator<Item = &'a Match>,
    ) -> Self {
        let roster: Vec<GroupId> = groups.iter().map(|g| g.id).collect();
        let by_id: HashMap<GroupId, &Group> = groups.iter().map(|g| (g.id, g)).collect();

        let rows = compute_standings(&roster, matches)
            .into_iter()
            .filter_map(|standing| {
                by_id
                    .get(&standing.group_id)
                    .map(|group| ((*group).clone(), standing))
            })
            .enumerate()
            .map(|(i, (group, standing))| RankedGroup {
                rank: i + 1,
                group,
                standing,
            })
            .collect();

        Self { scope, rows }
    }

    pub fn leader(&self) -> Option<&RankedGroup> {
        self.rows.first()
    }

    pub fn order(&self) -> Vec<GroupId> {
        self.rows.iter().map(|row| row.group.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::{MatchSeed, MatchStatus};
    use crate::progression::determine_winner;
    use uuid::Uuid;

    fn completed(a: GroupId, b: GroupId, score_a: i32, score_b: i32) -> Match {
        let seed = MatchSeed::new(1, 1).with_groups(Some(a), Some(b));
        let mut m = Match::from_seed(Uuid::new_v4(), &seed);
        m.score_a = Some(score_a);
        m.score_b = Some(score_b);
        m.status = MatchStatus::Completed;
        m.winner = determine_winner(&m, score_a, score_b);
        m
    }

    #[test]
    fn test_round_robin_scenario() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let matches = vec![
            completed(a, b, 5, 2),
            completed(b, c, 4, 3),
            completed(a, c, 2, 2),
        ];

        let standings = compute_standings(&[], &matches);
        let order: Vec<GroupId> = standings.iter().map(|s| s.group_id).collect();
        assert_eq!(order, vec![a, b, c]);

        let sa = &standings[0];
        assert_eq!((sa.matches_played, sa.wins, sa.losses, sa.total_points), (2, 1, 0, 7));
        assert_eq!(sa.ties(), 1);
        let sb = &standings[1];
        assert_eq!((sb.matches_played, sb.wins, sb.losses, sb.total_points), (2, 1, 1, 6));
        let sc = &standings[2];
        assert_eq!((sc.matches_played, sc.wins, sc.losses, sc.total_points), (2, 0, 1, 5));
    }

    #[test]
    fn test_open_matches_ignored() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut running = completed(a, b, 1, 0);
        running.status = MatchStatus::InProgress;
        running.winner = None;

        assert!(compute_standings(&[], &[running]).is_empty());
    }

    #[test]
    fn test_losses_break_ties_after_points() {
        let (a, b, c, d) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        // a: 1 win, 1 loss, 4 pts; c: 1 win, 0 losses, 4 pts
        let matches = vec![
            completed(a, b, 3, 0),
            completed(d, a, 5, 1),
            completed(c, b, 2, 1),
            completed(c, d, 2, 2),
        ];
        let standings = compute_standings(&[], &matches);
        let pos = |g: GroupId| standings.iter().position(|s| s.group_id == g).unwrap();
        assert!(pos(c) < pos(a));
    }

    #[test]
    fn test_full_ties_keep_first_appearance() {
        let (a, b, c, d) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let matches = vec![completed(c, d, 1, 1), completed(a, b, 1, 1)];
        let order: Vec<GroupId> = compute_standings(&[], &matches)
            .iter()
            .map(|s| s.group_id)
            .collect();
        assert_eq!(order, vec![c, d, a, b]);
    }

    #[test]
    fn test_roster_groups_listed_with_zero_rows() {
        let (a, b, idle) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let standings = compute_standings(&[idle, a, b], &[completed(a, b, 1, 0)]);
        assert_eq!(standings.len(), 3);
        assert_eq!(standings[0].group_id, a);
        // no losses ranks the idle group above the loser
        assert_eq!(standings[1].group_id, idle);
        assert_eq!(standings[1].matches_played, 0);
        assert_eq!(standings[2].group_id, b);
        assert_eq!(standings[2].losses, 1);
    }

    #[test]
    fn test_repeated_computation_is_identical() {
        let ids: Vec<GroupId> = (0..6).map(|_| Uuid::new_v4()).collect();
        let matches: Vec<Match> = ids
            .windows(2)
            .enumerate()
            .map(|(i, pair)| completed(pair[0], pair[1], (i % 3) as i32, 1))
            .collect();
        assert_eq!(compute_standings(&[], &matches), compute_standings(&[], &matches));
    }

    #[test]
    fn test_build_ranks_and_names() {
        let groups: Vec<Group> = ["Red", "Blue"]
            .iter()
            .map(|name| Group {
                id: Uuid::new_v4(),
                name: name.to_string(),
                color: None,
            })
            .collect();
        let stranger = Uuid::new_v4();
        let matches = vec![
            completed(groups[1].id, groups[0].id, 3, 0),
            completed(groups[0].id, stranger, 1, 0),
        ];

        let board = Leaderboard::build(LeaderboardScope::All, &groups, &matches);
        assert_eq!(board.rows.len(), 2);
        assert_eq!(board.leader().unwrap().group.name, "Blue");
        assert_eq!(board.rows[1].rank, 2);
        assert_eq!(board.order(), vec![groups[1].id, groups[0].id]);
    }

    #[test]
    fn test_scope_includes() {
        assert!(LeaderboardScope::All.includes(CompetitionCategory::Sports));
        let scope = LeaderboardScope::Category(CompetitionCategory::MindGames);
        assert!(scope.includes(CompetitionCategory::MindGames));
        assert!(!scope.includes(CompetitionCategory::CreativeArts));
        assert_eq!(scope.category(), Some(CompetitionCategory::MindGames));
    }
}
