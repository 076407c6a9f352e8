/// Property-based tests for bracket generation using proptest
///
/// These tests verify the structural guarantees of generated brackets
/// across every roster size a convention could plausibly field.
use convention_tourney::bracket::{BracketLayout, generate};
use convention_tourney::competition::{BracketType, GroupId, Match, MatchRef, MatchStatus, Slot};
use convention_tourney::leaderboard::compute_standings;
use convention_tourney::progression::determine_winner;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

fn groups(n: usize) -> Vec<GroupId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

proptest! {
    #[test]
    fn single_elimination_has_n_minus_one_matches(n in 2usize..=128) {
        let bracket = generate(BracketType::SingleElimination, &groups(n)).unwrap();
        prop_assert_eq!(bracket.matches.len(), n - 1);

        let layout = BracketLayout::for_groups(n).unwrap();
        prop_assert_eq!(layout.total_matches() as usize, n - 1);
        prop_assert_eq!(bracket.total_rounds(), layout.rounds);
        prop_assert_eq!(bracket.round(layout.rounds).count(), 1);
    }

    #[test]
    fn every_seed_is_placed_exactly_once(n in 2usize..=128) {
        let seeds = groups(n);
        let bracket = generate(BracketType::SingleElimination, &seeds).unwrap();

        let mut placed: Vec<GroupId> = bracket
            .matches
            .iter()
            .flat_map(|m| [m.slot_a, m.slot_b])
            .flatten()
            .collect();
        placed.sort();
        let mut expected = seeds.clone();
        expected.sort();
        prop_assert_eq!(placed, expected);
    }

    #[test]
    fn each_downstream_slot_has_one_source(n in 2usize..=128) {
        let seeds = groups(n);
        let bracket = generate(BracketType::SingleElimination, &seeds).unwrap();

        let mut fed: HashMap<(MatchRef, Slot), usize> = HashMap::new();
        for feed in bracket.feeds.iter() {
            prop_assert_eq!(feed.to.round, feed.from.round + 1);
            *fed.entry((feed.to, feed.slot)).or_default() += 1;
        }
        prop_assert!(fed.values().all(|&count| count == 1));

        // a fed slot never holds a seeded group
        for ((to, slot), _) in &fed {
            let seed = bracket.get(*to).unwrap();
            let occupied = match slot {
                Slot::A => seed.slot_a,
                Slot::B => seed.slot_b,
            };
            prop_assert!(occupied.is_none());
        }

        // every match but the final feeds somewhere
        prop_assert_eq!(bracket.feeds.len(), n - 2);
    }

    #[test]
    fn round_robin_pairs_are_unique(n in 2usize..=40) {
        let seeds = groups(n);
        let bracket = generate(BracketType::RoundRobin, &seeds).unwrap();
        prop_assert_eq!(bracket.matches.len(), n * (n - 1) / 2);

        let pairs: HashSet<(GroupId, GroupId)> = bracket
            .matches
            .iter()
            .map(|m| {
                let (a, b) = (m.slot_a.unwrap(), m.slot_b.unwrap());
                prop_assert_ne!(a, b);
                Ok(if a < b { (a, b) } else { (b, a) })
            })
            .collect::<Result<_, TestCaseError>>()?;
        prop_assert_eq!(pairs.len(), bracket.matches.len());
    }

    #[test]
    fn standings_ignore_match_order(
        n in 2usize..=8,
        scores in prop::collection::vec((0i32..10, 0i32..10), 28)
    ) {
        let seeds = groups(n);
        let bracket = generate(BracketType::RoundRobin, &seeds).unwrap();
        let competition_id = Uuid::new_v4();
        let matches: Vec<Match> = bracket
            .matches
            .iter()
            .zip(scores)
            .map(|(seed, (a, b))| {
                let mut m = Match::from_seed(competition_id, seed);
                m.score_a = Some(a);
                m.score_b = Some(b);
                m.status = MatchStatus::Completed;
                m.winner = determine_winner(&m, a, b);
                m
            })
            .collect();

        let forward = compute_standings(&seeds, &matches);
        let reversed: Vec<_> = matches.iter().rev().cloned().collect();
        let backward = compute_standings(&seeds, &reversed);
        prop_assert_eq!(forward, backward);
    }
}
