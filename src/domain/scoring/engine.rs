//! Score computation and leaderboard ranking

use std::cmp::Ordering;

use super::entry::{RankedEntry, ScoringCandidate};
use crate::domain::listing::ListingStatus;
use crate::domain::user::UserId;

/// Points earned for every listing a user has created, whatever its status
pub const LISTING_BONUS: u64 = 10;

/// Extra points earned for every listing marked as repaired
pub const REPAIR_BONUS: u64 = 25;

/// Stateless scoring and ranking.
///
/// Every call works on its own input snapshot, so a single engine can be
/// shared freely between request handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreEngine;

impl ScoreEngine {
    pub fn new() -> Self {
        Self
    }

    /// `points + 10 * listings + 25 * repaired listings`
    pub fn compute_score(&self, points: u32, listings: &[ListingStatus]) -> u64 {
        let repaired = listings
            .iter()
            .filter(|status| **status == ListingStatus::Repaired)
            .count() as u64;

        u64::from(points) + LISTING_BONUS * listings.len() as u64 + REPAIR_BONUS * repaired
    }

    /// Score every candidate and return the top `limit` entries.
    ///
    /// Entries are ordered by score descending; equal scores are ordered by
    /// ascending user id so the output never depends on input order.
    pub fn rank(&self, candidates: &[ScoringCandidate], limit: usize) -> Vec<RankedEntry> {
        let mut ranked: Vec<RankedEntry> = candidates
            .iter()
            .map(|candidate| RankedEntry {
                id: candidate.id.clone(),
                name: candidate.name.clone(),
                image: candidate.image.clone(),
                score: self.compute_score(candidate.points, &candidate.listings),
                listing_count: candidate.listing_count(),
                repaired_count: candidate.repaired_count(),
            })
            .collect();

        ranked.sort_by(compare_entries);
        ranked.truncate(limit);
        ranked
    }

    /// 1-based position of `target` in `entries`, `None` when it is unranked
    pub fn find_rank(&self, entries: &[RankedEntry], target: &UserId) -> Option<usize> {
        entries
            .iter()
            .position(|entry| &entry.id == target)
            .map(|index| index + 1)
    }
}

fn compare_entries(a: &RankedEntry, b: &RankedEntry) -> Ordering {
    b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_id(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn candidate(id: &str, points: u32, listings: Vec<ListingStatus>) -> ScoringCandidate {
        ScoringCandidate::new(user_id(id), points, listings)
    }

    fn population(size: usize) -> Vec<ScoringCandidate> {
        (0..size)
            .map(|i| {
                let listings = (0..i % 4)
                    .map(|j| {
                        if j % 2 == 0 {
                            ListingStatus::Available
                        } else {
                            ListingStatus::Repaired
                        }
                    })
                    .collect();
                candidate(&format!("user-{:03}", i), (i as u32 * 7) % 30, listings)
            })
            .collect()
    }

    #[test]
    fn test_score_without_listings_is_baseline() {
        let engine = ScoreEngine::new();
        assert_eq!(engine.compute_score(0, &[]), 0);
        assert_eq!(engine.compute_score(42, &[]), 42);
    }

    #[test]
    fn test_score_mixed_statuses() {
        let engine = ScoreEngine::new();
        let listings = [
            ListingStatus::Available,
            ListingStatus::Repaired,
            ListingStatus::Repaired,
        ];

        assert_eq!(engine.compute_score(0, &listings), 80);
    }

    #[test]
    fn test_removed_listing_earns_listing_bonus_only() {
        let engine = ScoreEngine::new();
        assert_eq!(engine.compute_score(5, &[ListingStatus::Removed]), 15);
    }

    #[test]
    fn test_score_matches_formula() {
        let engine = ScoreEngine::new();

        for c in population(40) {
            let repaired = c.repaired_count() as u64;
            let expected = c.points as u64 + 10 * c.listings.len() as u64 + 25 * repaired;
            assert_eq!(engine.compute_score(c.points, &c.listings), expected);
        }
    }

    #[test]
    fn test_score_does_not_overflow() {
        let engine = ScoreEngine::new();
        let listings = vec![ListingStatus::Repaired; 1000];

        assert_eq!(
            engine.compute_score(u32::MAX, &listings),
            u32::MAX as u64 + 35_000
        );
    }

    #[test]
    fn test_rank_two_users() {
        let engine = ScoreEngine::new();
        let a = candidate("user-a", 0, vec![]);
        let b = candidate("user-b", 5, vec![ListingStatus::Repaired]);

        let ranked = engine.rank(&[a.clone(), b.clone()], 10);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, b.id);
        assert_eq!(ranked[0].score, 40);
        assert_eq!(ranked[0].listing_count, 1);
        assert_eq!(ranked[0].repaired_count, 1);
        assert_eq!(ranked[1].id, a.id);
        assert_eq!(ranked[1].score, 0);
        assert_eq!(engine.find_rank(&ranked, &a.id), Some(2));
    }

    #[test]
    fn test_rank_limit_larger_than_population() {
        let engine = ScoreEngine::new();
        let ranked = engine.rank(&population(5), 20);
        assert_eq!(ranked.len(), 5);
    }

    #[test]
    fn test_rank_length_is_min_of_limit_and_population() {
        let engine = ScoreEngine::new();

        for size in [0, 1, 5, 25] {
            let users = population(size);
            for limit in [0, 1, 3, 20, 100] {
                assert_eq!(engine.rank(&users, limit).len(), limit.min(size));
            }
        }
    }

    #[test]
    fn test_rank_empty_population() {
        let engine = ScoreEngine::new();
        assert!(engine.rank(&[], 20).is_empty());
    }

    #[test]
    fn test_rank_is_non_increasing() {
        let engine = ScoreEngine::new();
        let ranked = engine.rank(&population(30), 30);

        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_rank_ties_broken_by_ascending_id() {
        let engine = ScoreEngine::new();
        let users = vec![
            candidate("user-c", 10, vec![]),
            candidate("user-a", 10, vec![]),
            candidate("user-b", 10, vec![]),
        ];

        let ranked = engine.rank(&users, 10);
        let ids: Vec<&str> = ranked.iter().map(|e| e.id.as_str()).collect();

        assert_eq!(ids, vec!["user-a", "user-b", "user-c"]);
    }

    #[test]
    fn test_rank_independent_of_input_order() {
        let engine = ScoreEngine::new();
        let users = population(15);
        let mut reversed = users.clone();
        reversed.reverse();

        assert_eq!(engine.rank(&users, 10), engine.rank(&reversed, 10));
    }

    #[test]
    fn test_rank_is_idempotent() {
        let engine = ScoreEngine::new();
        let users = population(12);

        assert_eq!(engine.rank(&users, 8), engine.rank(&users, 8));
    }

    #[test]
    fn test_find_rank_outside_window_is_unranked() {
        let engine = ScoreEngine::new();
        let mut users = population(25);
        let straggler = candidate("zz-last", 0, vec![]);
        users.push(straggler.clone());

        let top = engine.rank(&users, 20);

        assert_eq!(top.len(), 20);
        assert_eq!(engine.find_rank(&top, &straggler.id), None);
    }

    #[test]
    fn test_find_rank_within_bounds() {
        let engine = ScoreEngine::new();
        let ranked = engine.rank(&population(10), 10);

        for (index, entry) in ranked.iter().enumerate() {
            assert_eq!(engine.find_rank(&ranked, &entry.id), Some(index + 1));
        }
    }

    #[test]
    fn test_ranked_entry_serializes_camel_case() {
        let engine = ScoreEngine::new();
        let ranked = engine.rank(
            &[candidate("user-a", 1, vec![ListingStatus::Repaired]).with_name("Ada")],
            1,
        );

        let json = serde_json::to_value(&ranked[0]).unwrap();
        assert_eq!(json["id"], "user-a");
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["score"], 36);
        assert_eq!(json["listingCount"], 1);
        assert_eq!(json["repairedCount"], 1);
    }
}
