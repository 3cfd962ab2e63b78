//! Leaderboard service
//!
//! Loads users and listing statuses from storage and hands them to the
//! [`ScoreEngine`]. The JSON endpoint, the HTML page and the profile all go
//! through this one path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::domain::listing::{ListingRepository, ListingStatus};
use crate::domain::scoring::{RankedEntry, ScoreEngine, ScoringCandidate};
use crate::domain::user::{UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_leaderboard_computation;

/// Score breakdown for a single user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
    pub score: u64,
    pub listing_count: usize,
    pub available_count: usize,
    pub repaired_count: usize,
}

#[derive(Debug, Clone)]
pub struct LeaderboardService {
    users: Arc<dyn UserRepository>,
    listings: Arc<dyn ListingRepository>,
    engine: ScoreEngine,
}

impl LeaderboardService {
    pub fn new(users: Arc<dyn UserRepository>, listings: Arc<dyn ListingRepository>) -> Self {
        Self {
            users,
            listings,
            engine: ScoreEngine::new(),
        }
    }

    /// Top `limit` users by score
    pub async fn standings(&self, limit: usize) -> Result<Vec<RankedEntry>, DomainError> {
        let candidates = self.candidates().await?;
        let started = Instant::now();

        let entries = self.engine.rank(&candidates, limit);

        record_leaderboard_computation(candidates.len(), started.elapsed());
        debug!(
            population = candidates.len(),
            returned = entries.len(),
            "Computed leaderboard"
        );

        Ok(entries)
    }

    /// 1-based rank of a user across the whole population
    pub async fn rank_of(&self, user_id: &UserId) -> Result<Option<usize>, DomainError> {
        let candidates = self.candidates().await?;
        let started = Instant::now();

        let entries = self.engine.rank(&candidates, candidates.len());

        record_leaderboard_computation(candidates.len(), started.elapsed());
        Ok(self.engine.find_rank(&entries, user_id))
    }

    /// Position of a user inside an already computed window
    pub fn position_in(&self, entries: &[RankedEntry], user_id: &UserId) -> Option<usize> {
        self.engine.find_rank(entries, user_id)
    }

    /// Score and listing counts for one user
    pub async fn score_card(&self, user_id: &UserId) -> Result<ScoreCard, DomainError> {
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", user_id)))?;

        let statuses: Vec<ListingStatus> = self
            .listings
            .list_by_owner(user_id)
            .await?
            .iter()
            .map(|l| l.status())
            .collect();

        let count = |wanted: ListingStatus| statuses.iter().filter(|s| **s == wanted).count();

        Ok(ScoreCard {
            score: self.engine.compute_score(user.points(), &statuses),
            listing_count: statuses.len(),
            available_count: count(ListingStatus::Available),
            repaired_count: count(ListingStatus::Repaired),
        })
    }

    async fn candidates(&self) -> Result<Vec<ScoringCandidate>, DomainError> {
        let users = self.users.list().await?;
        let mut statuses: HashMap<UserId, Vec<ListingStatus>> =
            self.listings.statuses_by_owner().await?;

        Ok(users
            .iter()
            .map(|user| {
                let listings = statuses.remove(user.id()).unwrap_or_default();
                ScoringCandidate::from_user(user, listings)
            })
            .collect())
    }
}
