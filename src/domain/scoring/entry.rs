//! Scoring input and output types

use serde::Serialize;

use crate::domain::listing::ListingStatus;
use crate::domain::user::{User, UserId};

/// A user as seen by the score engine: baseline points plus owned listing statuses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringCandidate {
    pub id: UserId,
    pub name: Option<String>,
    pub image: Option<String>,
    pub points: u32,
    pub listings: Vec<ListingStatus>,
}

impl ScoringCandidate {
    pub fn new(id: UserId, points: u32, listings: Vec<ListingStatus>) -> Self {
        Self {
            id,
            name: None,
            image: None,
            points,
            listings,
        }
    }

    /// Build a candidate from a stored user and the statuses of their listings
    pub fn from_user(user: &User, listings: Vec<ListingStatus>) -> Self {
        Self {
            id: user.id().clone(),
            name: user.name().map(String::from),
            image: user.image().map(String::from),
            points: user.points(),
            listings,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }

    pub fn repaired_count(&self) -> usize {
        self.listings
            .iter()
            .filter(|status| **status == ListingStatus::Repaired)
            .count()
    }
}

/// One leaderboard row. Derived on every request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub id: UserId,
    pub name: Option<String>,
    pub image: Option<String>,
    pub score: u64,
    pub listing_count: usize,
    pub repaired_count: usize,
}
