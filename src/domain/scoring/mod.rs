//! Scoring domain
//!
//! Derives a contribution score for every user from their baseline points and
//! the status of the listings they own, and ranks users by that score for the
//! leaderboard.

mod engine;
mod entry;

pub use engine::{ScoreEngine, LISTING_BONUS, REPAIR_BONUS};
pub use entry::{RankedEntry, ScoringCandidate};
