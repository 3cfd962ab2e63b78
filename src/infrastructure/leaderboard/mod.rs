//! Leaderboard infrastructure

mod service;

pub use service::{LeaderboardService, ScoreCard};
