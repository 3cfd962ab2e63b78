//! Infrastructure layer - storage backends, services and observability

pub mod auth;
pub mod leaderboard;
pub mod listing;
pub mod logging;
pub mod message;
pub mod observability;
pub mod storage;
pub mod user;
