//! Domain layer - Core business logic and entities

pub mod error;
pub mod listing;
pub mod message;
pub mod scoring;
pub mod user;

pub use error::DomainError;
pub use listing::{
    Condition, Listing, ListingFilter, ListingId, ListingRepository, ListingStatus, ListingType,
    Side,
};
pub use message::{Message, MessageId, MessageRepository};
pub use scoring::{RankedEntry, ScoreEngine, ScoringCandidate};
pub use user::{User, UserId, UserRepository};
