//! Message infrastructure: storage backends and the message service

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresMessageRepository;
pub use repository::InMemoryMessageRepository;
pub use service::{MessageService, SendMessageRequest};
