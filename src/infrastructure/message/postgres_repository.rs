//! PostgreSQL message repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::listing::ListingId;
use crate::domain::message::{Message, MessageId, MessageRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// PostgreSQL implementation of MessageRepository
#[derive(Debug, Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn create(&self, message: Message) -> Result<Message, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, listing_id, sender_id, receiver_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id().as_str())
        .bind(message.listing_id().as_str())
        .bind(message.sender_id().as_str())
        .bind(message.receiver_id().as_str())
        .bind(message.content())
        .bind(message.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("foreign key") {
                DomainError::not_found("Listing or receiver not found")
            } else {
                DomainError::storage(format!("Failed to create message: {}", e))
            }
        })?;

        Ok(message)
    }

    async fn list_for_listing(&self, listing_id: &ListingId) -> Result<Vec<Message>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, listing_id, sender_id, receiver_id, content, created_at
            FROM messages
            WHERE listing_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(listing_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list messages: {}", e)))?;

        rows.iter().map(row_to_message).collect()
    }

    async fn delete_for_listing(&self, listing_id: &ListingId) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM messages WHERE listing_id = $1")
            .bind(listing_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete messages: {}", e)))?;

        Ok(result.rows_affected())
    }
}

fn row_to_message(row: &sqlx::postgres::PgRow) -> Result<Message, DomainError> {
    let id: String = row.get("id");
    let listing_id: String = row.get("listing_id");
    let sender_id: String = row.get("sender_id");
    let receiver_id: String = row.get("receiver_id");

    let invalid = |what: &str, e: String| {
        DomainError::storage(format!("Invalid {} in database: {}", what, e))
    };

    Ok(Message::restore(
        MessageId::new(id).map_err(|e| invalid("message ID", e.to_string()))?,
        ListingId::new(listing_id).map_err(|e| invalid("listing ID", e.to_string()))?,
        UserId::new(sender_id).map_err(|e| invalid("sender ID", e.to_string()))?,
        UserId::new(receiver_id).map_err(|e| invalid("receiver ID", e.to_string()))?,
        row.get("content"),
        row.get("created_at"),
    ))
}
