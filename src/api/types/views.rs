//! Wire representations of users, listings and messages

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::listing::Listing;
use crate::domain::message::Message;
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;
use crate::infrastructure::user::UserService;

/// Public face of a user attached to listings and messages
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            name: user.name().map(str::to_string),
            image: user.image().map(str::to_string),
        }
    }
}

/// The signed-in user's own account
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub points: u32,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            name: user.name().map(str::to_string),
            email: user.email().to_string(),
            image: user.image().map(str::to_string),
            points: user.points(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub listing_type: &'static str,
    pub product: String,
    pub condition: &'static str,
    pub side: Option<&'static str>,
    pub latitude: f64,
    pub longitude: f64,
    pub images: Vec<String>,
    pub price: Option<f64>,
    pub status: &'static str,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

impl ListingResponse {
    pub fn new(listing: &Listing) -> Self {
        Self {
            id: listing.id().as_str().to_string(),
            title: listing.title().to_string(),
            description: listing.description().map(str::to_string),
            listing_type: listing.listing_type().as_str(),
            product: listing.product().to_string(),
            condition: listing.condition().as_str(),
            side: listing.side().map(|s| s.as_str()),
            latitude: listing.latitude(),
            longitude: listing.longitude(),
            images: listing.images().to_vec(),
            price: listing.price(),
            status: listing.status().as_str(),
            user_id: listing.user_id().as_str().to_string(),
            created_at: listing.created_at(),
            updated_at: listing.updated_at(),
            user: None,
        }
    }

    pub fn with_owner(mut self, owner: Option<UserSummary>) -> Self {
        self.user = owner;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub listing_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<UserSummary>,
}

impl MessageResponse {
    pub fn new(message: &Message) -> Self {
        Self {
            id: message.id().as_str().to_string(),
            listing_id: message.listing_id().as_str().to_string(),
            sender_id: message.sender_id().as_str().to_string(),
            receiver_id: message.receiver_id().as_str().to_string(),
            content: message.content().to_string(),
            created_at: message.created_at(),
            sender: None,
            receiver: None,
        }
    }
}

/// Summaries for a set of user ids, looked up once each
///
/// Ids that no longer resolve to an account are left out.
pub async fn load_summaries<'a>(
    users: &UserService,
    ids: impl IntoIterator<Item = &'a UserId>,
) -> Result<HashMap<UserId, UserSummary>, DomainError> {
    let ids: Vec<UserId> = ids.into_iter().cloned().collect();
    let mut summaries = HashMap::new();

    for id in &ids {
        if summaries.contains_key(id) {
            continue;
        }
        if let Some(user) = users.get(id.as_str()).await? {
            summaries.insert(id.clone(), UserSummary::from(&user));
        }
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::listing::{Condition, ListingId, ListingType, NewListing};
    use crate::infrastructure::user::{Argon2Hasher, InMemoryUserRepository};

    fn sample_listing() -> Listing {
        Listing::new(
            ListingId::new("listing-1").unwrap(),
            UserId::new("user-1").unwrap(),
            NewListing {
                title: "Left AirPod".to_string(),
                description: None,
                listing_type: ListingType::Bud,
                product: "AirPods Pro".to_string(),
                condition: Condition::Good,
                side: None,
                latitude: 52.5,
                longitude: 13.4,
                images: vec![],
            },
        )
    }

    #[test]
    fn test_listing_response_uses_camel_case() {
        let json = serde_json::to_value(ListingResponse::new(&sample_listing())).unwrap();

        assert_eq!(json["type"], "BUD");
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["status"], "AVAILABLE");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("user").is_none());
    }

    #[test]
    fn test_user_response_omits_password_hash() {
        let user = User::new(
            UserId::new("user-1").unwrap(),
            Some("Ada".to_string()),
            "ada@example.com",
            "$argon2id$secret",
        );

        let json = serde_json::to_string(&UserResponse::from(&user)).unwrap();

        assert!(json.contains("ada@example.com"));
        assert!(!json.contains("argon2"));
    }

    #[tokio::test]
    async fn test_load_summaries_dedupes_and_skips_unknown() {
        let ada = User::new(
            UserId::new("user-1").unwrap(),
            Some("Ada".to_string()),
            "ada@example.com",
            "hash",
        );
        let users = UserService::new(
            Arc::new(InMemoryUserRepository::with_users(vec![ada])),
            Arc::new(Argon2Hasher::new()),
        );
        let known = UserId::new("user-1").unwrap();
        let ghost = UserId::new("ghost").unwrap();

        let summaries = load_summaries(&users, [&known, &ghost, &known])
            .await
            .unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[&known].name.as_deref(), Some("Ada"));
        assert!(!summaries.contains_key(&ghost));
    }
}
