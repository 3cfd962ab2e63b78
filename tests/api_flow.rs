//! End-to-end HTTP flows against the router with in-memory storage

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use repaired::api::{create_router_with_state, AppState};
use repaired::create_in_memory_app_state;
use repaired::domain::user::UserId;

const PASSWORD: &str = "Secure#Pass1";

struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    fn new() -> Self {
        let state = create_in_memory_app_state();
        let router = create_router_with_state(state.clone(), None);
        Self { router, state }
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, value)
    }

    /// Register an account and return (token, user id)
    async fn register(&self, name: &str, email: &str) -> (String, String) {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": PASSWORD,
                    "confirmPassword": PASSWORD,
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    async fn create_listing(&self, token: &str, title: &str, product: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/listings",
                Some(token),
                Some(json!({
                    "title": title,
                    "type": "bud",
                    "product": product,
                    "condition": "Good",
                    "side": "LEFT",
                    "latitude": 52.52,
                    "longitude": 13.405,
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.request(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"][0]["name"], "storage");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "name": "Ada",
                "email": "Ada@Example.com",
                "password": PASSWORD,
                "confirmPassword": PASSWORD,
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["points"], 0);
    assert!(body["expiresAt"].is_string());
    assert!(body["user"].get("passwordHash").is_none());

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = app.request(Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada");

    let (status, body) = app
        .request(Method::POST, "/auth/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = TestApp::new();
    app.register("Ada", "ada@example.com").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "Wrong#Pass1"})),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["type"], "authentication_error");
}

#[tokio::test]
async fn test_register_validation_and_duplicates() {
    let app = TestApp::new();
    app.register("Ada", "ada@example.com").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "name": "Ada Again",
                "email": "ADA@example.com",
                "password": PASSWORD,
                "confirmPassword": PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "name": "Bob",
                "email": "bob@example.com",
                "password": "weak",
                "confirmPassword": "weak",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_protected_endpoints_require_session() {
    let app = TestApp::new();

    for (method, uri) in [
        (Method::GET, "/auth/me"),
        (Method::GET, "/api/profile"),
        (Method::GET, "/api/leaderboard"),
        (Method::GET, "/leaderboard"),
        (Method::GET, "/api/messages?listingId=abc"),
    ] {
        let (status, _) = app.request(method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} should need a session", uri);
    }

    let (status, _) = app
        .request(Method::GET, "/auth/me", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/listings",
            None,
            Some(json!({"title": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_browse_listings_with_filters() {
    let app = TestApp::new();
    let (token, _) = app.register("Ada", "ada@example.com").await;

    app.create_listing(&token, "Left bud", "AirPods Pro 2").await;
    app.create_listing(&token, "Spare bud", "Galaxy Buds2").await;

    let (status, body) = app.request(Method::GET, "/api/listings", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let listings = body.as_array().unwrap();
    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0]["title"], "Spare bud");
    assert_eq!(listings[0]["user"]["name"], "Ada");
    assert_eq!(listings[0]["type"], "BUD");
    assert_eq!(listings[0]["side"], "LEFT");

    let (_, body) = app
        .request(Method::GET, "/api/listings?product=airpods", None, None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app
        .request(Method::GET, "/api/listings?type=Case", None, None)
        .await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_listing_validation() {
    let app = TestApp::new();
    let (token, _) = app.register("Ada", "ada@example.com").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/listings",
            Some(&token),
            Some(json!({
                "title": "",
                "type": "bud",
                "product": "AirPods",
                "condition": "Good",
                "latitude": 0.0,
                "longitude": 0.0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].is_string());

    let (status, _) = app
        .request(
            Method::POST,
            "/api/listings",
            Some(&token),
            Some(json!({
                "title": "Bud",
                "type": "bud",
                "product": "AirPods",
                "condition": "Good",
                "latitude": 91.0,
                "longitude": 0.0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_owner_can_modify_listing() {
    let app = TestApp::new();
    let (owner, _) = app.register("Ada", "ada@example.com").await;
    let (other, _) = app.register("Bob", "bob@example.com").await;
    let listing_id = app.create_listing(&owner, "Left bud", "AirPods").await;
    let uri = format!("/api/listings/{}", listing_id);

    let (status, body) = app
        .request(
            Method::PATCH,
            &uri,
            Some(&other),
            Some(json!({"status": "REPAIRED"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["type"], "permission_error");

    let (status, _) = app.request(Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(
            Method::PATCH,
            &uri,
            Some(&owner),
            Some(json!({"status": "REPAIRED", "price": 12.5, "description": null})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "REPAIRED");
    assert_eq!(body["price"], 12.5);

    // Repaired listings drop out of the public browse view
    let (_, body) = app.request(Method::GET, "/api/listings", None, None).await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = app
        .request(
            Method::PATCH,
            &uri,
            Some(&owner),
            Some(json!({"status": "SOLD"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_and_malformed_listing_ids() {
    let app = TestApp::new();
    let (token, _) = app.register("Ada", "ada@example.com").await;

    let (status, _) = app
        .request(Method::GET, "/api/listings/does-not-exist", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(Method::DELETE, "/api/listings/does-not-exist", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request(Method::GET, "/api/listings/bad%20id", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["param"], "id");
}

#[tokio::test]
async fn test_message_thread_visibility() {
    let app = TestApp::new();
    let (owner, owner_id) = app.register("Ada", "ada@example.com").await;
    let (buyer, _) = app.register("Bob", "bob@example.com").await;
    let (stranger, _) = app.register("Carol", "carol@example.com").await;
    let listing_id = app.create_listing(&owner, "Left bud", "AirPods").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/messages",
            Some(&buyer),
            Some(json!({
                "listingId": listing_id,
                "receiverId": owner_id,
                "content": "  Is this still available?  ",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["content"], "Is this still available?");
    assert_eq!(body["sender"]["name"], "Bob");
    assert_eq!(body["receiver"]["name"], "Ada");

    let thread_uri = format!("/api/messages?listingId={}", listing_id);

    let (_, body) = app.request(Method::GET, &thread_uri, Some(&owner), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app.request(Method::GET, &thread_uri, Some(&buyer), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app
        .request(Method::GET, &thread_uri, Some(&stranger), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    // The listing detail view carries the whole thread
    let (_, body) = app
        .request(Method::GET, &format!("/api/listings/{}", listing_id), None, None)
        .await;
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["sender"]["name"], "Bob");
}

#[tokio::test]
async fn test_send_message_errors() {
    let app = TestApp::new();
    let (owner, owner_id) = app.register("Ada", "ada@example.com").await;
    let (buyer, _) = app.register("Bob", "bob@example.com").await;
    let listing_id = app.create_listing(&owner, "Left bud", "AirPods").await;

    let (status, body) = app
        .request(Method::GET, "/api/messages", Some(&buyer), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "listingId is required");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/messages",
            Some(&buyer),
            Some(json!({"listingId": listing_id, "receiverId": owner_id, "content": "   "})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Missing required fields");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/messages",
            Some(&owner),
            Some(json!({"listingId": listing_id, "receiverId": owner_id, "content": "hi"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Cannot send message to yourself");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/messages",
            Some(&buyer),
            Some(json!({"listingId": "missing", "receiverId": owner_id, "content": "hi"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/messages",
            Some(&buyer),
            Some(json!({"listingId": listing_id, "receiverId": "ghost", "content": "hi"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Receiver not found");
}

#[tokio::test]
async fn test_deleting_listing_removes_thread() {
    let app = TestApp::new();
    let (owner, owner_id) = app.register("Ada", "ada@example.com").await;
    let (buyer, _) = app.register("Bob", "bob@example.com").await;
    let listing_id = app.create_listing(&owner, "Left bud", "AirPods").await;

    app.request(
        Method::POST,
        "/api/messages",
        Some(&buyer),
        Some(json!({"listingId": listing_id, "receiverId": owner_id, "content": "hi"})),
    )
    .await;

    let uri = format!("/api/listings/{}", listing_id);
    let (status, body) = app.request(Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Listing deleted");

    let (status, _) = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app
        .request(
            Method::GET,
            &format!("/api/messages?listingId={}", listing_id),
            Some(&buyer),
            None,
        )
        .await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_leaderboard_and_profile_share_scores() {
    let app = TestApp::new();
    let (ada, ada_id) = app.register("Ada", "ada@example.com").await;
    let (bob, bob_id) = app.register("Bob", "bob@example.com").await;

    // Ada: one repaired listing, 10 + 25 = 35
    let listing_id = app.create_listing(&ada, "Left bud", "AirPods").await;
    app.request(
        Method::PATCH,
        &format!("/api/listings/{}", listing_id),
        Some(&ada),
        Some(json!({"status": "REPAIRED"})),
    )
    .await;

    // Bob: 50 baseline points, no listings
    app.state
        .user_service
        .award_points(&UserId::new(bob_id.clone()).unwrap(), 50)
        .await
        .unwrap();

    let (status, body) = app
        .request(Method::GET, "/api/leaderboard", Some(&ada), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentUserId"], ada_id.as_str());
    assert_eq!(body["currentUserRank"], 2);

    let board = body["leaderboard"].as_array().unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!(board[0]["id"], bob_id.as_str());
    assert_eq!(board[0]["score"], 50);
    assert_eq!(board[1]["score"], 35);
    assert_eq!(board[1]["listingCount"], 1);
    assert_eq!(board[1]["repairedCount"], 1);

    let (status, body) = app.request(Method::GET, "/api/profile", Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 35);
    assert_eq!(body["repairedCount"], 1);
    assert_eq!(body["availableCount"], 0);
    assert_eq!(body["rank"], 2);
    assert_eq!(body["listings"].as_array().unwrap().len(), 1);

    let (_, body) = app.request(Method::GET, "/api/profile", Some(&bob), None).await;
    assert_eq!(body["rank"], 1);
    assert_eq!(body["points"], 50);
}

#[tokio::test]
async fn test_leaderboard_page_renders_html() {
    let app = TestApp::new();
    let (token, _) = app.register("Ada", "ada@example.com").await;

    let request = Request::builder()
        .uri("/leaderboard")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("How points are earned"));
    assert!(html.contains("Ada (you)"));
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = TestApp::new();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert!(response.headers().contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_message_thread_checks_session_before_query() {
    let app = TestApp::new();

    let (status, _) = app.request(Method::GET, "/api/messages", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (token, _) = app.register("Ada", "ada@example.com").await;
    let (status, _) = app
        .request(Method::GET, "/api/messages", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
