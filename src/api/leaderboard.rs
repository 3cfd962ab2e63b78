//! Leaderboard as JSON and as a rendered HTML page
//!
//! Both views share one ranking call and the configured top-N window.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use serde::Serialize;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::scoring::{RankedEntry, LISTING_BONUS, REPAIR_BONUS};
use crate::domain::user::User;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<RankedEntry>,
    pub current_user_id: String,
    /// Position inside `leaderboard`, `None` outside the window
    pub current_user_rank: Option<usize>,
}

/// GET /api/leaderboard
pub async fn get_leaderboard(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let leaderboard = state
        .leaderboard_service
        .standings(state.leaderboard_limit)
        .await?;
    let current_user_rank = state.leaderboard_service.position_in(&leaderboard, user.id());

    Ok(Json(LeaderboardResponse {
        leaderboard,
        current_user_id: user.id().as_str().to_string(),
        current_user_rank,
    }))
}

/// GET /leaderboard
pub async fn leaderboard_page(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state
        .leaderboard_service
        .standings(state.leaderboard_limit)
        .await?;

    Ok(Html(render_page(&entries, &user, state.leaderboard_limit)))
}

fn render_page(entries: &[RankedEntry], viewer: &User, limit: usize) -> String {
    let mut rows = String::new();

    for (index, entry) in entries.iter().enumerate() {
        let is_viewer = &entry.id == viewer.id();
        let name = entry.name.as_deref().unwrap_or("Anonymous");
        let avatar = match entry.image.as_deref() {
            Some(url) => format!(r#"<img class="avatar" src="{}" alt="">"#, escape_html(url)),
            None => r#"<span class="avatar placeholder"></span>"#.to_string(),
        };

        rows.push_str(&format!(
            r#"<tr{class}><td class="rank">#{rank}</td><td>{avatar}{name}{you}</td><td>{listings}</td><td>{repaired}</td><td class="score">{score}</td></tr>"#,
            class = if is_viewer { r#" class="you""# } else { "" },
            rank = index + 1,
            avatar = avatar,
            name = escape_html(name),
            you = if is_viewer { " (you)" } else { "" },
            listings = entry.listing_count,
            repaired = entry.repaired_count,
            score = entry.score,
        ));
    }

    if entries.is_empty() {
        rows.push_str(r#"<tr><td colspan="5">No contributors yet.</td></tr>"#);
    }

    let outside_window = !entries.iter().any(|e| &e.id == viewer.id());
    let notice = if outside_window {
        format!(
            r#"<p class="notice">You're not in the top {} yet. List parts and mark repairs to climb.</p>"#,
            limit
        )
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Leaderboard · RePaired</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }}
table {{ width: 100%; border-collapse: collapse; }}
td, th {{ padding: 0.5rem; border-bottom: 1px solid #ddd; text-align: left; }}
tr.you {{ background: #eef7ee; font-weight: bold; }}
.avatar {{ display: inline-block; width: 1.5rem; height: 1.5rem; border-radius: 50%; margin-right: 0.5rem; vertical-align: middle; background: #ccc; }}
</style>
</head>
<body>
<h1>Leaderboard</h1>
{notice}
<table>
<thead><tr><th>Rank</th><th>User</th><th>Listings</th><th>Repaired</th><th>Score</th></tr></thead>
<tbody>{rows}</tbody>
</table>
<section>
<h2>How points are earned</h2>
<ul>
<li>+{listing_bonus} points for every listing you create</li>
<li>+{repair_bonus} points for every listing marked repaired</li>
</ul>
</section>
</body>
</html>
"#,
        notice = notice,
        rows = rows,
        listing_bonus = LISTING_BONUS,
        repair_bonus = REPAIR_BONUS,
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
