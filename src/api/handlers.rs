//! HTTP request handlers and command routing

use super::types::{
    ErrorResponse, HikeListResponse, ListHikesParams, MessageRequest, MessageResponse,
    SetPublishedRequest,
};
use super::AppState;
use crate::db::{DbError, Hike};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

/// Default page size for listings, API and chat alike.
const HIKES_PAGE_SIZE: u32 = 10;
/// How much of a description the chat listing shows.
const DESC_MAX_CHARS: usize = 140;

const HELP_TEXT: &str = "What this bot can do:\n\
    \u{2022} /newhike \u{2014} start the hike-creation wizard\n\
    \u{2022} /hikes \u{2014} list recent hikes\n\
    \u{2022} /cancel \u{2014} abandon the current wizard";

const MENU_HINT: &str = "Send /newhike to create a hike, or /hikes to list recent ones.";

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/messages", post(post_message))
        .route("/api/flows/:user_id", post(begin_flow))
        .route("/api/flows/:user_id/cancel", post(cancel_flow))
        .route("/api/hikes", get(list_hikes))
        .route("/api/hikes/:id", get(get_hike))
        .route("/api/hikes/:id/published", post(set_published))
        .with_state(state)
}

// ============================================================
// Chat surface
// ============================================================

/// One inbound chat message: commands are routed here and bypass the
/// flow entirely; everything else goes to the flow only while a wizard
/// is active.
async fn post_message(
    State(state): State<AppState>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = req.user_id;
    let text = req.text.trim();

    let mut replies = Vec::new();
    if let Some(rest) = text.strip_prefix('/') {
        let command = rest.split_whitespace().next().unwrap_or("");
        match command {
            "newhike" => {
                state.runtime.begin(user_id).await.map_err(internal)?;
                replies = state.outbox.drain(user_id);
            }
            "cancel" => {
                state.runtime.cancel(user_id).await.map_err(internal)?;
                replies = state.outbox.drain(user_id);
            }
            "hikes" => {
                let hikes = state.db.list_hikes(HIKES_PAGE_SIZE).map_err(internal)?;
                replies.push(render_hike_list(&hikes));
            }
            "help" => replies.push(HELP_TEXT.to_string()),
            _ => replies.push(format!("Unknown command /{command}.\n{HELP_TEXT}")),
        }
    } else if state.runtime.state(user_id).is_active() {
        state
            .runtime
            .handle_text(user_id, text)
            .await
            .map_err(internal)?;
        replies = state.outbox.drain(user_id);
    } else {
        replies.push(MENU_HINT.to_string());
    }

    Ok(Json(MessageResponse {
        replies,
        state: state.runtime.state(user_id),
    }))
}

async fn begin_flow(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.runtime.begin(user_id).await.map_err(internal)?;
    Ok(Json(MessageResponse {
        replies: state.outbox.drain(user_id),
        state: state.runtime.state(user_id),
    }))
}

async fn cancel_flow(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.runtime.cancel(user_id).await.map_err(internal)?;
    Ok(Json(MessageResponse {
        replies: state.outbox.drain(user_id),
        state: state.runtime.state(user_id),
    }))
}

// ============================================================
// Hike listing and publication
// ============================================================

async fn list_hikes(
    State(state): State<AppState>,
    Query(params): Query<ListHikesParams>,
) -> Result<Json<HikeListResponse>, ApiError> {
    let limit = params.limit.unwrap_or(HIKES_PAGE_SIZE);
    let hikes = state.db.list_hikes(limit).map_err(internal)?;
    Ok(Json(HikeListResponse { hikes }))
}

async fn get_hike(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Hike>, ApiError> {
    state.db.get_hike(id).map(Json).map_err(db_error)
}

async fn set_published(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<SetPublishedRequest>,
) -> Result<Json<Hike>, ApiError> {
    state.db.set_published(id, req.published).map_err(db_error)?;
    state.db.get_hike(id).map(Json).map_err(db_error)
}

// ============================================================
// Helpers
// ============================================================

fn internal(e: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

fn db_error(e: DbError) -> ApiError {
    match e {
        DbError::HikeNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
        other => internal(other),
    }
}

/// Chat rendering of the recent-hikes listing.
fn render_hike_list(hikes: &[Hike]) -> String {
    use std::fmt::Write;

    if hikes.is_empty() {
        return "No hikes yet. Send /newhike to create one.".to_string();
    }

    let mut out = String::from("Recent hikes:\n\n");
    for (i, hike) in hikes.iter().enumerate() {
        let status = if hike.is_published {
            "published"
        } else {
            "draft"
        };
        let mut description = normalize_one_line(&hike.description);
        if description.is_empty() {
            description = "(no description)".to_string();
        }
        let description = truncate_chars(&description, DESC_MAX_CHARS);

        let title = hike.title.trim();
        let title = if title.is_empty() { "(untitled)" } else { title };

        let _ = writeln!(out, "{}. {title}", i + 1);
        let _ = writeln!(out, "   {description}");
        let _ = writeln!(
            out,
            "   {} \u{2014} {}   [{status}]",
            hike.starts_at.format("%d.%m %H:%M"),
            hike.ends_at.format("%d.%m %H:%M"),
        );
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Collapse newlines, tabs, and repeated spaces into single spaces.
fn normalize_one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate on a char boundary, appending an ellipsis when cut.
fn truncate_chars(s: &str, limit: usize) -> String {
    if limit == 0 {
        return String::new();
    }
    if s.chars().count() <= limit {
        return s.to_string();
    }
    let cut: String = s.chars().take(limit - 1).collect();
    format!("{cut}\u{2026}")
}
