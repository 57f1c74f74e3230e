//! Note REST routes.
//!
//! The websocket interface is the primary surface; these routes cover
//! non-realtime clients and smoke checks. They go through the same services
//! as the ws dispatch, so validation and confirmation semantics match.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::layout::DEFAULT_VIEWPORT_WIDTH;
use crate::note::{BoardSnapshot, NoteColor, NotePatch};
use crate::routes::auth::AuthUser;
use crate::services::{lifecycle, sync};
use crate::state::AppState;

fn lifecycle_error_to_status(err: &lifecycle::LifecycleError) -> StatusCode {
    match err {
        lifecycle::LifecycleError::EmptyText => StatusCode::BAD_REQUEST,
        lifecycle::LifecycleError::MissingUser => StatusCode::UNAUTHORIZED,
        lifecycle::LifecycleError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct ListQuery {
    /// Viewport width used to auto-place notes without stored coordinates.
    pub viewport_width: Option<f64>,
}

/// `GET /api/notes` — the caller's canvas-ready notes in arrival order.
pub async fn list_notes(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<BoardSnapshot>, StatusCode> {
    let subscription = state
        .store
        .subscribe(auth.user.id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let width = query.viewport_width.unwrap_or(DEFAULT_VIEWPORT_WIDTH);
    Ok(Json(sync::materialize(&subscription.initial, width)))
}

#[derive(Deserialize)]
pub struct CreateNoteBody {
    pub text: String,
    #[serde(default)]
    pub color: NoteColor,
}

/// `POST /api/notes` — create a note at a random initial position.
pub async fn create_note(State(state): State<AppState>, auth: AuthUser, Json(body): Json<CreateNoteBody>) -> Response {
    match lifecycle::create(state.store.as_ref(), Some(auth.user.id), &body.text, body.color).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => (lifecycle_error_to_status(&e), e.to_string()).into_response(),
    }
}

/// `PATCH /api/notes/:id` — merge-update text/color/position.
pub async fn patch_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(note_id): Path<Uuid>,
    Json(patch): Json<NotePatch>,
) -> Response {
    if let Some(text) = &patch.text {
        if text.trim().is_empty() {
            return (StatusCode::BAD_REQUEST, "note text must not be empty").into_response();
        }
    }

    match state.store.merge_update(auth.user.id, note_id, patch).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!(error = %e, %note_id, "note patch failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// `DELETE /api/notes/:id?confirm=true` — permanent delete behind the
/// confirmation gate.
pub async fn delete_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(note_id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> Response {
    match lifecycle::delete(state.store.as_ref(), Some(auth.user.id), note_id, || query.confirm).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (StatusCode::PRECONDITION_REQUIRED, "confirm=true required").into_response(),
        Err(e) => (lifecycle_error_to_status(&e), e.to_string()).into_response(),
    }
}

#[cfg(test)]
#[path = "notes_test.rs"]
mod tests;
