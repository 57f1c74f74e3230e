//! WebSocket handler — the live board viewer.
//!
//! DESIGN
//! ======
//! On upgrade (authenticated by a one-time ticket) a BoardSync is started
//! for the connection's user, then a `select!` loop runs two directions:
//! - Incoming client frames → parse + dispatch by syscall prefix
//! - Snapshot changes from BoardSync → pushed as `board:snapshot` frames
//!
//! Handlers never touch the socket; they return reply frames and the loop
//! owns all sends. Mutations round-trip through the store subscription, so a
//! client sees its own create/drag/delete as the next snapshot push — there
//! is no optimistic echo.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → `session:connected`, then the initial `board:snapshot`
//! 2. Client frames → dispatch → reply done/error
//! 3. Store changes → `board:snapshot` pushes
//! 4. Feed loss → `E_SYNC_LOST` error frame, close (client reconnects)
//! 5. Close → `sync.stop()` on every exit path

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};
use uuid::Uuid;

use crate::frame::{Data, ErrorCode, Frame};
use crate::layout::ContainerBounds;
use crate::note::{BoardSnapshot, NoteColor};
use crate::services::sync::BoardSync;
use crate::services::{drag, lifecycle, session};
use crate::state::AppState;

/// Live sync was lost and the connection cannot recover it in place.
#[derive(Debug, thiserror::Error)]
#[error("live sync lost; reconnect to resume")]
struct SyncLost;

impl ErrorCode for SyncLost {
    fn error_code(&self) -> &'static str {
        "E_SYNC_LOST"
    }

    fn retryable(&self) -> bool {
        true
    }
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(ticket) = params.get("ticket") else {
        return (StatusCode::UNAUTHORIZED, "ticket required").into_response();
    };

    let user_id = match session::consume_ws_ticket(&state.pool, ticket).await {
        Ok(Some(uid)) => uid,
        Ok(None) => return (StatusCode::UNAUTHORIZED, "invalid or expired ticket").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "ws ticket validation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "ticket validation error").into_response();
        }
    };

    let viewport_width = params.get("viewport_width").and_then(|v| v.parse::<f64>().ok());

    ws.on_upgrade(move |socket| run_ws(socket, state, user_id, viewport_width))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, user_id: Uuid, viewport_width: Option<f64>) {
    let mut sync = BoardSync::new(Arc::clone(&state.store));
    if let Some(width) = viewport_width {
        sync.set_viewport_width(width).await;
    }

    if let Err(e) = sync.start(Some(user_id)).await {
        warn!(error = %e, %user_id, "board sync start failed");
        let _ = send_frame(&mut socket, &Frame::fault("board:sync", &e)).await;
        return;
    }
    let Some(mut snapshot_rx) = sync.subscribe() else {
        return;
    };

    info!(%user_id, "ws: client connected");

    let welcome = Frame::request("session:connected", Data::new()).with_data("user_id", user_id.to_string());
    if send_frame(&mut socket, &welcome).await.is_err() {
        sync.stop();
        return;
    }
    let initial = snapshot_frame(&sync.snapshot());
    if send_frame(&mut socket, &initial).await.is_err() {
        sync.stop();
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let replies = process_frame(&state, &mut sync, user_id, &text).await;
                        for frame in replies {
                            if send_frame(&mut socket, &frame).await.is_err() {
                                sync.stop();
                                return;
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            changed = snapshot_rx.changed() => {
                match changed {
                    Ok(()) => {
                        let frame = snapshot_frame(&snapshot_rx.borrow_and_update().clone());
                        if send_frame(&mut socket, &frame).await.is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        warn!(%user_id, "ws: snapshot stream closed");
                        let _ = send_frame(&mut socket, &Frame::fault("board:sync", &SyncLost)).await;
                        break;
                    }
                }
            }
        }
    }

    sync.stop();
    info!(%user_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and process one inbound text frame; returns frames for the sender.
///
/// Kept free of socket concerns so tests can exercise the full dispatch path
/// against the in-memory store.
async fn process_frame(state: &AppState, sync: &mut BoardSync, user_id: Uuid, text: &str) -> Vec<Frame> {
    let mut req: Frame = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(%user_id, error = %e, "ws: invalid inbound frame");
            let err = Frame::request("gateway:error", Data::new()).with_data("message", format!("invalid json: {e}"));
            return vec![err];
        }
    };

    // Stamp the authenticated user as `from`.
    req.from = Some(user_id.to_string());
    info!(%user_id, id = %req.id, syscall = %req.syscall, "ws: recv frame");

    let result = match req.prefix() {
        "note" => handle_note(state, sync, user_id, &req).await,
        "board" => handle_board(sync, &req).await,
        prefix => Err(req.error(format!("unknown prefix: {prefix}"))),
    };

    match result {
        Ok(data) if data.is_empty() => vec![req.done()],
        Ok(data) => vec![req.done_with(data)],
        Err(err_frame) => vec![err_frame],
    }
}

// =============================================================================
// NOTE HANDLERS
// =============================================================================

async fn handle_note(state: &AppState, sync: &mut BoardSync, user_id: Uuid, req: &Frame) -> Result<Data, Frame> {
    match req.op() {
        "create" => {
            let text = req.data.get("text").and_then(|v| v.as_str()).unwrap_or("");
            let color = match req.data.get("color").and_then(|v| v.as_str()) {
                None => NoteColor::default(),
                Some(hex) => NoteColor::from_hex(hex).ok_or_else(|| req.error(format!("unknown color: {hex}")))?,
            };

            match lifecycle::create(state.store.as_ref(), Some(user_id), text, color).await {
                Ok(()) => Ok(Data::new()),
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "drag" => {
            let Some(note_id) = req.data.get("id").and_then(|v| v.as_str()).and_then(|s| s.parse().ok()) else {
                return Err(req.error("id required"));
            };
            let dx = req.data.get("dx").and_then(serde_json::Value::as_f64).unwrap_or(0.0);
            let dy = req.data.get("dy").and_then(serde_json::Value::as_f64).unwrap_or(0.0);
            let Some(width) = req.data.get("width").and_then(serde_json::Value::as_f64) else {
                return Err(req.error("width required"));
            };
            let Some(height) = req.data.get("height").and_then(serde_json::Value::as_f64) else {
                return Err(req.error("height required"));
            };

            let snapshot = sync.snapshot();
            let bounds = ContainerBounds::new(width, height);
            match drag::on_drag_end(state.store.as_ref(), user_id, note_id, (dx, dy), &snapshot, bounds).await {
                // deleted mid-drag: empty done, nothing persisted
                Ok(None) => Ok(Data::new()),
                Ok(Some((x, y))) => {
                    let mut data = Data::new();
                    data.insert("x".into(), serde_json::json!(x));
                    data.insert("y".into(), serde_json::json!(y));
                    Ok(data)
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "delete" => {
            let Some(note_id) = req.data.get("id").and_then(|v| v.as_str()).and_then(|s| s.parse().ok()) else {
                return Err(req.error("id required"));
            };
            let confirmed = req
                .data
                .get("confirm")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false);

            match lifecycle::delete(state.store.as_ref(), Some(user_id), note_id, || confirmed).await {
                Ok(deleted) => {
                    let mut data = Data::new();
                    data.insert("deleted".into(), serde_json::json!(deleted));
                    Ok(data)
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        op => Err(req.error(format!("unknown note op: {op}"))),
    }
}

// =============================================================================
// BOARD HANDLERS
// =============================================================================

async fn handle_board(sync: &mut BoardSync, req: &Frame) -> Result<Data, Frame> {
    match req.op() {
        "viewport" => {
            let Some(width) = req.data.get("width").and_then(serde_json::Value::as_f64) else {
                return Err(req.error("width required"));
            };
            if !width.is_finite() || width < 0.0 {
                return Err(req.error("width must be a non-negative number"));
            }
            // applies to subsequent layout passes, not retroactively
            sync.set_viewport_width(width).await;
            Ok(Data::new())
        }
        op => Err(req.error(format!("unknown board op: {op}"))),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn snapshot_frame(snapshot: &BoardSnapshot) -> Frame {
    let mut data = Data::new();
    data.insert("notes".into(), serde_json::to_value(&snapshot.notes).unwrap_or_default());
    Frame::snapshot(data)
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    if frame.status == crate::frame::Status::Error {
        let code = frame.data.get("code").and_then(|v| v.as_str()).unwrap_or("-");
        let message = frame.data.get("message").and_then(|v| v.as_str()).unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    } else {
        info!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
    }
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
