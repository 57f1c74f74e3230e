//! DragController — turn a finished drag gesture into one clamped write.
//!
//! DESIGN
//! ======
//! Only the final position of a gesture is persisted, bounding write volume
//! to one store write per completed drag. There is no optimistic local
//! mutation: the subscription round-trip republishes the new position, and a
//! failed write simply leaves the last good snapshot in place so the UI
//! snaps back.

use tracing::debug;
use uuid::Uuid;

use crate::layout::{ContainerBounds, clamp};
use crate::note::{BoardSnapshot, NotePatch};
use crate::store::{NoteStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum DragError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl crate::frame::ErrorCode for DragError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.retryable(),
        }
    }
}

/// Apply a drag delta to a note and persist the clamped result.
///
/// A note id absent from the snapshot is a silent no-op (the note was
/// deleted mid-drag) and returns `Ok(None)`. Otherwise returns the persisted
/// position.
///
/// # Errors
///
/// Propagates store write failures; the snapshot is left untouched.
pub async fn on_drag_end(
    store: &dyn NoteStore,
    owner_id: Uuid,
    note_id: Uuid,
    delta: (f64, f64),
    snapshot: &BoardSnapshot,
    bounds: ContainerBounds,
) -> Result<Option<(f64, f64)>, DragError> {
    let Some(note) = snapshot.get(note_id) else {
        debug!(%note_id, "drag target no longer in snapshot; ignoring");
        return Ok(None);
    };

    let (x, y) = clamp(note.x + delta.0, note.y + delta.1, bounds);
    store.merge_update(owner_id, note_id, NotePatch::position(x, y)).await?;

    debug!(%note_id, x, y, "drag persisted");
    Ok(Some((x, y)))
}

#[cfg(test)]
#[path = "drag_test.rs"]
mod tests;
