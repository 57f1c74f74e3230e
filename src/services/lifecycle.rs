//! NoteLifecycle — validated create and confirm-gated delete.
//!
//! Validation failures surface synchronously and never reach the store.
//! Deletion is permanent: no tombstone, no undo, which is why it sits behind
//! an explicit yes/no gate supplied by the caller.

use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::note::{NoteColor, NoteDraft};
use crate::store::{NoteStore, StoreError};

/// Upper bounds (exclusive) for the random initial placement.
const INITIAL_X_RANGE: u32 = 500;
const INITIAL_Y_RANGE: u32 = 300;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("note text must not be empty")]
    EmptyText,
    #[error("no authenticated user")]
    MissingUser,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl crate::frame::ErrorCode for LifecycleError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyText => "E_EMPTY_TEXT",
            Self::MissingUser => "E_NO_USER",
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::EmptyText | Self::MissingUser => false,
            Self::Store(e) => e.retryable(),
        }
    }
}

/// Create a note at a random initial position.
///
/// The position is intentionally unclamped — the create path has no viewport
/// to clamp against, and the next layout pass or drag brings the note
/// in-bounds. The generated id is not returned; callers observe the note via
/// the next subscription push.
///
/// # Errors
///
/// `MissingUser` / `EmptyText` before any write; store errors after.
pub async fn create(
    store: &dyn NoteStore,
    owner: Option<Uuid>,
    text: &str,
    color: NoteColor,
) -> Result<(), LifecycleError> {
    let Some(owner_id) = owner else {
        return Err(LifecycleError::MissingUser);
    };
    let text = text.trim();
    if text.is_empty() {
        return Err(LifecycleError::EmptyText);
    }

    let draft = {
        let mut rng = rand::rng();
        NoteDraft {
            text: text.to_string(),
            color,
            x: Some(f64::from(rng.random_range(0..INITIAL_X_RANGE))),
            y: Some(f64::from(rng.random_range(0..INITIAL_Y_RANGE))),
        }
    };

    store.create(owner_id, draft).await?;
    info!(%owner_id, "note created");
    Ok(())
}

/// Delete a note permanently, gated on `confirm`.
///
/// Returns `Ok(false)` when the gate declines (nothing written). Deleting an
/// id that no longer exists is a no-op, not an error.
///
/// # Errors
///
/// `MissingUser` before any write; store errors after.
pub async fn delete(
    store: &dyn NoteStore,
    owner: Option<Uuid>,
    note_id: Uuid,
    confirm: impl FnOnce() -> bool,
) -> Result<bool, LifecycleError> {
    let Some(owner_id) = owner else {
        return Err(LifecycleError::MissingUser);
    };
    if !confirm() {
        return Ok(false);
    }

    store.delete(owner_id, note_id).await?;
    info!(%owner_id, %note_id, "note deleted");
    Ok(true)
}

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod tests;
