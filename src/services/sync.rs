//! BoardSync — keeps one session's snapshot consistent with the store.
//!
//! DESIGN
//! ======
//! One BoardSync per viewer session. `start` opens the store subscription
//! and spawns a pump task; every push rebuilds the snapshot wholesale and
//! stores it in a `watch` channel, so readers always see either the old or
//! the new snapshot, never a partial one. BoardSync never writes to the
//! store.
//!
//! ERROR HANDLING
//! ==============
//! A lagged or closed feed is fatal to this session's live sync: the pump
//! drops the watch sender, downstream `changed()` calls error, and the
//! caller is expected to `stop()` then `start()` again. No automatic
//! reconnect loop.

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::layout::{DEFAULT_VIEWPORT_WIDTH, auto_place};
use crate::note::{BoardSnapshot, Note, NoteRecord};
use crate::store::{NoteStore, StoreError};

pub struct BoardSync {
    store: Arc<dyn NoteStore>,
    viewport_width: Arc<RwLock<f64>>,
    active: Option<ActiveSync>,
}

struct ActiveSync {
    user_id: Uuid,
    task: JoinHandle<()>,
    rx: watch::Receiver<BoardSnapshot>,
}

impl BoardSync {
    #[must_use]
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self {
            store,
            viewport_width: Arc::new(RwLock::new(DEFAULT_VIEWPORT_WIDTH)),
            active: None,
        }
    }

    /// Open the live subscription for `user` and begin pumping snapshots.
    ///
    /// Idempotent per user: a second `start` replaces the previous
    /// subscription instead of duplicating it. `None` is a no-op — no notes,
    /// no subscription.
    ///
    /// # Errors
    ///
    /// Returns a store error if opening the subscription fails.
    pub async fn start(&mut self, user: Option<Uuid>) -> Result<(), StoreError> {
        self.stop();

        let Some(user_id) = user else {
            return Ok(());
        };

        let subscription = self.store.subscribe(user_id).await?;
        let width = *self.viewport_width.read().await;
        let initial = materialize(&subscription.initial, width);

        let (tx, rx) = watch::channel(initial);
        let task = tokio::spawn(pump(user_id, subscription.rx, tx, Arc::clone(&self.viewport_width)));

        info!(%user_id, "board sync started");
        self.active = Some(ActiveSync { user_id, task, rx });
        Ok(())
    }

    /// Release the subscription. Safe to call repeatedly; also runs on drop
    /// so no teardown path can leak a live listener.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.task.abort();
            info!(user_id = %active.user_id, "board sync stopped");
        }
    }

    /// The current snapshot. Empty when not started.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        self.active
            .as_ref()
            .map(|a| a.rx.borrow().clone())
            .unwrap_or_default()
    }

    /// Watch the snapshot stream. `changed()` erroring means the live sync
    /// was lost and this sync must be restarted.
    #[must_use]
    pub fn subscribe(&self) -> Option<watch::Receiver<BoardSnapshot>> {
        self.active.as_ref().map(|a| a.rx.clone())
    }

    #[must_use]
    pub fn user(&self) -> Option<Uuid> {
        self.active.as_ref().map(|a| a.user_id)
    }

    /// Update the viewport width used by subsequent layout passes.
    pub async fn set_viewport_width(&self, width: f64) {
        *self.viewport_width.write().await = width;
    }
}

impl Drop for BoardSync {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// PUMP
// =============================================================================

async fn pump(
    user_id: Uuid,
    mut feed: broadcast::Receiver<Vec<NoteRecord>>,
    tx: watch::Sender<BoardSnapshot>,
    viewport_width: Arc<RwLock<f64>>,
) {
    loop {
        match feed.recv().await {
            Ok(records) => {
                let width = *viewport_width.read().await;
                let snapshot = materialize(&records, width);
                if tx.send(snapshot).is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(%user_id, skipped, "board sync fell behind the change feed; sync lost");
                break;
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!(%user_id, "change feed closed; sync lost");
                break;
            }
        }
    }
    // Dropping `tx` here is the loss signal for watchers.
}

// =============================================================================
// MATERIALIZE
// =============================================================================

/// Map raw records to canvas-ready notes. Records missing a coordinate are
/// auto-placed by their position in arrival order; stored positions pass
/// through untouched.
#[must_use]
pub fn materialize(records: &[NoteRecord], viewport_width: f64) -> BoardSnapshot {
    let notes = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let (x, y) = match (record.x, record.y) {
                (Some(x), Some(y)) => (x, y),
                _ => auto_place(index, viewport_width),
            };
            Note {
                id: record.id,
                text: record.text.clone(),
                color: record.color,
                x,
                y,
                created_at: record.created_at,
            }
        })
        .collect();
    BoardSnapshot { notes }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
