//! Note store — owner-scoped document persistence with live subscriptions.
//!
//! DESIGN
//! ======
//! The store is the only component that writes or reads durable state. Its
//! contract mirrors a document database with subscribe-on-collection
//! semantics: every successful mutation republishes the owner's FULL current
//! collection to that owner's change feed. Consumers rebuild from whole
//! pushes and never apply deltas, so a lost message costs freshness, not
//! correctness.
//!
//! Two implementations: `PgNoteStore` (sqlx/Postgres) for production and
//! `MemoryNoteStore` for tests and demos. Both fan out through the same
//! per-owner broadcast registry.

pub mod memory;
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use crate::note::{NoteDraft, NotePatch, NoteRecord};

pub use memory::MemoryNoteStore;
pub use postgres::PgNoteStore;

/// Buffered pushes per owner feed. A receiver that falls further behind than
/// this is lagged and must resubscribe.
const FEED_CAPACITY: usize = 64;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

/// A live subscription to one owner's note collection.
///
/// `initial` is the collection as of subscription time, delivered eagerly so
/// the first paint never waits for a mutation. Every subsequent change
/// arrives on `rx` as the full replacement set. Dropping the receiver
/// unsubscribes.
pub struct CollectionSubscription {
    pub initial: Vec<NoteRecord>,
    pub rx: broadcast::Receiver<Vec<NoteRecord>>,
}

// =============================================================================
// TRAIT
// =============================================================================

/// Document store contract, one note collection per owning user.
///
/// Mutations are last-write-wins; each targets a single note's path, so
/// writes to different notes never conflict. `merge_update` and `delete` on
/// an unknown note id are silent no-ops.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Persist a new note. The store assigns the id and `created_at`.
    async fn create(&self, owner_id: Uuid, draft: NoteDraft) -> Result<(), StoreError>;

    /// Partial update: only fields present in the patch are written.
    async fn merge_update(&self, owner_id: Uuid, note_id: Uuid, patch: NotePatch) -> Result<(), StoreError>;

    /// Permanently delete a note. No tombstone, no undo.
    async fn delete(&self, owner_id: Uuid, note_id: Uuid) -> Result<(), StoreError>;

    /// Open a live subscription to the owner's collection.
    async fn subscribe(&self, owner_id: Uuid) -> Result<CollectionSubscription, StoreError>;
}

// =============================================================================
// CHANGE FEED
// =============================================================================

/// Per-owner broadcast fan-out shared by every store implementation.
#[derive(Default)]
pub(crate) struct ChangeFeed {
    channels: RwLock<HashMap<Uuid, broadcast::Sender<Vec<NoteRecord>>>>,
}

impl ChangeFeed {
    pub(crate) async fn subscribe(&self, owner_id: Uuid) -> broadcast::Receiver<Vec<NoteRecord>> {
        let mut channels = self.channels.write().await;
        channels
            .entry(owner_id)
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0)
            .subscribe()
    }

    /// Publish the owner's full collection. A feed with no live receivers is
    /// not an error.
    pub(crate) async fn publish(&self, owner_id: Uuid, records: Vec<NoteRecord>) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(&owner_id) {
            let _ = tx.send(records);
        }
    }
}
