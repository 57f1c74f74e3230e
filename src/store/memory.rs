//! In-memory note store.
//!
//! Implements the same contract as the Postgres store over a `RwLock`ed map,
//! including feed publishes on every successful mutation. Used by the service
//! tests and handy for running the server without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::note::{NoteDraft, NotePatch, NoteRecord, now_ms};
use crate::store::{ChangeFeed, CollectionSubscription, NoteStore, StoreError};

#[derive(Default)]
pub struct MemoryNoteStore {
    /// Per-owner collections. Vec order is arrival order.
    collections: RwLock<HashMap<Uuid, Vec<NoteRecord>>>,
    feed: ChangeFeed,
}

impl MemoryNoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn publish_collection(&self, owner_id: Uuid) {
        let records = {
            let collections = self.collections.read().await;
            collections.get(&owner_id).cloned().unwrap_or_default()
        };
        self.feed.publish(owner_id, records).await;
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn create(&self, owner_id: Uuid, draft: NoteDraft) -> Result<(), StoreError> {
        {
            let mut collections = self.collections.write().await;
            collections.entry(owner_id).or_default().push(NoteRecord {
                id: Uuid::new_v4(),
                text: draft.text,
                color: draft.color,
                x: draft.x,
                y: draft.y,
                created_at: now_ms(),
            });
        }
        self.publish_collection(owner_id).await;
        Ok(())
    }

    async fn merge_update(&self, owner_id: Uuid, note_id: Uuid, patch: NotePatch) -> Result<(), StoreError> {
        let changed = {
            let mut collections = self.collections.write().await;
            let note = collections
                .get_mut(&owner_id)
                .and_then(|notes| notes.iter_mut().find(|n| n.id == note_id));
            match note {
                Some(note) => {
                    if let Some(text) = patch.text {
                        note.text = text;
                    }
                    if let Some(color) = patch.color {
                        note.color = color;
                    }
                    if let Some(x) = patch.x {
                        note.x = Some(x);
                    }
                    if let Some(y) = patch.y {
                        note.y = Some(y);
                    }
                    true
                }
                // Unknown note id: silent no-op.
                None => false,
            }
        };

        if changed {
            self.publish_collection(owner_id).await;
        }
        Ok(())
    }

    async fn delete(&self, owner_id: Uuid, note_id: Uuid) -> Result<(), StoreError> {
        let removed = {
            let mut collections = self.collections.write().await;
            match collections.get_mut(&owner_id) {
                Some(notes) => {
                    let before = notes.len();
                    notes.retain(|n| n.id != note_id);
                    notes.len() != before
                }
                None => false,
            }
        };

        if removed {
            self.publish_collection(owner_id).await;
        }
        Ok(())
    }

    async fn subscribe(&self, owner_id: Uuid) -> Result<CollectionSubscription, StoreError> {
        let rx = self.feed.subscribe(owner_id).await;
        let initial = {
            let collections = self.collections.read().await;
            collections.get(&owner_id).cloned().unwrap_or_default()
        };
        Ok(CollectionSubscription { initial, rx })
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
