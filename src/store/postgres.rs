//! Postgres-backed note store.
//!
//! DESIGN
//! ======
//! Notes live in one owner-scoped table; arrival order is the `seq`
//! bigserial, so auto-placement indices are stable across sessions. After
//! every successful mutation the owner's full collection is re-queried and
//! published to the change feed — the publish happens only once the write is
//! durable, which is what makes a failed drag "snap back" on the client.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::note::{NoteColor, NoteDraft, NotePatch, NoteRecord, now_ms};
use crate::store::{ChangeFeed, CollectionSubscription, NoteStore, StoreError};

pub struct PgNoteStore {
    pool: PgPool,
    feed: ChangeFeed,
}

impl PgNoteStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool, feed: ChangeFeed::default() }
    }

    /// Fetch the owner's full collection in arrival order.
    async fn fetch_collection(&self, owner_id: Uuid) -> Result<Vec<NoteRecord>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (Uuid, String, String, Option<f64>, Option<f64>, i64)>(
            "SELECT id, text, color, x, y, created_at
             FROM notes
             WHERE owner_id = $1
             ORDER BY seq ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, text, color, x, y, created_at)| NoteRecord {
                id,
                text,
                color: NoteColor::from_hex(&color).unwrap_or_default(),
                x,
                y,
                created_at,
            })
            .collect())
    }

    /// Re-query and publish the owner's collection after a durable write.
    async fn publish_collection(&self, owner_id: Uuid) -> Result<(), StoreError> {
        let records = self.fetch_collection(owner_id).await?;
        self.feed.publish(owner_id, records).await;
        Ok(())
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn create(&self, owner_id: Uuid, draft: NoteDraft) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO notes (id, owner_id, text, color, x, y, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&draft.text)
        .bind(draft.color.as_hex())
        .bind(draft.x)
        .bind(draft.y)
        .bind(now_ms())
        .execute(&self.pool)
        .await?;

        self.publish_collection(owner_id).await
    }

    async fn merge_update(&self, owner_id: Uuid, note_id: Uuid, patch: NotePatch) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Ok(());
        }

        // COALESCE keeps current values for absent patch fields.
        let result = sqlx::query(
            "UPDATE notes
             SET text  = COALESCE($3, text),
                 color = COALESCE($4, color),
                 x     = COALESCE($5, x),
                 y     = COALESCE($6, y)
             WHERE id = $1 AND owner_id = $2",
        )
        .bind(note_id)
        .bind(owner_id)
        .bind(patch.text.as_deref())
        .bind(patch.color.map(NoteColor::as_hex))
        .bind(patch.x)
        .bind(patch.y)
        .execute(&self.pool)
        .await?;

        // Unknown note id: silent no-op, nothing changed, nothing to publish.
        if result.rows_affected() == 0 {
            return Ok(());
        }

        self.publish_collection(owner_id).await
    }

    async fn delete(&self, owner_id: Uuid, note_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND owner_id = $2")
            .bind(note_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(());
        }

        self.publish_collection(owner_id).await
    }

    async fn subscribe(&self, owner_id: Uuid) -> Result<CollectionSubscription, StoreError> {
        // Register the receiver before reading so a concurrent write between
        // the read and the first recv is seen as a push, not lost.
        let rx = self.feed.subscribe(owner_id).await;
        let initial = self.fetch_collection(owner_id).await?;
        Ok(CollectionSubscription { initial, rx })
    }
}
