#![allow(clippy::float_cmp)]

use super::*;
use crate::note::{Note, NoteColor, NoteDraft};
use crate::store::MemoryNoteStore;
use uuid::Uuid;

fn snapshot_with(note: Note) -> BoardSnapshot {
    BoardSnapshot { notes: vec![note] }
}

fn note_at(id: Uuid, x: f64, y: f64) -> Note {
    Note { id, text: "n".into(), color: NoteColor::Yellow, x, y, created_at: 0 }
}

async fn seeded_store(owner: Uuid, x: f64, y: f64) -> (MemoryNoteStore, Uuid) {
    let store = MemoryNoteStore::new();
    store
        .create(owner, NoteDraft { text: "n".into(), color: NoteColor::Yellow, x: Some(x), y: Some(y) })
        .await
        .unwrap();
    let id = store.subscribe(owner).await.unwrap().initial[0].id;
    (store, id)
}

#[tokio::test]
async fn drag_persists_clamped_position() {
    let owner = Uuid::new_v4();
    let (store, id) = seeded_store(owner, 100.0, 100.0).await;
    let snapshot = snapshot_with(note_at(id, 100.0, 100.0));
    let bounds = ContainerBounds::new(600.0, 400.0);

    let persisted = on_drag_end(&store, owner, id, (-200.0, -200.0), &snapshot, bounds)
        .await
        .unwrap();

    assert_eq!(persisted, Some((0.0, 0.0)));
    let record = store.subscribe(owner).await.unwrap().initial[0].clone();
    assert_eq!(record.x, Some(0.0));
    assert_eq!(record.y, Some(0.0));
}

#[tokio::test]
async fn drag_within_bounds_moves_by_delta() {
    let owner = Uuid::new_v4();
    let (store, id) = seeded_store(owner, 50.0, 60.0).await;
    let snapshot = snapshot_with(note_at(id, 50.0, 60.0));
    let bounds = ContainerBounds::new(600.0, 400.0);

    let persisted = on_drag_end(&store, owner, id, (30.0, 40.0), &snapshot, bounds)
        .await
        .unwrap();

    assert_eq!(persisted, Some((80.0, 100.0)));
}

#[tokio::test]
async fn drag_past_far_edge_pins_to_edge() {
    let owner = Uuid::new_v4();
    let (store, id) = seeded_store(owner, 300.0, 150.0).await;
    let snapshot = snapshot_with(note_at(id, 300.0, 150.0));
    let bounds = ContainerBounds::new(600.0, 400.0);

    let persisted = on_drag_end(&store, owner, id, (5000.0, 5000.0), &snapshot, bounds)
        .await
        .unwrap();

    assert_eq!(persisted, Some((400.0, 200.0)));
}

#[tokio::test]
async fn drag_unknown_note_is_silent_noop() {
    let owner = Uuid::new_v4();
    let store = MemoryNoteStore::new();
    let snapshot = BoardSnapshot::default();
    let bounds = ContainerBounds::new(600.0, 400.0);

    // note deleted mid-drag: id is not in the snapshot
    let persisted = on_drag_end(&store, owner, Uuid::new_v4(), (10.0, 10.0), &snapshot, bounds)
        .await
        .unwrap();

    assert_eq!(persisted, None);
}

#[tokio::test]
async fn drag_result_is_always_in_bounds() {
    let owner = Uuid::new_v4();
    let bounds = ContainerBounds::new(600.0, 400.0);

    for &(start, delta) in &[
        ((0.0, 0.0), (-1000.0, -1000.0)),
        ((400.0, 200.0), (1000.0, 1000.0)),
        ((100.0, 100.0), (250.0, 50.0)),
    ] {
        let (store, id) = seeded_store(owner, start.0, start.1).await;
        let snapshot = snapshot_with(note_at(id, start.0, start.1));
        let (x, y) = on_drag_end(&store, owner, id, delta, &snapshot, bounds)
            .await
            .unwrap()
            .expect("note exists");
        assert!((0.0..=400.0).contains(&x), "x out of bounds: {x}");
        assert!((0.0..=200.0).contains(&y), "y out of bounds: {y}");
    }
}
