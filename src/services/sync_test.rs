#![allow(clippy::float_cmp)]

use super::*;
use crate::note::{NoteColor, NoteDraft};
use crate::store::MemoryNoteStore;
use tokio::time::{Duration, timeout};

fn draft(text: &str) -> NoteDraft {
    NoteDraft { text: text.into(), color: NoteColor::default(), x: None, y: None }
}

fn placed_draft(text: &str, x: f64, y: f64) -> NoteDraft {
    NoteDraft { text: text.into(), color: NoteColor::default(), x: Some(x), y: Some(y) }
}

async fn wait_changed(rx: &mut tokio::sync::watch::Receiver<crate::note::BoardSnapshot>) {
    timeout(Duration::from_millis(200), rx.changed())
        .await
        .expect("snapshot change timed out")
        .expect("snapshot stream closed");
}

// --- materialize ---

#[test]
fn materialize_auto_places_missing_coordinates() {
    let records = vec![
        NoteRecord { id: Uuid::new_v4(), text: "a".into(), color: NoteColor::Yellow, x: None, y: None, created_at: 1 },
        NoteRecord { id: Uuid::new_v4(), text: "b".into(), color: NoteColor::Blue, x: None, y: None, created_at: 2 },
    ];
    let snapshot = materialize(&records, 250.0);
    assert_eq!((snapshot.notes[0].x, snapshot.notes[0].y), (20.0, 20.0));
    assert_eq!((snapshot.notes[1].x, snapshot.notes[1].y), (120.0, 20.0));
}

#[test]
fn materialize_keeps_stored_coordinates() {
    let records = vec![NoteRecord {
        id: Uuid::new_v4(),
        text: "placed".into(),
        color: NoteColor::Green,
        x: Some(333.0),
        y: Some(44.0),
        created_at: 1,
    }];
    let snapshot = materialize(&records, 500.0);
    assert_eq!((snapshot.notes[0].x, snapshot.notes[0].y), (333.0, 44.0));
}

#[test]
fn materialize_half_placed_record_is_auto_placed() {
    let records = vec![NoteRecord {
        id: Uuid::new_v4(),
        text: "half".into(),
        color: NoteColor::Red,
        x: Some(333.0),
        y: None,
        created_at: 1,
    }];
    let snapshot = materialize(&records, 500.0);
    assert_eq!((snapshot.notes[0].x, snapshot.notes[0].y), (20.0, 20.0));
}

#[test]
fn materialize_index_counts_all_records_not_just_unplaced() {
    let records = vec![
        NoteRecord { id: Uuid::new_v4(), text: "a".into(), color: NoteColor::Yellow, x: Some(5.0), y: Some(5.0), created_at: 1 },
        NoteRecord { id: Uuid::new_v4(), text: "b".into(), color: NoteColor::Yellow, x: None, y: None, created_at: 2 },
    ];
    let snapshot = materialize(&records, 500.0);
    // second record sits at grid index 1, not 0
    assert_eq!((snapshot.notes[1].x, snapshot.notes[1].y), (120.0, 20.0));
}

// --- BoardSync ---

#[tokio::test]
async fn start_without_user_is_noop() {
    let store = Arc::new(MemoryNoteStore::new());
    let mut sync = BoardSync::new(store);

    sync.start(None).await.unwrap();

    assert!(sync.snapshot().is_empty());
    assert!(sync.subscribe().is_none());
    assert!(sync.user().is_none());
}

#[tokio::test]
async fn start_materializes_existing_collection() {
    let store = Arc::new(MemoryNoteStore::new());
    let user = Uuid::new_v4();
    store.create(user, draft("buy milk")).await.unwrap();

    let mut sync = BoardSync::new(Arc::clone(&store) as Arc<dyn NoteStore>);
    sync.start(Some(user)).await.unwrap();

    let snapshot = sync.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.notes[0].text, "buy milk");
    assert_eq!(snapshot.notes[0].color, NoteColor::Yellow);
    assert_eq!((snapshot.notes[0].x, snapshot.notes[0].y), (20.0, 20.0));
}

#[tokio::test]
async fn push_rebuilds_snapshot_wholesale() {
    let store = Arc::new(MemoryNoteStore::new());
    let user = Uuid::new_v4();
    let mut sync = BoardSync::new(Arc::clone(&store) as Arc<dyn NoteStore>);
    sync.start(Some(user)).await.unwrap();
    let mut rx = sync.subscribe().expect("sync should be live");

    store.create(user, draft("first")).await.unwrap();
    wait_changed(&mut rx).await;
    assert_eq!(sync.snapshot().len(), 1);

    store.create(user, draft("second")).await.unwrap();
    wait_changed(&mut rx).await;
    let snapshot = sync.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.notes[0].text, "first");
    assert_eq!(snapshot.notes[1].text, "second");
}

#[tokio::test]
async fn viewport_width_drives_auto_placement() {
    let store = Arc::new(MemoryNoteStore::new());
    let user = Uuid::new_v4();
    let mut sync = BoardSync::new(Arc::clone(&store) as Arc<dyn NoteStore>);
    sync.set_viewport_width(250.0).await;
    sync.start(Some(user)).await.unwrap();
    let mut rx = sync.subscribe().expect("sync should be live");

    store.create(user, draft("zero")).await.unwrap();
    wait_changed(&mut rx).await;
    store.create(user, draft("one")).await.unwrap();
    wait_changed(&mut rx).await;

    let snapshot = sync.snapshot();
    assert_eq!((snapshot.notes[0].x, snapshot.notes[0].y), (20.0, 20.0));
    assert_eq!((snapshot.notes[1].x, snapshot.notes[1].y), (120.0, 20.0));
}

#[tokio::test]
async fn restart_same_user_replaces_subscription() {
    let store = Arc::new(MemoryNoteStore::new());
    let user = Uuid::new_v4();
    let mut sync = BoardSync::new(Arc::clone(&store) as Arc<dyn NoteStore>);

    sync.start(Some(user)).await.unwrap();
    let first_rx = sync.subscribe().expect("first subscription");
    sync.start(Some(user)).await.unwrap();

    // the first pump was torn down; its watch channel is closed
    let mut first_rx = first_rx;
    assert!(timeout(Duration::from_millis(200), first_rx.changed()).await.expect("closed promptly").is_err());

    // and the replacement still tracks changes
    let mut rx = sync.subscribe().expect("replacement subscription");
    store.create(user, draft("after restart")).await.unwrap();
    wait_changed(&mut rx).await;
    assert_eq!(sync.snapshot().len(), 1);
}

#[tokio::test]
async fn user_switch_drops_old_collection() {
    let store = Arc::new(MemoryNoteStore::new());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    store.create(alice, draft("alice note")).await.unwrap();

    let mut sync = BoardSync::new(Arc::clone(&store) as Arc<dyn NoteStore>);
    sync.start(Some(alice)).await.unwrap();
    assert_eq!(sync.snapshot().len(), 1);

    sync.start(Some(bob)).await.unwrap();
    assert!(sync.snapshot().is_empty());
    assert_eq!(sync.user(), Some(bob));
}

#[tokio::test]
async fn stop_detaches_the_feed() {
    let store = Arc::new(MemoryNoteStore::new());
    let user = Uuid::new_v4();
    let mut sync = BoardSync::new(Arc::clone(&store) as Arc<dyn NoteStore>);
    sync.start(Some(user)).await.unwrap();
    let mut rx = sync.subscribe().expect("sync should be live");

    sync.stop();

    // watchers observe closure, and the sync reports empty state
    assert!(timeout(Duration::from_millis(200), rx.changed()).await.expect("closed promptly").is_err());
    assert!(sync.snapshot().is_empty());
    assert!(sync.user().is_none());

    // stopping again is harmless
    sync.stop();
}

#[tokio::test]
async fn drop_aborts_the_pump() {
    let store = Arc::new(MemoryNoteStore::new());
    let user = Uuid::new_v4();
    let mut sync = BoardSync::new(Arc::clone(&store) as Arc<dyn NoteStore>);
    sync.start(Some(user)).await.unwrap();
    let mut rx = sync.subscribe().expect("sync should be live");

    drop(sync);

    assert!(timeout(Duration::from_millis(200), rx.changed()).await.expect("closed promptly").is_err());
}
