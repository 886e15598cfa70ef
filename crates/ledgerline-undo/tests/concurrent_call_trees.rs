#![forbid(unsafe_code)]

//! Recording context stays with its own call tree.

use std::sync::Arc;

use ledgerline_core::{Operation, Value};
use ledgerline_harness::{Fixture, MemoryStore, SequenceClock};
use ledgerline_undo::{Annotation, BroadcastAnnouncer, UndoKind, UndoManager, context};
use tokio::sync::oneshot;

fn write(row: &str) -> Operation {
    Operation::new("payees", row, "name", row)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn other_task_does_not_see_open_transaction() {
    let fx = Fixture::new();
    let (entered_tx, entered_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel::<()>();

    let recorder = {
        let fx = fx.clone();
        tokio::spawn(async move {
            fx.manager
                .run_transaction(Annotation::new("slow edit"), || async {
                    entered_tx.send(()).unwrap();
                    release_rx.await.unwrap();
                    fx.store.mutate(&fx.manager, vec![write("inside")])
                })
                .await
        })
    };

    entered_rx.await.unwrap();
    let outsider = {
        let fx = fx.clone();
        tokio::spawn(async move {
            assert!(!context::current().listening);
            fx.store.mutate(&fx.manager, vec![write("outside")])
        })
    };
    assert!(!outsider.await.unwrap());

    release_tx.send(()).unwrap();
    assert!(recorder.await.unwrap());

    fx.manager.with_log(|log| {
        let batches: Vec<_> = log.entries().iter().filter_map(|e| e.as_batch()).collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].operations()[0].row, "inside");
    });
}

#[tokio::test]
async fn interleaved_transactions_on_one_thread() {
    let fx = Fixture::new();
    let (a_tx, a_rx) = oneshot::channel::<()>();

    let first = fx.manager.run_tagged_transaction("first", None, || async {
        a_rx.await.unwrap();
        fx.store.mutate(&fx.manager, vec![write("a")]);
        context::current().tag
    });
    let second = async {
        let recorded = fx.store.mutate(&fx.manager, vec![write("b")]);
        a_tx.send(()).unwrap();
        recorded
    };

    let (tag, recorded) = tokio::join!(first, second);
    assert_eq!(tag, Some("first".into()));
    assert!(!recorded);
    assert_eq!(fx.store.get("payees", "b", "name"), Some(Value::from("b")));
}

#[tokio::test]
async fn spawned_work_records_when_bound() {
    let fx = Fixture::new();
    fx.manager
        .run_transaction(Annotation::new("background import"), || async {
            let fx = fx.clone();
            tokio::spawn(context::bind(async move {
                fx.store.mutate(&fx.manager, vec![write("imported")])
            }))
            .await
            .unwrap()
        })
        .await;

    assert!(fx.manager.can_undo());
    fx.manager.undo().await.unwrap();
    assert!(fx.store.is_tombstoned("payees", "imported"));
}

#[tokio::test]
async fn broadcast_listeners_receive_events() {
    let store = Arc::new(MemoryStore::new());
    let announcer = Arc::new(BroadcastAnnouncer::new(8));
    let mut events = announcer.subscribe();
    let manager = UndoManager::new(Arc::new(SequenceClock::new(0, 1)), store.clone())
        .with_announcer(announcer.clone());

    manager
        .run_transaction(Annotation::new("Rename"), || async {
            store.mutate(&manager, vec![write("p1")]);
        })
        .await;
    manager.undo().await.unwrap();
    manager.redo().await.unwrap();

    let undo = events.recv().await.unwrap();
    assert_eq!(undo.kind, UndoKind::Undo);
    assert!(undo.affects("payees"));
    assert_eq!(undo.meta.map(|m| m.description), Some("Rename".to_string()));

    let redo = events.recv().await.unwrap();
    assert_eq!(redo.kind, UndoKind::Redo);
    assert_eq!(redo.operations.len(), 2);
}
