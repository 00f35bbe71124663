//! Cross-thread update serialization.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Map};
use shelf_state::store::KeyedStore;

const THREADS: usize = 8;
const UPDATES_PER_THREAD: usize = 50;

fn make_store() -> Arc<KeyedStore> {
    let store = KeyedStore::new();
    let mut defaults = Map::new();
    for t in 0..THREADS {
        defaults.insert(format!("counter_{t}"), json!(0));
    }
    store.initialize(defaults).expect("initialize");
    Arc::new(store)
}

#[test]
fn concurrent_updates_never_overlap_their_fan_out() {
    let store = make_store();
    let in_flight = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicUsize::new(0));
    let notifications = Arc::new(AtomicUsize::new(0));

    {
        let in_flight = Arc::clone(&in_flight);
        let overlaps = Arc::clone(&overlaps);
        let notifications = Arc::clone(&notifications);
        store.subscribe(move |changes| {
            if in_flight.swap(true, Ordering::SeqCst) {
                overlaps.fetch_add(1, Ordering::SeqCst);
            }
            assert_eq!(changes.len(), 1, "each update changes exactly one key");
            notifications.fetch_add(1, Ordering::SeqCst);
            thread::yield_now();
            in_flight.store(false, Ordering::SeqCst);
            Ok(())
        });
    }

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 1..=UPDATES_PER_THREAD {
                    store.set(format!("counter_{t}"), json!(i)).expect("update");
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("thread panicked");
    }

    assert_eq!(overlaps.load(Ordering::SeqCst), 0, "fan-outs interleaved");
    assert_eq!(
        notifications.load(Ordering::SeqCst),
        THREADS * UPDATES_PER_THREAD
    );
    for t in 0..THREADS {
        assert_eq!(
            store.get(&format!("counter_{t}")).unwrap(),
            json!(UPDATES_PER_THREAD)
        );
    }
}

#[test]
fn update_from_another_thread_during_fan_out_waits_instead_of_failing() {
    let store = make_store();
    let worker: Arc<Mutex<Option<thread::JoinHandle<bool>>>> = Arc::new(Mutex::new(None));

    {
        let store_ref = Arc::clone(&store);
        let worker = Arc::clone(&worker);
        store.subscribe(move |changes| {
            if changes.contains("counter_0") {
                let store_ref = Arc::clone(&store_ref);
                // Blocks on the update lock until this fan-out returns.
                let handle = thread::spawn(move || store_ref.set("counter_1", json!(7)).is_ok());
                *worker.lock().unwrap() = Some(handle);
            }
            Ok(())
        });
    }

    store.set("counter_0", json!(1)).unwrap();

    let handle = worker.lock().unwrap().take().expect("worker spawned");
    assert!(handle.join().expect("worker panicked"), "worker update failed");
    assert_eq!(store.get("counter_1").unwrap(), json!(7));
}

#[test]
fn update_with_holds_off_other_writers_until_written() {
    let store = make_store();
    store
        .set("file_list", json!(["b", "a"]))
        .expect("seed file_list");
    let rival_done = Arc::new(AtomicBool::new(false));
    let rival_done_while_computing = Arc::new(AtomicBool::new(true));
    let rival: Arc<Mutex<Option<thread::JoinHandle<()>>>> = Arc::new(Mutex::new(None));

    store
        .update_with(|current| {
            let stale = current["file_list"].clone();

            // A fresh scan lands while the reorder is being computed.
            let store_ref = Arc::clone(&store);
            let done = Arc::clone(&rival_done);
            let handle = thread::spawn(move || {
                store_ref
                    .set("file_list", json!(["z", "y", "x"]))
                    .expect("rival update");
                done.store(true, Ordering::SeqCst);
            });
            *rival.lock().unwrap() = Some(handle);

            thread::sleep(Duration::from_millis(50));
            rival_done_while_computing.store(rival_done.load(Ordering::SeqCst), Ordering::SeqCst);

            let mut sorted: Vec<String> = serde_json::from_value(stale).expect("string list");
            sorted.sort();
            let mut patch = Map::new();
            patch.insert("file_list".to_string(), json!(sorted));
            Ok(patch)
        })
        .expect("update_with");

    let handle = rival.lock().unwrap().take().expect("rival spawned");
    handle.join().expect("rival panicked");

    assert!(
        !rival_done_while_computing.load(Ordering::SeqCst),
        "rival update landed between read and write"
    );
    // The rival ran after the reorder, so its list is the one that survives.
    assert_eq!(store.get("file_list").unwrap(), json!(["z", "y", "x"]));
}
