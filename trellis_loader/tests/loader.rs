// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scheduling contract tests: coalescing, priority order, failure fan-out,
//! and lapse-based cancellation.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use trellis_loader::{LoadCallback, LoadError, Loader};

const WAIT: Duration = Duration::from_secs(10);

/// Holds the single worker on a designated key until the test has finished
/// queueing, so dispatch order is deterministic.
struct Gate {
    released: Mutex<bool>,
    condvar: Condvar,
}

impl Gate {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            released: Mutex::new(false),
            condvar: Condvar::new(),
        })
    }

    fn wait(&self) {
        let mut released = self.released.lock().unwrap();
        while !*released {
            released = self.condvar.wait(released).unwrap();
        }
    }

    fn open(&self) {
        *self.released.lock().unwrap() = true;
        self.condvar.notify_all();
    }
}

/// A single-worker loader that records the order keys were loaded in and
/// blocks on the `"block"` key until the gate opens.
fn gated_loader(
    gate: &Arc<Gate>,
) -> (Loader<&'static str, usize>, Arc<Mutex<Vec<&'static str>>>) {
    let order = Arc::new(Mutex::new(Vec::new()));
    let loader = {
        let gate = Arc::clone(gate);
        let order = Arc::clone(&order);
        Loader::with_workers(NonZeroUsize::MIN, move |key: &&'static str| {
            if *key == "block" {
                gate.wait();
            }
            order.lock().unwrap().push(*key);
            if key.starts_with("bad") {
                return Err(LoadError::new("no such resource"));
            }
            Ok(key.len())
        })
    };
    (loader, order)
}

fn notify(done: &Sender<Result<usize, LoadError>>) -> impl FnOnce(Result<Arc<usize>, LoadError>) + use<> {
    let done = done.clone();
    move |result| {
        let _ = done.send(result.map(|value| *value));
    }
}

#[test]
fn concurrent_requests_coalesce_into_one_load() {
    let gate = Gate::new();
    let (loader, order) = gated_loader(&gate);
    let (tx, rx) = channel();

    loader.request("block", 9, notify(&tx));
    loader.request("mesh", 5, notify(&tx));
    loader.request("mesh", 3, notify(&tx));
    loader.request("mesh", 7, notify(&tx));
    gate.open();

    let mut results: Vec<_> = (0..4)
        .map(|_| rx.recv_timeout(WAIT).unwrap().unwrap())
        .collect();
    results.sort_unstable();
    assert_eq!(results, [4, 4, 4, 5]);
    // One load served all three "mesh" registrants.
    let order = order.lock().unwrap();
    assert_eq!(order.iter().filter(|&&key| key == "mesh").count(), 1);
}

#[test]
fn dispatch_is_by_priority_then_newest_first() {
    let gate = Gate::new();
    let (loader, order) = gated_loader(&gate);
    let (tx, rx) = channel();

    loader.request("block", 9, notify(&tx));
    loader.request("aa", 1, notify(&tx));
    loader.request("bb", 5, notify(&tx));
    loader.request("cc", 5, notify(&tx));
    loader.request("dd", 3, notify(&tx));
    gate.open();

    for _ in 0..5 {
        rx.recv_timeout(WAIT).unwrap().unwrap();
    }
    assert_eq!(*order.lock().unwrap(), ["block", "cc", "bb", "dd", "aa"]);
}

#[test]
fn a_second_request_raises_the_queued_priority() {
    let gate = Gate::new();
    let (loader, order) = gated_loader(&gate);
    let (tx, rx) = channel();

    loader.request("block", 9, notify(&tx));
    loader.request("xx", 1, notify(&tx));
    loader.request("yy", 5, notify(&tx));
    // Reschedules "xx" above "yy".
    loader.request("xx", 8, notify(&tx));
    gate.open();

    for _ in 0..4 {
        rx.recv_timeout(WAIT).unwrap().unwrap();
    }
    assert_eq!(*order.lock().unwrap(), ["block", "xx", "yy"]);
}

#[test]
fn failure_reaches_every_registrant() {
    let gate = Gate::new();
    let (loader, _order) = gated_loader(&gate);
    let (tx, rx) = channel();

    loader.request("block", 9, notify(&tx));
    loader.request("bad-texture", 5, notify(&tx));
    loader.request("bad-texture", 5, notify(&tx));
    gate.open();

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), Ok(5));
    for _ in 0..2 {
        assert_eq!(
            rx.recv_timeout(WAIT).unwrap(),
            Err(LoadError::new("no such resource"))
        );
    }
}

struct Lapsing {
    wanted: Arc<AtomicBool>,
    fired: Sender<()>,
}

impl LoadCallback<usize> for Lapsing {
    fn still_wanted(&self) -> bool {
        self.wanted.load(Ordering::SeqCst)
    }

    fn on_loaded(self: Box<Self>, _result: Result<Arc<usize>, LoadError>) {
        let _ = self.fired.send(());
    }
}

#[test]
fn lapsed_requests_are_never_loaded() {
    let gate = Gate::new();
    let (loader, order) = gated_loader(&gate);
    let (tx, rx) = channel();
    let (fired_tx, fired_rx) = channel();
    let wanted = Arc::new(AtomicBool::new(true));

    loader.request("block", 9, notify(&tx));
    loader.request(
        "stale",
        5,
        Lapsing {
            wanted: Arc::clone(&wanted),
            fired: fired_tx,
        },
    );
    // The requester loses interest before the worker gets there.
    wanted.store(false, Ordering::SeqCst);
    loader.request("tail", 1, notify(&tx));
    gate.open();

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), Ok(5));
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), Ok(4));
    assert!(fired_rx.try_recv().is_err());
    assert!(!order.lock().unwrap().contains(&"stale"));
    assert_eq!(loader.pending(), 0);
}
