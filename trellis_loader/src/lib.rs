// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Loader: a priority-based, coalescing background loader.
//!
//! Widget hosts request resources (textures, meshes) by key. The loader
//! guarantees at most one queued or in-flight load per key: concurrent
//! requests for the same key register additional callbacks on the existing
//! entry and raise its priority to the maximum of all registrants. Completion
//! or failure invokes every registered callback exactly once, sharing the
//! loaded resource behind an [`Arc`].
//!
//! Dispatch order is highest priority first; within one priority the most
//! recently requested key goes first, since the newest request is the one the
//! user is most likely looking at. Callbacks can lapse: before a key is
//! dispatched, callbacks reporting [`LoadCallback::still_wanted`] `false` are
//! dropped, and a key whose callbacks have all lapsed is never loaded.
//!
//! Work runs on a small worker pool, by default one thread fewer than the
//! machine's parallelism so the render loop keeps a core. Dropping the
//! [`Loader`] abandons queued entries and joins the workers.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use hashbrown::HashMap;
use tracing::{debug, trace, warn};

/// Why a resource could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("resource load failed: {reason}")]
pub struct LoadError {
    reason: String,
}

impl LoadError {
    /// A load failure with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// One requester's interest in a loading resource.
///
/// Plain `FnOnce(Result<Arc<R>, LoadError>)` closures implement this with a
/// `still_wanted` that never lapses.
pub trait LoadCallback<R>: Send {
    /// Whether the requester still wants the resource.
    ///
    /// Checked when the key reaches the front of the queue; lapsed callbacks
    /// are dropped without being invoked, and a key with no live callbacks
    /// left is skipped entirely.
    fn still_wanted(&self) -> bool {
        true
    }

    /// Invoked exactly once with the shared resource or the error.
    fn on_loaded(self: Box<Self>, result: Result<Arc<R>, LoadError>);
}

impl<R, F> LoadCallback<R> for F
where
    F: FnOnce(Result<Arc<R>, LoadError>) + Send,
{
    fn on_loaded(self: Box<Self>, result: Result<Arc<R>, LoadError>) {
        (*self)(result);
    }
}

type LoadFn<K, R> = dyn Fn(&K) -> Result<R, LoadError> + Send + Sync;

struct Entry<R> {
    priority: u32,
    in_flight: bool,
    callbacks: Vec<Box<dyn LoadCallback<R>>>,
}

struct State<K, R> {
    /// One entry per queued or in-flight key.
    entries: HashMap<K, Entry<R>>,
    /// Queued keys grouped by priority; within a group the last pushed
    /// dispatches first.
    queue: BTreeMap<u32, Vec<K>>,
    shutdown: bool,
}

struct Shared<K, R> {
    state: Mutex<State<K, R>>,
    available: Condvar,
    load: Box<LoadFn<K, R>>,
}

/// The background loader. See the crate docs for the scheduling contract.
pub struct Loader<K, R> {
    shared: Arc<Shared<K, R>>,
    workers: Vec<JoinHandle<()>>,
}

impl<K, R> fmt::Debug for Loader<K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("workers", &self.workers.len())
            .finish_non_exhaustive()
    }
}

/// A worker panic poisons the state mutex; the bookkeeping itself is still
/// consistent (every transition happens under the lock), so recover.
fn lock<K, R>(mutex: &Mutex<State<K, R>>) -> MutexGuard<'_, State<K, R>> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn pop_next<K, R>(state: &mut State<K, R>) -> Option<K> {
    let (&priority, group) = state.queue.iter_mut().next_back()?;
    let key = group.pop();
    if group.is_empty() {
        state.queue.remove(&priority);
    }
    key
}

impl<K, R> Loader<K, R>
where
    K: Clone + Eq + Hash + fmt::Debug + Send + 'static,
    R: Send + Sync + 'static,
{
    /// A loader with the default pool size: the machine's parallelism less
    /// one, at least one.
    pub fn new(load: impl Fn(&K) -> Result<R, LoadError> + Send + Sync + 'static) -> Self {
        let workers = thread::available_parallelism()
            .map_or(1, |cores| cores.get().saturating_sub(1).max(1));
        Self::with_workers(
            NonZeroUsize::new(workers).unwrap_or(NonZeroUsize::MIN),
            load,
        )
    }

    /// A loader with an explicit pool size.
    pub fn with_workers(
        workers: NonZeroUsize,
        load: impl Fn(&K) -> Result<R, LoadError> + Send + Sync + 'static,
    ) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                entries: HashMap::new(),
                queue: BTreeMap::new(),
                shutdown: false,
            }),
            available: Condvar::new(),
            load: Box::new(load),
        });
        let workers = (0..workers.get())
            .map(|index| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("trellis-loader-{index}"))
                    .spawn(move || worker(&shared))
                    .expect("failed to spawn loader worker")
            })
            .collect();
        Self { shared, workers }
    }

    /// Requests the resource for `key`, registering `callback` for its
    /// completion.
    ///
    /// If `key` is already queued or in flight, the callback joins the
    /// existing entry; a queued entry is rescheduled when `priority` exceeds
    /// the priority it was queued at.
    pub fn request(&self, key: K, priority: u32, callback: impl LoadCallback<R> + 'static) {
        let mut guard = lock(&self.shared.state);
        if guard.shutdown {
            warn!(?key, "request after shutdown, dropping");
            return;
        }
        let state = &mut *guard;
        if let Some(entry) = state.entries.get_mut(&key) {
            trace!(?key, priority, "coalescing with pending load");
            entry.callbacks.push(Box::new(callback));
            if !entry.in_flight && priority > entry.priority {
                if let Some(group) = state.queue.get_mut(&entry.priority) {
                    group.retain(|queued| queued != &key);
                    if group.is_empty() {
                        let stale = entry.priority;
                        state.queue.remove(&stale);
                    }
                }
                entry.priority = priority;
                state.queue.entry(priority).or_default().push(key);
            }
            return;
        }
        debug!(?key, priority, "queueing load");
        state.entries.insert(
            key.clone(),
            Entry {
                priority,
                in_flight: false,
                callbacks: vec![Box::new(callback)],
            },
        );
        state.queue.entry(priority).or_default().push(key);
        drop(guard);
        self.shared.available.notify_one();
    }

    /// Number of keys queued or in flight.
    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.shared.state).entries.len()
    }
}

fn worker<K, R>(shared: &Shared<K, R>)
where
    K: Clone + Eq + Hash + fmt::Debug + Send + 'static,
    R: Send + Sync + 'static,
{
    let mut state = lock(&shared.state);
    loop {
        if state.shutdown {
            return;
        }
        let Some(key) = pop_next(&mut state) else {
            state = shared
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
            continue;
        };

        let Some(entry) = state.entries.get_mut(&key) else {
            continue;
        };
        entry.callbacks.retain(|callback| callback.still_wanted());
        if entry.callbacks.is_empty() {
            trace!(?key, "all requesters lapsed, skipping load");
            state.entries.remove(&key);
            continue;
        }
        entry.in_flight = true;

        drop(state);
        trace!(?key, "loading");
        let result = (shared.load)(&key);
        state = lock(&shared.state);
        let Some(entry) = state.entries.remove(&key) else {
            continue;
        };
        drop(state);

        // Fan out without the lock held; callbacks may re-enter `request`.
        match result {
            Ok(resource) => {
                let resource = Arc::new(resource);
                for callback in entry.callbacks {
                    callback.on_loaded(Ok(Arc::clone(&resource)));
                }
            }
            Err(error) => {
                debug!(?key, %error, "load failed");
                for callback in entry.callbacks {
                    callback.on_loaded(Err(error.clone()));
                }
            }
        }
        state = lock(&shared.state);
    }
}

impl<K, R> Drop for Loader<K, R> {
    fn drop(&mut self) {
        {
            let mut state = lock(&self.shared.state);
            state.shutdown = true;
            let abandoned = state.entries.len();
            if abandoned > 0 {
                debug!(abandoned, "shutting down with queued loads");
            }
        }
        self.shared.available.notify_all();
        for worker in self.workers.drain(..) {
            drop(worker.join());
        }
    }
}
