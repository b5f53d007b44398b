//! In-process remote store.
//!
//! Implements [`RemoteStore`] with a key → JSON map behind a mutex.  It
//! behaves like a realtime database listener: subscribing delivers the
//! current value straight away (`null` if the key is absent), and every
//! change at a key, local write or remote push, is fanned out to its
//! listeners.  Used by the host binary and by tests; delivery failures
//! can be injected per key and write failures store-wide.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};
use serde_json::Value;

use crate::app::ports::{RemoteStore, StoreError, StoreEvent, StoreListener, SubscriptionId};

type SharedListener = Arc<dyn Fn(StoreEvent) + Send + Sync + 'static>;

#[derive(Default)]
struct Inner {
    values: HashMap<String, Value>,
    listeners: Vec<(SubscriptionId, String, SharedListener)>,
    next_id: u64,
    writes: Vec<(String, Value)>,
    write_failure: Option<StoreError>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        info!("MemoryStore: simulation backend");
        Self::default()
    }

    /// Set a value as if another client wrote it, and notify listeners.
    pub fn push(&self, key: &str, value: Value) {
        self.lock().values.insert(key.to_owned(), value.clone());
        self.notify(key, &StoreEvent::Changed(value));
    }

    /// Deliver a failure to every listener on `key`.  Stored value is kept.
    pub fn fail(&self, key: &str, err: StoreError) {
        self.notify(key, &StoreEvent::Failed(err));
    }

    /// Make subsequent writes fail with `err` (`None` restores success).
    pub fn set_write_failure(&self, err: Option<StoreError>) {
        self.lock().write_failure = err;
    }

    /// Current value at `key`, if any.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().values.get(key).cloned()
    }

    /// Every successful write, oldest first.
    pub fn writes(&self) -> Vec<(String, Value)> {
        self.lock().writes.clone()
    }

    /// Number of live listeners on `key`.
    pub fn listener_count(&self, key: &str) -> usize {
        self.lock().listeners.iter().filter(|(_, k, _)| k == key).count()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Listeners never run under the lock; a poisoned map is still consistent.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Invoke listeners outside the lock so they may call back into the store.
    fn notify(&self, key: &str, event: &StoreEvent) {
        let targets: Vec<SharedListener> = self
            .lock()
            .listeners
            .iter()
            .filter(|(_, k, _)| k == key)
            .map(|(_, _, l)| Arc::clone(l))
            .collect();
        debug!("MemoryStore: {key} -> {} listener(s)", targets.len());
        for listener in targets {
            listener(event.clone());
        }
    }
}

impl RemoteStore for MemoryStore {
    fn subscribe(&self, key: &str, listener: StoreListener) -> Result<SubscriptionId, StoreError> {
        let listener: SharedListener = Arc::from(listener);
        let (id, current) = {
            let mut inner = self.lock();
            inner.next_id += 1;
            let id = SubscriptionId(inner.next_id);
            inner
                .listeners
                .push((id, key.to_owned(), Arc::clone(&listener)));
            (id, inner.values.get(key).cloned().unwrap_or(Value::Null))
        };
        listener(StoreEvent::Changed(current));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().listeners.retain(|(lid, _, _)| *lid != id);
    }

    fn write(&self, key: &str, value: Value) -> Result<(), StoreError> {
        {
            let mut inner = self.lock();
            if let Some(err) = inner.write_failure.clone() {
                return Err(err);
            }
            inner.values.insert(key.to_owned(), value.clone());
            inner.writes.push((key.to_owned(), value.clone()));
        }
        self.notify(key, &StoreEvent::Changed(value));
        Ok(())
    }
}
