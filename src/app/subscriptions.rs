//! Subscription manager: one live store subscription per watched key.
//!
//! Store callbacks may run on any thread.  Each callback stamps its
//! delivery with the next sequence number for that key and enqueues the
//! resulting [`Reading`] on a bounded channel; the engine drains the
//! channel on its own thread, so all snapshot mutation is serialised.
//!
//! ```text
//! ┌──────────────┐  listener   ┌────────────┐  Reading  ┌────────────┐
//! │ RemoteStore  │────────────▶│ Sequencer  │──────────▶│ ReadingQ   │──▶ SyncEngine
//! │ (any thread) │             │ (per key)  │     │     │ (bounded)  │        ▲
//! └──────────────┘             └────────────┘     │     └────────────┘        │
//!                                                 └──full──▶ Overflow ────────┘
//!                                                           (1 per key)
//! ```
//!
//! When the channel is full the reading goes to a one-deep slot for its
//! quantity instead.  A newer reading replaces an older one in the slot,
//! so under a burst the intermediate values of a key coalesce but its
//! latest value is never lost.  The slots are drained after the channel.
//!
//! Delivery errors become `Error` readings; the subscription stays in
//! place and keeps receiving later updates.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use heapless::Vec;
use log::{debug, info, warn};

use crate::config::StoreKeys;
use crate::reading::{Quantity, Reading};

use super::ports::{RemoteStore, StoreError, StoreEvent, SubscriptionId};

/// Pending readings between store callbacks and the engine.
pub const READING_QUEUE_DEPTH: usize = 32;

/// Multi-producer queue of stamped readings.
pub type ReadingQueue = Channel<CriticalSectionRawMutex, Reading, READING_QUEUE_DEPTH>;

/// Per-key monotonic sequence counters.  Shared with store callbacks and
/// with the engine's optimistic writes so both draw from the same series.
#[derive(Debug, Default)]
pub struct Sequencer {
    counters: [AtomicU64; 4],
}

impl Sequencer {
    /// Next sequence for `quantity`; the first call returns 1.
    pub fn next(&self, quantity: Quantity) -> u64 {
        self.counters[quantity.index()].fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Latest-wins overflow, one slot per quantity.
pub struct Overflow {
    slots: [Mutex<CriticalSectionRawMutex, RefCell<Option<Reading>>>; 4],
}

impl Default for Overflow {
    fn default() -> Self {
        Self {
            slots: core::array::from_fn(|_| Mutex::new(RefCell::new(None))),
        }
    }
}

impl Overflow {
    /// Park `reading` unless the slot already holds a newer one.  Returns
    /// the reading it replaced, if any.
    pub fn offer(&self, reading: Reading) -> Option<Reading> {
        self.slots[reading.quantity.index()].lock(|cell| {
            let mut slot = cell.borrow_mut();
            let holds_newer = slot
                .as_ref()
                .is_some_and(|held| held.observed_at >= reading.observed_at);
            if holds_newer {
                Some(reading)
            } else {
                slot.replace(reading)
            }
        })
    }

    /// Take a parked reading, in quantity order.
    pub fn take(&self) -> Option<Reading> {
        self.slots
            .iter()
            .find_map(|m| m.lock(|cell| cell.borrow_mut().take()))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|m| m.lock(|cell| cell.borrow().is_none()))
    }
}

struct Watch {
    quantity: Quantity,
    id: SubscriptionId,
}

/// Owns the store subscriptions and the reading queue they feed.
pub struct SubscriptionManager {
    keys: StoreKeys,
    queue: Arc<ReadingQueue>,
    overflow: Arc<Overflow>,
    sequencer: Arc<Sequencer>,
    watches: Vec<Watch, 4>,
}

impl SubscriptionManager {
    pub fn new(keys: StoreKeys) -> Self {
        Self {
            keys,
            queue: Arc::new(Channel::new()),
            overflow: Arc::new(Overflow::default()),
            sequencer: Arc::new(Sequencer::default()),
            watches: Vec::new(),
        }
    }

    /// Subscribe every quantity.  Already-subscribed keys are left alone.
    pub fn subscribe_all(&mut self, store: &impl RemoteStore) -> Result<(), StoreError> {
        for quantity in Quantity::ALL {
            self.subscribe(quantity, store)?;
        }
        Ok(())
    }

    /// Subscribe one quantity.  Returns `false` if it was already
    /// subscribed (no second stream is opened).
    pub fn subscribe(
        &mut self,
        quantity: Quantity,
        store: &impl RemoteStore,
    ) -> Result<bool, StoreError> {
        if self.is_subscribed(quantity) {
            return Ok(false);
        }
        let key = self.keys.key(quantity);
        let queue = Arc::clone(&self.queue);
        let overflow = Arc::clone(&self.overflow);
        let sequencer = Arc::clone(&self.sequencer);
        let id = store.subscribe(
            key,
            Box::new(move |event: StoreEvent| {
                let seq = sequencer.next(quantity);
                let reading = match event {
                    StoreEvent::Changed(json) => Reading::from_json(quantity, &json, seq),
                    StoreEvent::Failed(err) => {
                        warn!("{quantity} delivery failed: {err}");
                        Reading::failed(quantity, err, seq)
                    }
                };
                if let Err(TrySendError::Full(reading)) = queue.try_send(reading) {
                    if let Some(old) = overflow.offer(reading) {
                        debug!("queue full; {quantity} #{} coalesced", old.observed_at);
                    }
                }
            }),
        )?;
        if self.watches.push(Watch { quantity, id }).is_err() {
            // One watch per quantity, so the table cannot overflow.
            store.unsubscribe(id);
            return Ok(false);
        }
        info!("subscribed {quantity} at '{key}'");
        Ok(true)
    }

    /// Drop the subscription for `quantity`.  Returns whether one existed.
    pub fn unsubscribe(&mut self, quantity: Quantity, store: &impl RemoteStore) -> bool {
        match self.watches.iter().position(|w| w.quantity == quantity) {
            Some(pos) => {
                let watch = self.watches.swap_remove(pos);
                store.unsubscribe(watch.id);
                info!("unsubscribed {quantity}");
                true
            }
            None => false,
        }
    }

    /// Drop every subscription.
    pub fn stop(&mut self, store: &impl RemoteStore) {
        while let Some(watch) = self.watches.pop() {
            store.unsubscribe(watch.id);
        }
        info!("all subscriptions stopped");
    }

    pub fn is_subscribed(&self, quantity: Quantity) -> bool {
        self.watches.iter().any(|w| w.quantity == quantity)
    }

    pub fn active_count(&self) -> usize {
        self.watches.len()
    }

    /// Store key watched for `quantity`.
    pub fn key(&self, quantity: Quantity) -> &str {
        self.keys.key(quantity)
    }

    /// Stamp a locally originated reading with the key's next sequence.
    pub fn next_sequence(&self, quantity: Quantity) -> u64 {
        self.sequencer.next(quantity)
    }

    /// Pop the oldest pending reading, if any.  Never blocks.  Overflow
    /// slots are only drained once the channel is empty.
    pub fn try_next(&self) -> Option<Reading> {
        self.queue
            .try_receive()
            .ok()
            .or_else(|| self.overflow.take())
    }

    /// Readings waiting in the channel or the overflow slots.
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty() || !self.overflow.is_empty()
    }

    /// Queue handle, for adapters that enqueue readings directly.
    pub fn queue(&self) -> Arc<ReadingQueue> {
        Arc::clone(&self.queue)
    }
}
