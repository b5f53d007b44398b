//! Port traits: the hexagonal boundary between the sync engine and the
//! outside world.
//!
//! ```text
//!   RemoteStore ──push──▶ SubscriptionManager ──▶ SyncEngine ──▶ Renderer
//!        ▲                                            │
//!        └────────────── write-back ◀─────────────────┴──▶ AlertSink
//! ```
//!
//! The engine consumes these via generics, so the core never touches the
//! network, the notification system, or a UI toolkit directly.

use core::fmt;

use serde_json::Value;

use crate::alert::Alert;
use crate::app::events::DisplaySnapshot;

// ───────────────────────────────────────────────────────────────
// Remote store port (driven adapter: network ↔ domain)
// ───────────────────────────────────────────────────────────────

/// One delivery from a store subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Current value at the key.  `Value::Null` means the key is absent.
    Changed(Value),
    /// The store could not deliver an update for the key.
    Failed(StoreError),
}

/// Callback invoked by the store on every delivery for a key.  May be
/// called from any thread.
pub type StoreListener = Box<dyn Fn(StoreEvent) + Send + Sync + 'static>;

/// Opaque handle returned by [`RemoteStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Key-addressed remote value store with push-on-change.
///
/// Implementations are shared between the engine and their own delivery
/// threads, so every method takes `&self`.
pub trait RemoteStore {
    /// Start pushing changes at `key` to `listener`.  Delivery is
    /// asynchronous; this never blocks waiting for a value.
    fn subscribe(&self, key: &str, listener: StoreListener) -> Result<SubscriptionId, StoreError>;

    /// Stop a subscription.  Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);

    /// Fire-and-forget write.  An `Err` means the write could not be issued.
    fn write(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Alert sink port (driven adapter: domain → platform notifications)
// ───────────────────────────────────────────────────────────────

/// Delivers user-facing alerts (push notification, toast, log line...).
pub trait AlertSink {
    fn notify(&mut self, alert: &Alert);
}

// ───────────────────────────────────────────────────────────────
// Renderer port (driven adapter: domain → UI)
// ───────────────────────────────────────────────────────────────

/// Paints the derived display state.  Receives a fresh copy on every change.
pub trait Renderer {
    fn render(&mut self, snapshot: &DisplaySnapshot);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors reported by [`RemoteStore`] implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store refused access to the key.
    PermissionDenied,
    /// The connection to the store dropped.
    Disconnected,
    /// The store is temporarily unable to serve the request.
    Unavailable,
    /// Anything else, with the backend's description.
    Other(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for StoreError {}
