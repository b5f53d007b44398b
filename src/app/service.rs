//! Sync engine: the hexagonal core.
//!
//! [`SyncEngine`] owns the snapshot, the alert policy, and the
//! subscription manager.  Every snapshot mutation happens on the thread
//! that calls into the engine; store callbacks only enqueue readings.
//!
//! ```text
//!  RemoteStore ──▶ ┌────────────────────────────┐ ──▶ Renderer
//!                  │         SyncEngine          │
//!  RemoteStore ◀── │ Subs · Snapshot · Alerts    │ ──▶ AlertSink
//!                  └────────────────────────────┘
//! ```

use log::{debug, info, warn};
use serde_json::Value;

use crate::alert::{AlertPolicy, ArmState};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::reading::{Quantity, RawValue, Reading, Sample};
use crate::snapshot::{Applied, Snapshot};

use super::commands::AppCommand;
use super::events::DisplaySnapshot;
use super::ports::{AlertSink, RemoteStore, Renderer};
use super::subscriptions::SubscriptionManager;

// ───────────────────────────────────────────────────────────────
// SyncEngine
// ───────────────────────────────────────────────────────────────

pub struct SyncEngine {
    snapshot: Snapshot,
    alerts: AlertPolicy,
    subscriptions: SubscriptionManager,
    applied: u64,
    stale: u64,
}

impl SyncEngine {
    /// Build the engine from configuration.
    ///
    /// Does **not** touch the store; call [`start`](Self::start) next.
    pub fn new(config: SyncConfig) -> Self {
        Self {
            snapshot: Snapshot::new(config.temperature_scale_max_c),
            alerts: AlertPolicy::new(config.alert_title, config.temperature_alert_c),
            subscriptions: SubscriptionManager::new(config.keys),
            applied: 0,
            stale: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Subscribe every watched key.  Safe to call again; live
    /// subscriptions are not duplicated.
    pub fn start(&mut self, store: &impl RemoteStore) -> Result<()> {
        self.subscriptions.subscribe_all(store)?;
        info!(
            "SyncEngine started with {} subscriptions",
            self.subscriptions.active_count()
        );
        Ok(())
    }

    /// Drop every subscription.  Pending readings stay queued.
    pub fn stop(&mut self, store: &impl RemoteStore) {
        self.subscriptions.stop(store);
    }

    // ── Reading processing ────────────────────────────────────

    /// Drain all queued readings in arrival order.  Returns how many were
    /// applied (stale readings are not counted).
    pub fn process_pending(
        &mut self,
        alerts: &mut impl AlertSink,
        renderer: &mut impl Renderer,
    ) -> usize {
        let mut updated = 0;
        while let Some(reading) = self.subscriptions.try_next() {
            if self.apply(&reading, alerts, renderer) == Applied::Updated {
                updated += 1;
            }
        }
        updated
    }

    /// Apply one reading: guard → snapshot/derived → alerts → render.
    pub fn apply(
        &mut self,
        reading: &Reading,
        alerts: &mut impl AlertSink,
        renderer: &mut impl Renderer,
    ) -> Applied {
        if self.snapshot.apply(reading) == Applied::Stale {
            self.stale += 1;
            warn!(
                "out-of-order {} #{} discarded (holding #{})",
                reading.quantity,
                reading.observed_at,
                self.snapshot.entry(reading.quantity).observed_at
            );
            return Applied::Stale;
        }
        self.applied += 1;
        debug!("{} #{} = {:?}", reading.quantity, reading.observed_at, reading.value);

        self.alerts.evaluate(reading, alerts);
        renderer.render(&self.snapshot.display());
        Applied::Updated
    }

    // ── Write-back ────────────────────────────────────────────

    /// Drive the light: update the local view first, then write to the
    /// store.  A failed write is flagged on the snapshot and returned, but
    /// the optimistic value stays until the store pushes the truth.
    pub fn set_light(
        &mut self,
        on: bool,
        store: &impl RemoteStore,
        renderer: &mut impl Renderer,
    ) -> Result<()> {
        let seq = self.subscriptions.next_sequence(Quantity::Light);
        let intent = Reading::new(Quantity::Light, Sample::Value(RawValue::Boolean(on)), seq);
        self.snapshot.apply(&intent);

        let result = store.write(self.subscriptions.key(Quantity::Light), Value::Bool(on));
        if let Err(e) = &result {
            warn!("light write-back failed: {e}");
            self.snapshot.mark_light_write_failed();
        }
        renderer.render(&self.snapshot.display());
        result.map_err(Into::into)
    }

    /// Process an intent from the renderer.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        store: &impl RemoteStore,
        renderer: &mut impl Renderer,
    ) -> Result<()> {
        match cmd {
            AppCommand::SetLight(on) => self.set_light(on, store, renderer),
            AppCommand::ToggleLight => {
                let on = !self.snapshot.light_on();
                self.set_light(on, store, renderer)
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn display(&self) -> DisplaySnapshot {
        self.snapshot.display()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Edge-detector state of the alert watching `quantity`.
    pub fn alert_state(&self, quantity: Quantity) -> Option<ArmState> {
        self.alerts.state_for(quantity)
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    /// Readings applied since construction.
    pub fn applied_count(&self) -> u64 {
        self.applied
    }

    /// Readings discarded by the out-of-order guard.
    pub fn stale_count(&self) -> u64 {
        self.stale
    }
}
