//! Authoritative local view of every watched quantity.
//!
//! Each quantity keeps the latest applied reading and its sequence number.
//! A reading whose `observed_at` is not newer than the stored one is
//! rejected (out-of-order guard), so a late delivery can never roll the
//! view back.  Derived tiles are recomputed only when their quantity
//! changes.

use crate::app::events::DisplaySnapshot;
use crate::mapper::{self, Derived};
use crate::reading::{Quantity, RawValue, Reading, Sample};

/// Outcome of [`Snapshot::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// Older than (or equal to) what is already held; discarded.
    Stale,
}

/// Latest value for one quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub value: Sample<RawValue>,
    /// Sequence of the applied reading; 0 before the first one.
    pub observed_at: u64,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            value: Sample::Missing,
            observed_at: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    entries: [Entry; 4],
    temperature: Derived,
    humidity: Derived,
    temperature_scale_max: f64,
    light_write_failed: bool,
}

impl Snapshot {
    pub fn new(temperature_scale_max: f64) -> Self {
        Self {
            entries: Default::default(),
            temperature: Derived::default(),
            humidity: Derived::default(),
            temperature_scale_max,
            light_write_failed: false,
        }
    }

    /// Apply `reading` if it is newer than the held entry for its quantity.
    pub fn apply(&mut self, reading: &Reading) -> Applied {
        let entry = &mut self.entries[reading.quantity.index()];
        if reading.observed_at <= entry.observed_at {
            return Applied::Stale;
        }
        entry.value = reading.value.clone();
        entry.observed_at = reading.observed_at;

        match reading.quantity {
            Quantity::Temperature => {
                self.temperature = mapper::temperature(&reading.value, self.temperature_scale_max);
            }
            Quantity::Humidity => self.humidity = mapper::humidity(&reading.value),
            Quantity::Light => self.light_write_failed = false,
            Quantity::Rain => {}
        }
        Applied::Updated
    }

    pub fn entry(&self, quantity: Quantity) -> &Entry {
        &self.entries[quantity.index()]
    }

    /// Light state for display; anything but an explicit `true` is off.
    pub fn light_on(&self) -> bool {
        matches!(
            self.entry(Quantity::Light).value,
            Sample::Value(RawValue::Boolean(true))
        )
    }

    pub fn light_write_failed(&self) -> bool {
        self.light_write_failed
    }

    pub(crate) fn mark_light_write_failed(&mut self) {
        self.light_write_failed = true;
    }

    /// Detached copy for the renderer.
    pub fn display(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            temperature_display: self.temperature.text.clone(),
            temperature_color: self.temperature.color.clone(),
            humidity_display: self.humidity.text.clone(),
            humidity_color: self.humidity.color.clone(),
            light_on: self.light_on(),
            light_write_failed: self.light_write_failed,
        }
    }
}
