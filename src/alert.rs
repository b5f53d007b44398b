//! Alert policy: edge-triggered, one alert per condition onset.
//!
//! ## Condition lifecycle
//!
//! 1. Every condition starts `Armed`.
//! 2. A reading for the condition's quantity that satisfies the predicate
//!    while `Armed` emits exactly one alert and moves it to `Fired`.
//! 3. Further satisfying readings while `Fired` are swallowed.
//! 4. A reading that does not satisfy the predicate re-arms silently.
//!    `Missing` and `Error` readings never satisfy a predicate, so a gap
//!    in the signal re-arms too.
//!
//! Conditions are independent: each one only looks at readings for its
//! own quantity.

use log::{debug, info};

use crate::app::ports::AlertSink;
use crate::mapper::format_number;
use crate::reading::{Quantity, RawValue, Reading, Sample};

/// A user-facing alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

/// Which predicate a condition evaluates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConditionKind {
    /// Temperature strictly above `threshold_c`.
    TemperatureHigh { threshold_c: f64 },
    /// Rain flag is `true`.
    RainDetected,
}

impl ConditionKind {
    pub fn quantity(self) -> Quantity {
        match self {
            Self::TemperatureHigh { .. } => Quantity::Temperature,
            Self::RainDetected => Quantity::Rain,
        }
    }

    fn holds(self, reading: &Reading) -> bool {
        match self {
            Self::TemperatureHigh { threshold_c } => {
                reading.number().is_some_and(|c| c > threshold_c)
            }
            Self::RainDetected => reading.boolean() == Some(true),
        }
    }

    fn message(self, reading: &Reading) -> String {
        match self {
            Self::TemperatureHigh { threshold_c } => format!(
                "Temperatures exceed {}°C, currently {}°C!",
                format_number(threshold_c),
                reading.number().map_or_else(|| "--".to_owned(), format_number),
            ),
            Self::RainDetected => "It's raining, check now!".to_owned(),
        }
    }
}

/// Edge-detector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmState {
    /// No alert sent for the current occurrence.
    Armed,
    /// Alert sent; condition still holding.
    Fired,
}

#[derive(Debug, Clone)]
pub struct AlertCondition {
    pub kind: ConditionKind,
    pub state: ArmState,
    pub last_value: Sample<RawValue>,
}

impl AlertCondition {
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            state: ArmState::Armed,
            last_value: Sample::Missing,
        }
    }

    /// Advance the state machine.  Returns the alert to emit, if any.
    fn observe(&mut self, reading: &Reading, title: &str) -> Option<Alert> {
        self.last_value = reading.value.clone();
        let holds = self.kind.holds(reading);
        match (self.state, holds) {
            (ArmState::Armed, true) => {
                self.state = ArmState::Fired;
                Some(Alert {
                    title: title.to_owned(),
                    message: self.kind.message(reading),
                })
            }
            (ArmState::Fired, false) => {
                debug!("alert re-armed: {:?} on {:?}", self.kind, self.last_value);
                self.state = ArmState::Armed;
                None
            }
            (ArmState::Fired, true) | (ArmState::Armed, false) => None,
        }
    }
}

/// Owns every alert condition for the lifetime of the engine.
pub struct AlertPolicy {
    title: String,
    conditions: [AlertCondition; 2],
}

impl AlertPolicy {
    /// Temperature-high and rain-detected, both armed.
    pub fn new(title: impl Into<String>, temperature_threshold_c: f64) -> Self {
        Self {
            title: title.into(),
            conditions: [
                AlertCondition::new(ConditionKind::TemperatureHigh {
                    threshold_c: temperature_threshold_c,
                }),
                AlertCondition::new(ConditionKind::RainDetected),
            ],
        }
    }

    /// Feed a reading to every condition keyed to its quantity and deliver
    /// resulting alerts.  Returns the number of alerts emitted.
    pub fn evaluate(&mut self, reading: &Reading, sink: &mut impl AlertSink) -> usize {
        let mut emitted = 0;
        for cond in self
            .conditions
            .iter_mut()
            .filter(|c| c.kind.quantity() == reading.quantity)
        {
            if let Some(alert) = cond.observe(reading, &self.title) {
                info!("ALERT | {} | {}", alert.title, alert.message);
                sink.notify(&alert);
                emitted += 1;
            }
        }
        emitted
    }

    /// State of the first condition on `quantity`, if one is monitored.
    pub fn state_for(&self, quantity: Quantity) -> Option<ArmState> {
        self.conditions
            .iter()
            .find(|c| c.kind.quantity() == quantity)
            .map(|c| c.state)
    }
}
