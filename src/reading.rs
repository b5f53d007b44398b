//! Readings: one observation of a watched remote quantity.
//!
//! A [`Reading`] is produced by the subscription manager for every push
//! from the remote store.  Its `observed_at` is a per-key sequence number
//! assigned locally, never taken from the store, so the engine can reject
//! pushes that arrive after a newer one was already applied.

use core::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::app::ports::StoreError;

/// The four quantities mirrored from the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Quantity {
    Temperature,
    Humidity,
    Light,
    Rain,
}

impl Quantity {
    pub const ALL: [Quantity; 4] = [
        Quantity::Temperature,
        Quantity::Humidity,
        Quantity::Light,
        Quantity::Rain,
    ];

    /// Dense index for per-quantity tables.
    pub const fn index(self) -> usize {
        match self {
            Self::Temperature => 0,
            Self::Humidity => 1,
            Self::Light => 2,
            Self::Rain => 3,
        }
    }

    /// The JSON shape the store is expected to hold for this quantity.
    pub const fn expected(self) -> ValueKind {
        match self {
            Self::Temperature => ValueKind::Number,
            Self::Humidity => ValueKind::Integer,
            Self::Light | Self::Rain => ValueKind::Boolean,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature"),
            Self::Humidity => write!(f, "humidity"),
            Self::Light => write!(f, "light"),
            Self::Rain => write!(f, "rain"),
        }
    }
}

/// Accepted value shapes at the store boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Integer,
    Boolean,
}

/// A validated scalar from the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RawValue {
    Number(f64),
    Boolean(bool),
}

impl RawValue {
    pub fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            Self::Boolean(_) => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(b),
            Self::Number(_) => None,
        }
    }
}

/// Why a reading carries no usable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadingError {
    /// The store reported a delivery failure for this key.
    Remote(StoreError),
    /// The store held a value of the wrong JSON type.
    TypeMismatch,
}

impl fmt::Display for ReadingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(e) => write!(f, "remote: {e}"),
            Self::TypeMismatch => write!(f, "unexpected value type"),
        }
    }
}

/// Tagged value carried through the pipeline.  Only the renderer boundary
/// turns `Missing` and `Error` into placeholder strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample<T> {
    /// Nothing received yet (or the store holds `null`).
    Missing,
    Error(ReadingError),
    Value(T),
}

impl<T> Sample<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Missing | Self::Error(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// One observation of `quantity`, stamped with a local sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub quantity: Quantity,
    pub value: Sample<RawValue>,
    pub observed_at: u64,
}

impl Reading {
    pub fn new(quantity: Quantity, value: Sample<RawValue>, observed_at: u64) -> Self {
        Self {
            quantity,
            value,
            observed_at,
        }
    }

    /// Validate a pushed JSON value against the quantity's expected shape.
    pub fn from_json(quantity: Quantity, json: &Value, observed_at: u64) -> Self {
        Self::new(quantity, parse_value(quantity.expected(), json), observed_at)
    }

    /// An error reading for a failed delivery.
    pub fn failed(quantity: Quantity, err: StoreError, observed_at: u64) -> Self {
        Self::new(quantity, Sample::Error(ReadingError::Remote(err)), observed_at)
    }

    pub fn number(&self) -> Option<f64> {
        self.value.value().and_then(|v| v.as_number())
    }

    pub fn boolean(&self) -> Option<bool> {
        self.value.value().and_then(|v| v.as_bool())
    }
}

fn parse_value(kind: ValueKind, json: &Value) -> Sample<RawValue> {
    if json.is_null() {
        return Sample::Missing;
    }
    let parsed = match kind {
        ValueKind::Number => json.as_f64().filter(|n| n.is_finite()).map(RawValue::Number),
        ValueKind::Integer => json
            .as_i64()
            .map(|n| RawValue::Number(n as f64))
            .or_else(|| {
                json.as_f64()
                    .filter(|n| n.is_finite() && n.fract() == 0.0)
                    .map(RawValue::Number)
            }),
        ValueKind::Boolean => json.as_bool().map(RawValue::Boolean),
    };
    match parsed {
        Some(v) => Sample::Value(v),
        None => Sample::Error(ReadingError::TypeMismatch),
    }
}
