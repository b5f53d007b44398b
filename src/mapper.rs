//! Value mapper: raw samples to display text and tile colours.
//!
//! Pure functions with no memory of earlier values.  `Missing` renders as
//! `"--"` and `Error` as `"Error"`; neither is ever treated as zero.

use crate::color::{self, Rgb};
use crate::reading::{RawValue, Sample};

/// Placeholder text for a quantity with no value yet.
pub const MISSING_TEXT: &str = "--";
/// Text shown when the latest reading for a quantity failed.
pub const ERROR_TEXT: &str = "Error";

/// Text + colour for one display tile.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived {
    pub text: String,
    pub color: Sample<Rgb>,
}

impl Default for Derived {
    fn default() -> Self {
        Self {
            text: MISSING_TEXT.to_owned(),
            color: Sample::Missing,
        }
    }
}

/// Temperature tile.  Colour walks green → yellow → red over `[0, scale_max]`
/// and stays red above it.
pub fn temperature(sample: &Sample<RawValue>, scale_max: f64) -> Derived {
    derive(sample, "°C", |c| temperature_color(c, scale_max))
}

/// Humidity tile.  The text shows the raw value; the colour uses the value
/// clamped to `[0, 100]`.
pub fn humidity(sample: &Sample<RawValue>) -> Derived {
    derive(sample, "%", humidity_color)
}

pub fn temperature_color(celsius: f64, scale_max: f64) -> Rgb {
    if celsius > scale_max {
        return color::RED;
    }
    let t = celsius.clamp(0.0, scale_max) / scale_max;
    color::lerp3(color::GREEN, color::YELLOW, color::RED, t as f32)
}

pub fn humidity_color(percent: f64) -> Rgb {
    let t = percent.clamp(0.0, 100.0) / 100.0;
    color::lerp(color::LIGHT_BLUE, color::DARK_BLUE, t as f32)
}

/// Format a reading value: integral values drop the fractional part
/// (`25`), everything else uses the shortest round-trip form (`29.9`).
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

fn derive(sample: &Sample<RawValue>, unit: &str, shade: impl FnOnce(f64) -> Rgb) -> Derived {
    match sample {
        Sample::Missing => Derived::default(),
        Sample::Error(e) => Derived {
            text: ERROR_TEXT.to_owned(),
            color: Sample::Error(e.clone()),
        },
        Sample::Value(raw) => match raw.as_number() {
            Some(n) => Derived {
                text: format!("{}{unit}", format_number(n)),
                color: Sample::Value(shade(n)),
            },
            None => Derived {
                text: ERROR_TEXT.to_owned(),
                color: Sample::Error(crate::reading::ReadingError::TypeMismatch),
            },
        },
    }
}
