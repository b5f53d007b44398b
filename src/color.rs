//! Colour interpolation for display tiles.
//!
//! Colours are stored as linear floating-point channels in `[0.0, 1.0]`.
//! Both blend functions are total: any `t` (including NaN-free values far
//! outside `[0, 1]`) produces a valid colour, because every channel is
//! clamped after blending.
//!
//! ```text
//!   lerp3:  A ───────────── M ───────────── E
//!           t=0            t=0.5            t=1
//! ```

use serde::{Deserialize, Serialize};

/// RGB colour, each channel in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Build a colour from floating-point channels, clamping each to `[0, 1]`.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
        }
    }

    /// Build a colour from a `0xRRGGBB` literal.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    /// Quantise to 8-bit channels.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        (to_byte(self.r), to_byte(self.g), to_byte(self.b))
    }

    /// `#rrggbb` string for renderers that want CSS-style colours.
    pub fn to_hex_string(self) -> String {
        let (r, g, b) = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

// ── Palette ───────────────────────────────────────────────────

pub const GREEN: Rgb = Rgb::from_hex(0x00FF00);
pub const YELLOW: Rgb = Rgb::from_hex(0xFFFF00);
pub const RED: Rgb = Rgb::from_hex(0xFF0000);

/// Humidity gradient start (dry).
pub const LIGHT_BLUE: Rgb = Rgb::from_hex(0xE0F7FA);
/// Humidity gradient end (saturated).
pub const DARK_BLUE: Rgb = Rgb::from_hex(0x01579B);

// ── Interpolation ─────────────────────────────────────────────

/// Linear blend from `a` to `b`.  Channels are clamped, so `t` outside
/// `[0, 1]` extrapolates until it hits the channel limits.
pub fn lerp(a: Rgb, b: Rgb, t: f32) -> Rgb {
    Rgb::new(
        a.r + t * (b.r - a.r),
        a.g + t * (b.g - a.g),
        a.b + t * (b.b - a.b),
    )
}

/// Two-segment blend `a → mid` over `[0, 0.5)` and `mid → end` over `[0.5, 1]`.
pub fn lerp3(a: Rgb, mid: Rgb, end: Rgb, t: f32) -> Rgb {
    if t < 0.5 {
        lerp(a, mid, t * 2.0)
    } else {
        lerp(mid, end, (t - 0.5) * 2.0)
    }
}

fn clamp_channel(v: f32) -> f32 {
    // f32::clamp propagates NaN; map it to 0 so the result is always a colour.
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

fn to_byte(v: f32) -> u8 {
    (clamp_channel(v) * 255.0).round() as u8
}
