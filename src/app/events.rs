//! Outbound display state.
//!
//! The [`SyncEngine`](super::service::SyncEngine) publishes a
//! [`DisplaySnapshot`] through the [`Renderer`](super::ports::Renderer)
//! port after every change.  It is a detached copy; renderers cannot
//! mutate engine state through it.

use serde::Serialize;

use crate::color::Rgb;
use crate::reading::Sample;

/// Everything a renderer needs to paint the three tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    pub temperature_display: String,
    #[serde(serialize_with = "serialize_color")]
    pub temperature_color: Sample<Rgb>,
    pub humidity_display: String,
    #[serde(serialize_with = "serialize_color")]
    pub humidity_color: Sample<Rgb>,
    pub light_on: bool,
    /// The last light write-back could not be issued; cleared by the next
    /// authoritative light push.
    pub light_write_failed: bool,
}

/// Colours serialise as `"#rrggbb"`, or `null` when there is nothing to paint.
fn serialize_color<S: serde::Serializer>(color: &Sample<Rgb>, s: S) -> Result<S::Ok, S::Error> {
    match color.value() {
        Some(c) => s.serialize_str(&c.to_hex_string()),
        None => s.serialize_none(),
    }
}
