//! Scripted feed for the host simulation.
//!
//! A feed is JSON lines, one [`FeedStep`] per line; blank lines and lines
//! starting with `#` are skipped:
//!
//! ```text
//! {"op":"push","key":"sensor/temperature","value":25}
//! {"op":"fail","key":"sensor/humidity","reason":"disconnected"}
//! {"op":"toggle_light"}
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::app::commands::AppCommand;
use crate::app::ports::StoreError;

use super::memory_store::MemoryStore;

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FeedStep {
    /// Another client sets `key` to `value`.
    Push { key: String, value: Value },
    /// The store fails to deliver an update for `key`.
    Fail { key: String, reason: String },
    /// The user taps the light tile.
    ToggleLight,
    /// The user drives the light to an explicit state.
    SetLight { on: bool },
}

/// What a step asks of the caller once store-side effects are done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The store was updated; drain the engine queue.
    Delivered,
    /// Hand this intent to the engine.
    Command(AppCommand),
}

impl FeedStep {
    /// Apply store-side effects to `store`.
    pub fn run(&self, store: &MemoryStore) -> StepOutcome {
        match self {
            Self::Push { key, value } => {
                store.push(key, value.clone());
                StepOutcome::Delivered
            }
            Self::Fail { key, reason } => {
                store.fail(key, parse_reason(reason));
                StepOutcome::Delivered
            }
            Self::ToggleLight => StepOutcome::Command(AppCommand::ToggleLight),
            Self::SetLight { on } => StepOutcome::Command(AppCommand::SetLight(*on)),
        }
    }
}

/// Parse a whole feed.  Errors carry the 1-based line number.
pub fn parse_feed(text: &str) -> Result<Vec<FeedStep>, FeedError> {
    text.lines()
        .enumerate()
        .filter(|(_, l)| {
            let l = l.trim();
            !l.is_empty() && !l.starts_with('#')
        })
        .map(|(i, l)| {
            serde_json::from_str(l.trim()).map_err(|e| FeedError {
                line: i + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Built-in demo: a warm spell, a rain shower, a dropped connection and a
/// light toggle.
pub const DEMO_FEED: &str = r##"
# warm-up
{"op":"push","key":"sensor/temperature","value":25}
{"op":"push","key":"sensor/humidity","value":40}
{"op":"push","key":"sensor/temperature","value":32}
{"op":"push","key":"sensor/temperature","value":33.5}
{"op":"push","key":"sensor/temperature","value":28}
# shower
{"op":"push","key":"RainSensor/isRaining","value":true}
{"op":"push","key":"RainSensor/isRaining","value":true}
{"op":"push","key":"sensor/humidity","value":95}
{"op":"push","key":"RainSensor/isRaining","value":false}
# link drop
{"op":"fail","key":"sensor/humidity","reason":"disconnected"}
{"op":"push","key":"sensor/humidity","value":80}
# user
{"op":"toggle_light"}
{"op":"toggle_light"}
"##;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedError {
    pub line: usize,
    pub message: String,
}

impl core::fmt::Display for FeedError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "feed line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for FeedError {}

fn parse_reason(reason: &str) -> StoreError {
    match reason {
        "permission_denied" | "permission denied" => StoreError::PermissionDenied,
        "disconnected" => StoreError::Disconnected,
        "unavailable" => StoreError::Unavailable,
        other => StoreError::Other(other.to_owned()),
    }
}
