//! Inbound intents from the renderer.
//!
//! The [`SyncEngine`](super::service::SyncEngine) interprets these and
//! writes the result back to the remote store.

/// Actions a renderer can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Drive the light to an explicit state.
    SetLight(bool),
    /// Flip the light relative to what is currently displayed.
    ToggleLight,
}
