//! Application core: sync orchestration, zero direct I/O.
//!
//! The engine mirrors remote readings into a local snapshot, derives
//! display values, and decides when to alert.  All interaction with the
//! store, the notification system and the UI happens through **port
//! traits** defined in [`ports`], keeping this layer testable with mocks.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod subscriptions;
