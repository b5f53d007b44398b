//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  Everything runs in-process; no network store
//! or notification service is required.

mod engine_tests;
mod subscription_tests;
