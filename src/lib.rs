//! WeatherSync library.
//!
//! Mirrors remote temperature, humidity, rain and light readings into a
//! local snapshot, derives display text and colours, raises one alert per
//! condition onset, and writes the light state back to the store.

#![deny(unused_must_use)]

pub mod adapters;
pub mod alert;
pub mod app;
pub mod color;
pub mod config;
pub mod error;
pub mod mapper;
pub mod reading;
pub mod snapshot;
