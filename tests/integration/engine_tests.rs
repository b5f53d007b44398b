//! SyncEngine against manual store, recording sink and renderer.

use serde_json::{Value, json};
use weathersync::alert::ArmState;
use weathersync::app::commands::AppCommand;
use weathersync::app::ports::{StoreError, StoreEvent};
use weathersync::app::service::SyncEngine;
use weathersync::color;
use weathersync::config::SyncConfig;
use weathersync::error::Error;
use weathersync::reading::{Quantity, Sample};

use crate::mock_ports::{ManualStore, RecordingAlerts, RecordingRenderer};

const TEMP: &str = "sensor/temperature";
const HUM: &str = "sensor/humidity";
const LIGHT: &str = "light";
const RAIN: &str = "RainSensor/isRaining";

fn started() -> (SyncEngine, ManualStore, RecordingAlerts, RecordingRenderer) {
    let store = ManualStore::new();
    let mut engine = SyncEngine::new(SyncConfig::default());
    engine.start(&store).unwrap();
    (engine, store, RecordingAlerts::default(), RecordingRenderer::default())
}

#[test]
fn temperature_stream_alerts_once_and_renders_in_order() {
    let (mut engine, store, mut alerts, mut renderer) = started();
    let mut colors = Vec::new();
    for t in [25, 32, 28] {
        store.push(TEMP, json!(t));
        assert_eq!(engine.process_pending(&mut alerts, &mut renderer), 1);
        colors.push(engine.display().temperature_color);
    }

    assert_eq!(alerts.alerts.len(), 1);
    assert_eq!(alerts.alerts[0].title, "Warning!");
    assert_eq!(
        alerts.alerts[0].message,
        "Temperatures exceed 30°C, currently 32°C!"
    );
    assert_eq!(renderer.temperature_texts(), ["25°C", "32°C", "28°C"]);

    // Warmer input below the cap is redder and less green.
    let (c25, c28) = (colors[0].value().unwrap(), colors[2].value().unwrap());
    assert!(c28.r >= c25.r);
    assert!(c28.g <= c25.g);
    assert_eq!(colors[1], Sample::Value(color::RED));
}

#[test]
fn rain_onsets_alert_once_each() {
    let (mut engine, store, mut alerts, mut renderer) = started();
    let mut per_step = Vec::new();
    for on in [false, true, true, false, true] {
        let before = alerts.alerts.len();
        store.push(RAIN, json!(on));
        engine.process_pending(&mut alerts, &mut renderer);
        per_step.push(alerts.alerts.len() - before);
    }
    assert_eq!(per_step, [0, 1, 0, 0, 1]);
    assert!(alerts.alerts.iter().all(|a| a.message == "It's raining, check now!"));
}

#[test]
fn delivery_error_shows_error_and_rearms() {
    let (mut engine, store, mut alerts, mut renderer) = started();
    store.push(RAIN, json!(true));
    store.push(HUM, json!(55));
    engine.process_pending(&mut alerts, &mut renderer);
    assert_eq!(engine.alert_state(Quantity::Rain), Some(ArmState::Fired));

    store.deliver(RAIN, StoreEvent::Failed(StoreError::Disconnected));
    store.deliver(HUM, StoreEvent::Failed(StoreError::Disconnected));
    engine.process_pending(&mut alerts, &mut renderer);
    assert_eq!(engine.alert_state(Quantity::Rain), Some(ArmState::Armed));
    let d = engine.display();
    assert_eq!(d.humidity_display, "Error");
    assert!(d.humidity_color.is_error());

    // Same subscription keeps delivering after the error.
    store.push(RAIN, json!(true));
    store.push(HUM, json!(60));
    engine.process_pending(&mut alerts, &mut renderer);
    assert_eq!(alerts.alerts.len(), 2);
    assert_eq!(engine.display().humidity_display, "60%");
    assert_eq!(store.subscribe_calls().len(), 4);
}

#[test]
fn null_value_renders_placeholder() {
    let (mut engine, store, mut alerts, mut renderer) = started();
    store.push(TEMP, json!(21.5));
    store.push(TEMP, Value::Null);
    engine.process_pending(&mut alerts, &mut renderer);
    assert_eq!(engine.display().temperature_display, "--");
    assert_eq!(engine.display().temperature_color, Sample::Missing);
}

#[test]
fn humidity_out_of_range_clamps_color() {
    let (mut engine, store, mut alerts, mut renderer) = started();
    store.push(HUM, json!(100));
    engine.process_pending(&mut alerts, &mut renderer);
    let full = engine.display().humidity_color;
    store.push(HUM, json!(150));
    engine.process_pending(&mut alerts, &mut renderer);
    assert_eq!(engine.display().humidity_color, full);
    assert_eq!(engine.display().humidity_display, "150%");
}

#[test]
fn set_light_is_optimistic() {
    let (mut engine, store, _alerts, mut renderer) = started();
    engine.set_light(true, &store, &mut renderer).unwrap();
    assert!(engine.display().light_on);
    assert_eq!(renderer.last().map(|f| f.light_on), Some(true));
    assert_eq!(store.writes(), [(LIGHT.to_owned(), json!(true))]);
}

#[test]
fn store_push_overrides_optimistic_light() {
    let (mut engine, store, mut alerts, mut renderer) = started();
    engine.set_light(true, &store, &mut renderer).unwrap();
    store.push(LIGHT, json!(false));
    engine.process_pending(&mut alerts, &mut renderer);
    assert!(!engine.display().light_on);
}

#[test]
fn failed_write_keeps_optimistic_state_and_flags() {
    let (mut engine, store, mut alerts, mut renderer) = started();
    store.fail_writes(StoreError::PermissionDenied);
    let err = engine.set_light(true, &store, &mut renderer).unwrap_err();
    assert_eq!(err, Error::Store(StoreError::PermissionDenied));
    let d = engine.display();
    assert!(d.light_on);
    assert!(d.light_write_failed);

    // The next authoritative push is the source of truth.
    store.push(LIGHT, json!(false));
    engine.process_pending(&mut alerts, &mut renderer);
    let d = engine.display();
    assert!(!d.light_on);
    assert!(!d.light_write_failed);
}

#[test]
fn toggle_flips_displayed_state() {
    let (mut engine, store, _alerts, mut renderer) = started();
    engine
        .handle_command(AppCommand::ToggleLight, &store, &mut renderer)
        .unwrap();
    engine
        .handle_command(AppCommand::ToggleLight, &store, &mut renderer)
        .unwrap();
    engine
        .handle_command(AppCommand::SetLight(true), &store, &mut renderer)
        .unwrap();
    assert_eq!(
        store.writes(),
        [
            (LIGHT.to_owned(), json!(true)),
            (LIGHT.to_owned(), json!(false)),
            (LIGHT.to_owned(), json!(true)),
        ]
    );
}

#[test]
fn wrong_type_is_error_not_zero() {
    let (mut engine, store, mut alerts, mut renderer) = started();
    store.push(TEMP, json!("warm"));
    store.push(RAIN, json!("yes"));
    engine.process_pending(&mut alerts, &mut renderer);
    assert_eq!(engine.display().temperature_display, "Error");
    assert!(alerts.alerts.is_empty());
}

#[test]
fn custom_keys_and_threshold() {
    let config = SyncConfig::from_json(
        r#"{ "temperature_alert_c": 35, "keys": { "temperature": "lab/t" } }"#,
    )
    .unwrap();
    let store = ManualStore::new();
    let mut engine = SyncEngine::new(config);
    engine.start(&store).unwrap();
    let (mut alerts, mut renderer) = (RecordingAlerts::default(), RecordingRenderer::default());

    store.push(TEMP, json!(40));
    store.push("lab/t", json!(33));
    engine.process_pending(&mut alerts, &mut renderer);
    assert!(alerts.alerts.is_empty());
    assert_eq!(engine.display().temperature_display, "33°C");

    store.push("lab/t", json!(36));
    engine.process_pending(&mut alerts, &mut renderer);
    assert_eq!(
        alerts.alerts[0].message,
        "Temperatures exceed 35°C, currently 36°C!"
    );
}
