//! Subscription lifecycle, sequencing and cross-thread delivery.

use std::sync::Arc;
use std::thread;

use serde_json::json;
use weathersync::adapters::memory_store::MemoryStore;
use weathersync::app::ports::StoreError;
use weathersync::app::service::SyncEngine;
use weathersync::app::subscriptions::{READING_QUEUE_DEPTH, SubscriptionManager};
use weathersync::config::{StoreKeys, SyncConfig};
use weathersync::error::Error;
use weathersync::reading::{Quantity, RawValue, Reading, Sample};
use weathersync::snapshot::Applied;

use crate::mock_ports::{ManualStore, RecordingAlerts, RecordingRenderer};

#[test]
fn resubscribe_is_a_noop() {
    let store = ManualStore::new();
    let mut subs = SubscriptionManager::new(StoreKeys::default());
    assert!(subs.subscribe(Quantity::Humidity, &store).unwrap());
    assert!(!subs.subscribe(Quantity::Humidity, &store).unwrap());
    assert_eq!(store.subscribe_calls(), ["sensor/humidity"]);

    subs.subscribe_all(&store).unwrap();
    subs.subscribe_all(&store).unwrap();
    assert_eq!(subs.active_count(), 4);
    assert_eq!(store.live_listeners(), 4);
}

#[test]
fn restarting_engine_does_not_duplicate_streams() {
    let store = ManualStore::new();
    let mut engine = SyncEngine::new(SyncConfig::default());
    engine.start(&store).unwrap();
    engine.start(&store).unwrap();
    assert_eq!(store.subscribe_calls().len(), 4);

    let (mut alerts, mut renderer) = (RecordingAlerts::default(), RecordingRenderer::default());
    store.push("sensor/temperature", json!(20));
    assert_eq!(engine.process_pending(&mut alerts, &mut renderer), 1);
}

#[test]
fn unsubscribe_and_stop_release_handles() {
    let store = ManualStore::new();
    let mut subs = SubscriptionManager::new(StoreKeys::default());
    subs.subscribe_all(&store).unwrap();
    assert!(subs.unsubscribe(Quantity::Light, &store));
    assert!(!subs.unsubscribe(Quantity::Light, &store));
    assert!(!subs.is_subscribed(Quantity::Light));
    subs.stop(&store);
    assert_eq!(subs.active_count(), 0);
    assert_eq!(store.live_listeners(), 0);
    assert_eq!(store.unsubscribed().len(), 4);
}

#[test]
fn subscribe_failure_is_reported() {
    let store = ManualStore::new();
    store.fail_subscribes(StoreError::PermissionDenied);
    let mut engine = SyncEngine::new(SyncConfig::default());
    assert_eq!(
        engine.start(&store),
        Err(Error::Store(StoreError::PermissionDenied))
    );
    assert_eq!(engine.subscriptions().active_count(), 0);
}

#[test]
fn pushes_are_stamped_per_key() {
    let store = ManualStore::new();
    let mut subs = SubscriptionManager::new(StoreKeys::default());
    subs.subscribe_all(&store).unwrap();
    store.push("sensor/temperature", json!(1));
    store.push("sensor/temperature", json!(2));
    store.push("light", json!(true));

    let stamps: Vec<(Quantity, u64)> = std::iter::from_fn(|| subs.try_next())
        .map(|r| (r.quantity, r.observed_at))
        .collect();
    assert_eq!(
        stamps,
        [
            (Quantity::Temperature, 1),
            (Quantity::Temperature, 2),
            (Quantity::Light, 1),
        ]
    );
}

#[test]
fn late_delivery_does_not_roll_back() {
    let store = ManualStore::new();
    let mut engine = SyncEngine::new(SyncConfig::default());
    engine.start(&store).unwrap();
    let queue = engine.subscriptions().queue();
    let number = |v| Sample::Value(RawValue::Number(v));

    assert!(queue.try_send(Reading::new(Quantity::Temperature, number(22.0), 5)).is_ok());
    assert!(queue.try_send(Reading::new(Quantity::Temperature, number(35.0), 3)).is_ok());

    let (mut alerts, mut renderer) = (RecordingAlerts::default(), RecordingRenderer::default());
    assert_eq!(engine.process_pending(&mut alerts, &mut renderer), 1);
    assert_eq!(engine.display().temperature_display, "22°C");
    assert_eq!(engine.snapshot().entry(Quantity::Temperature).observed_at, 5);
    assert!(alerts.alerts.is_empty(), "stale reading must not alert");
    assert_eq!(engine.stale_count(), 1);

    let stale = Reading::new(Quantity::Temperature, number(10.0), 4);
    assert_eq!(engine.apply(&stale, &mut alerts, &mut renderer), Applied::Stale);
}

#[test]
fn concurrent_pushes_are_serialised() {
    let store = Arc::new(MemoryStore::new());
    let mut engine = SyncEngine::new(SyncConfig::default());
    engine.start(store.as_ref()).unwrap();
    let (mut alerts, mut renderer) = (RecordingAlerts::default(), RecordingRenderer::default());
    // Initial null deliveries from subscribe.
    assert_eq!(engine.process_pending(&mut alerts, &mut renderer), 4);

    let workers: Vec<_> = [("sensor/temperature", 20), ("sensor/humidity", 40)]
        .into_iter()
        .map(|(key, base)| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..6 {
                    store.push(key, json!(base + i));
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    assert_eq!(engine.process_pending(&mut alerts, &mut renderer), 12);
    let d = engine.display();
    assert_eq!(d.temperature_display, "25°C");
    assert_eq!(d.humidity_display, "45%");
    assert_eq!(engine.snapshot().entry(Quantity::Temperature).observed_at, 7);
}

#[test]
fn burst_beyond_queue_depth_keeps_latest_and_alerts() {
    let store = MemoryStore::new();
    let mut engine = SyncEngine::new(SyncConfig::default());
    engine.start(&store).unwrap();
    let (mut alerts, mut renderer) = (RecordingAlerts::default(), RecordingRenderer::default());
    engine.process_pending(&mut alerts, &mut renderer);

    let burst = READING_QUEUE_DEPTH as u64 + 8;
    for h in 0..burst {
        store.push("sensor/humidity", json!(h));
    }
    store.push("RainSensor/isRaining", json!(true));
    assert!(engine.subscriptions().has_pending());

    // The channel holds the first DEPTH pushes; the rest coalesce per key.
    assert_eq!(
        engine.process_pending(&mut alerts, &mut renderer),
        READING_QUEUE_DEPTH + 2
    );
    assert!(!engine.subscriptions().has_pending());
    assert_eq!(engine.display().humidity_display, format!("{}%", burst - 1));
    assert_eq!(store.get("sensor/humidity"), Some(json!(burst - 1)));
    assert_eq!(alerts.alerts.len(), 1);
    assert_eq!(alerts.alerts[0].message, "It's raining, check now!");
}

#[test]
fn overflowed_key_catches_up_after_later_drain() {
    let store = ManualStore::new();
    let mut engine = SyncEngine::new(SyncConfig::default());
    engine.start(&store).unwrap();
    let (mut alerts, mut renderer) = (RecordingAlerts::default(), RecordingRenderer::default());

    for t in 0..READING_QUEUE_DEPTH + 3 {
        store.push("sensor/temperature", json!(t));
    }
    engine.process_pending(&mut alerts, &mut renderer);
    let last = READING_QUEUE_DEPTH + 2;
    assert_eq!(engine.display().temperature_display, format!("{last}°C"));
    assert_eq!(
        engine.snapshot().entry(Quantity::Temperature).observed_at,
        last as u64 + 1
    );
    // One onset across the whole ramp (threshold 30).
    assert_eq!(alerts.alerts.len(), 1);
}
