//! WeatherSync host simulation: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │  MemoryStore (RemoteStore)   LogAlertSink   LogRenderer  │
//! │  ──────────────── Port trait boundary ────────────────   │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │        SyncEngine: Subs · Snapshot · Alerts        │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Replays a scripted feed into the in-process store and drains the
//! engine after every step.
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use weathersync::adapters::log_sink::{LogAlertSink, LogRenderer, RenderFormat};
use weathersync::adapters::memory_store::MemoryStore;
use weathersync::adapters::replay::{DEMO_FEED, StepOutcome, parse_feed};
use weathersync::app::service::SyncEngine;
use weathersync::config::SyncConfig;

#[derive(Debug, Parser)]
#[command(
    name = "weathersync",
    version,
    about = "Replay a reading feed through the sync and alerting engine",
    after_help = "Examples:\n  weathersync\n  weathersync --feed storm.jsonl --json\n  RUST_LOG=debug weathersync --config site.json"
)]
struct Cli {
    /// JSON config file (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON-lines feed to replay (built-in demo when omitted).
    #[arg(long)]
    feed: Option<PathBuf>,
    /// Render frames as JSON instead of text.
    #[arg(long)]
    json: bool,
    /// Pause between feed steps, in milliseconds.
    #[arg(long, default_value_t = 0)]
    step_delay_ms: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SyncConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SyncConfig::default(),
    };
    let feed_text = match &cli.feed {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading feed {}", path.display()))?,
        None => DEMO_FEED.to_owned(),
    };
    let steps = parse_feed(&feed_text)?;

    let store = MemoryStore::new();
    let mut alerts = LogAlertSink::new();
    let mut renderer = LogRenderer::new(if cli.json {
        RenderFormat::Json
    } else {
        RenderFormat::Text
    });

    let mut engine = SyncEngine::new(config);
    engine.start(&store)?;
    engine.process_pending(&mut alerts, &mut renderer);

    for step in &steps {
        match step.run(&store) {
            StepOutcome::Delivered => {}
            StepOutcome::Command(cmd) => {
                if let Err(e) = engine.handle_command(cmd, &store, &mut renderer) {
                    warn!("{cmd:?} failed: {e}");
                }
            }
        }
        engine.process_pending(&mut alerts, &mut renderer);
        if cli.step_delay_ms > 0 {
            thread::sleep(Duration::from_millis(cli.step_delay_ms));
        }
    }

    engine.stop(&store);
    info!(
        "replay done: {} steps, {} readings applied, {} stale, {} alerts, {} frames",
        steps.len(),
        engine.applied_count(),
        engine.stale_count(),
        alerts.delivered(),
        renderer.frames()
    );
    Ok(())
}
