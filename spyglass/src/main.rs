//! # spyglass - Main Entry Point
//!
//! Supports five operational modes:
//! - **Live console** (default): attach to the host's telemetry bus
//! - **Demo** (`--demo`): scripted feed plus a sample inspector payload
//! - **Replay** (`--replay trace.jsonl`): re-ingest a recorded envelope log
//! - **Headless replay** (`--replay ... --headless`): stdout table for CI/CD
//! - **Inspect** (`--inspect payload.json`): tree-browse one JSON document

#![allow(clippy::too_many_lines)]

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::bounded;
use log::info;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use spyglass::cli::Args;
use spyglass::demo::{sample_payload, spawn_producer, DemoBus};
use spyglass::ingest::{adapt_many, attach, load_envelopes, BusProvider, SharedBus};
use spyglass::inspect::Value;
use spyglass::persist::{open_state_store, FILTER_KEY};
use spyglass::sched::{Scheduler, TaskQueue};
use spyglass::store::{EventStore, StoreConfig};
use spyglass::tui::ConsoleApp;

// Exit codes (clap exits with 2 on its own for argument errors)
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            EXIT_ERROR
        }
    });
}

fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    // Inspect mode carries no event stream; skip the store plumbing.
    if let Some(path) = &args.inspect {
        return run_inspect(path, args.raw, args.max_depth, args.state.as_deref());
    }

    let state = open_state_store(args.state.as_deref());
    let filter = state
        .get(FILTER_KEY)
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default();
    let config = StoreConfig { max_events: args.max_events, filter };

    if let (Some(path), true) = (&args.replay, args.headless) {
        return run_headless(path, config, quiet);
    }

    if !quiet {
        println!("spyglass v{}", env!("CARGO_PKG_VERSION"));
    }

    let queue = Rc::new(TaskQueue::new());
    let scheduler: Rc<dyn Scheduler> = Rc::clone(&queue) as Rc<dyn Scheduler>;
    let store = Rc::new(EventStore::new(scheduler, config));

    // Envelopes cross threads over this channel; the console drains it
    // on its own thread each tick.
    let (envelope_tx, envelope_rx) = bounded(1024);

    let mut ingest_rx = None;
    if args.demo {
        let bus = Arc::new(DemoBus::new());
        let shared: SharedBus = Arc::clone(&bus) as SharedBus;
        let provider: BusProvider = Box::new(move || Some(Arc::clone(&shared)));
        if attach(&provider, &envelope_tx) {
            ingest_rx = Some(envelope_rx);
        }
        spawn_producer(bus);
        if !quiet {
            println!("mode: demo (scripted feed)");
        }
    } else if let Some(path) = &args.replay {
        let envelopes = load_envelopes(path)?;
        let count = envelopes.len();
        store.add_batch(adapt_many(&envelopes));
        info!("replayed {count} envelopes from {}", path.display());
        if !quiet {
            println!("mode: replay ({count} envelopes from {})", path.display());
        }
    } else {
        // Standalone default: there is no host bus to attach to, so the
        // provider comes up empty and the console runs without live
        // ingestion. Embedding hosts supply a real provider instead
        // (see examples/embed.rs).
        let provider: BusProvider = Box::new(|| None);
        if attach(&provider, &envelope_tx) {
            ingest_rx = Some(envelope_rx);
        }
        if !quiet {
            println!("mode: live (no bus attached; waiting for an embedding host)");
        }
    }

    let mut app = ConsoleApp::new(store, queue, state, ingest_rx, args.max_depth);
    if args.demo {
        app.open_inspector("demo payload", &sample_payload(), false);
    }
    app.run()
}

/// Open the tree inspector directly on a JSON document.
fn run_inspect(path: &Path, raw: bool, max_depth: usize, state_path: Option<&Path>) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let value = Value::from_json(&json);

    let queue = Rc::new(TaskQueue::new());
    let scheduler: Rc<dyn Scheduler> = Rc::clone(&queue) as Rc<dyn Scheduler>;
    let store = Rc::new(EventStore::new(scheduler, StoreConfig::default()));
    let state = open_state_store(state_path);

    let title = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());

    let mut app = ConsoleApp::new(store, queue, state, None, max_depth);
    app.open_inspector(title, &value, raw);
    app.run()
}

/// Replay a recording through the normal ingest path and print the surviving
/// events as a newest-first table, no terminal UI.
fn run_headless(path: &Path, config: StoreConfig, quiet: bool) -> Result<()> {
    let queue = Rc::new(TaskQueue::new());
    let scheduler: Rc<dyn Scheduler> = Rc::clone(&queue) as Rc<dyn Scheduler>;
    let store = EventStore::new(scheduler, config);

    let envelopes = load_envelopes(path)?;
    let adapted = adapt_many(&envelopes);
    let adapted_count = adapted.len();
    store.add_batch(adapted);
    queue.drain();

    let stats = store.stats();
    if !quiet {
        eprintln!(
            "replayed: {} envelopes, {} after dedup, {} stored, {} dropped by filter, {} evicted",
            envelopes.len(),
            adapted_count,
            stats.stored,
            stats.dropped,
            stats.evicted,
        );
    }

    println!("{:<24} {:<6} {:<12} {:<20} MESSAGE", "TIME", "LEVEL", "TYPE", "SOURCE");
    for event in store.get_events() {
        println!(
            "{:<24} {:<6} {:<12} {:<20} {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            event.level,
            event.event_type,
            event.source,
            event.message,
        );
    }

    Ok(())
}
