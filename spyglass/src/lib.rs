//! # Spyglass - In-Process Telemetry Console
//!
//! Spyglass is a developer-diagnostics console for applications that embed a
//! monitoring SDK (error tracker, tracing client, session recorder). It
//! intercepts telemetry at the SDK's own hooks and shows it in a terminal
//! UI before it leaves the process, so developers can see exactly what
//! their instrumentation produces without a backend round trip.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Host Application                           │
//! │                 (SDK shim: TelemetryBus impl)                   │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ hook signals (any thread)
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Ingestion Bridge (ingest)                      │
//! │  • Registers on all six hooks via the bus provider              │
//! │  • Folds spans / transactions / breadcrumbs into envelopes      │
//! │  • Forwards over a channel to the console thread                │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ RawEnvelope stream
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Spyglass (This Crate)                          │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐      │
//! │  │   Adapter    │──▶│ Event Store  │──▶│     TUI      │      │
//! │  │ (classify)   │   │ (ring + sub) │   │  (Terminal)  │      │
//! │  └──────────────┘   └──────────────┘   └──────────────┘      │
//! │                             │                  │               │
//! │                             ▼                  ▼               │
//! │                     ┌──────────────┐   ┌──────────────┐      │
//! │                     │  Scheduler   │   │  Inspector   │      │
//! │                     │ (deferred)   │   │ (value tree) │      │
//! │                     └──────────────┘   └──────────────┘      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! ### Core Pipeline Modules
//!
//! - [`ingest`]: Bus attachment, envelope adaptation, and replay loading
//!   - `bridge`: Register on the six SDK hooks, forward signals as envelopes
//!   - `adapter`: Two-stage classification (kind, then category refinement)
//!   - `replay`: Re-ingest a JSON-lines recording of envelopes
//!
//! - [`store`]: Bounded newest-first event ring with change notification
//!   - Ingest-time filtering (rejected events are dropped permanently)
//!   - Deferred, exactly-once-per-mutation listener notification
//!
//! - [`inspect`]: Value model, classification, and cooperative flattening
//!   - Handles arbitrary graphs, including cyclic ones, without recursion
//!   - Budgeted sessions keep large payloads from stalling the UI
//!
//! - [`sched`]: Single-threaded deferred-task queue
//!   - The run-after-interaction primitive the store and flattener share
//!
//! ### UI and Support Modules
//!
//! - [`tui`]: Terminal UI with Events, Inspector, Filter, Help views
//!   - Live event streaming with ratatui
//!   - Interactive keyboard navigation
//!
//! - [`cli`]: Command-line argument parsing and configuration
//!
//! - [`persist`]: String key/value state surviving restarts (filter, split)
//!
//! - [`demo`]: Scripted feed for exploring the console without a host
//!
//! - [`domain`]: Core domain types (`TelemetryEvent`, `EventType`, `Level`)
//!
//! ## Operational Modes
//!
//! 1. **Live Mode** (default): Attach to the host's telemetry bus
//! 2. **Demo Mode** (`--demo`): Scripted feed, no SDK needed
//! 3. **Replay Mode** (`--replay trace.jsonl`): Re-ingest a recording
//! 4. **Headless Mode** (`--replay ... --headless`): Print and exit, no TUI
//! 5. **Inspect Mode** (`--inspect payload.json`): Tree-browse one document
//!
//! ## Typical Usage
//!
//! ```bash
//! # Explore the console against a scripted feed
//! spyglass --demo
//!
//! # Re-ingest envelopes a shim recorded earlier
//! spyglass --replay trace.jsonl
//!
//! # Dump a recording as a table, e.g. in CI
//! spyglass --replay trace.jsonl --headless
//! ```
//!
//! ## Key Concepts
//!
//! - **Hook**: One of six SDK interception points the console registers on
//! - **Envelope**: The normalized wire record every captured signal becomes
//! - **Two-stage classification**: Coarse kind tag, then category refinement
//! - **Ring**: Newest-first bounded store; capacity evicts from the back
//! - **Permanent drop**: The ingest filter rejects before storage; widening
//!   the filter later cannot resurrect an event
//! - **Circular terminal**: Cycle-safe flattening stops at `[Circular]`

// Expose modules for testing
pub mod cli;
pub mod demo;
pub mod domain;
pub mod ingest;
pub mod inspect;
pub mod persist;
pub mod sched;
pub mod store;
pub mod tui;
