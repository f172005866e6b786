//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "spyglass",
    about = "In-process telemetry console for SDK event streams",
    after_help = "\
EXAMPLES:
    spyglass                                 Attach to a live telemetry bus
    spyglass --demo                          Scripted event feed, no SDK needed
    spyglass --replay trace.jsonl            Re-ingest a recorded envelope log
    spyglass --replay trace.jsonl --headless Print the event table and exit
    spyglass --inspect payload.json          Browse a JSON document in the tree view"
)]
pub struct Args {
    /// Run against a scripted demo feed instead of a live bus
    #[arg(long, conflicts_with_all = ["replay", "inspect"])]
    pub demo: bool,

    /// Replay envelopes from a JSON-lines recording
    #[arg(long, value_name = "FILE", conflicts_with = "inspect")]
    pub replay: Option<PathBuf>,

    /// Open the tree inspector on a JSON document
    #[arg(long, value_name = "FILE")]
    pub inspect: Option<PathBuf>,

    /// Show unlimited depth and untruncated strings (requires --inspect)
    #[arg(long, requires = "inspect")]
    pub raw: bool,

    /// Print the event table to stdout without a TUI (requires --replay)
    #[arg(long, requires = "replay")]
    pub headless: bool,

    /// Ring buffer capacity; oldest events are evicted past this
    #[arg(long, value_name = "N", default_value = "200")]
    pub max_events: usize,

    /// Default expansion depth cap for the tree inspector
    #[arg(long, value_name = "N", default_value = "6")]
    pub max_depth: usize,

    /// Path for persisted console state (filter, pane split)
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
