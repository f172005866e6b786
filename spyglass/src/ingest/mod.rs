//! Telemetry ingestion
//!
//! Everything between the host SDK and the event store: the bus bridge that
//! captures signals ([`bridge`]), the adapter that classifies envelopes into
//! display events ([`adapter`]), and the replay-file loader ([`replay`]).

pub mod adapter;
pub mod bridge;
pub mod replay;

pub use adapter::{adapt, adapt_many, classify_level};
pub use bridge::{attach, envelope_from_signal, BusProvider, SharedBus};
pub use replay::load_envelopes;
