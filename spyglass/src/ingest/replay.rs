//! Replay file loading
//!
//! A replay file is JSON lines: one [`RawEnvelope`] per line, in capture
//! order. Blank lines and `#` comment lines are skipped so fixtures can be
//! annotated by hand.

use crate::domain::ReplayError;
use spyglass_common::RawEnvelope;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load every envelope from `path`, preserving file order.
///
/// Line numbers in errors are 1-based. A file with no envelopes at all is an
/// error; replaying nothing is never what was asked for.
pub fn load_envelopes(path: &Path) -> Result<Vec<RawEnvelope>, ReplayError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut envelopes = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let envelope = serde_json::from_str(trimmed).map_err(|source| ReplayError::Malformed {
            line: index + 1,
            source,
        })?;
        envelopes.push(envelope);
    }

    if envelopes.is_empty() {
        return Err(ReplayError::Empty(path.display().to_string()));
    }
    log::info!("loaded {} envelopes from {}", envelopes.len(), path.display());
    Ok(envelopes)
}
