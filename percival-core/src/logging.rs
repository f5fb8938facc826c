//! File-backed log sink for failure records
//!
//! Every failing operation emits a `tracing` event carrying the message,
//! the SQL error code when the driver reported one, and the statement text
//! plus bound parameters when a statement was involved. Hosts that already
//! run a subscriber get those records for free; hosts that want the
//! append-only file behavior call [`init`] once at startup.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Location of the failure log. A configuration constant, not a per-call
/// parameter.
pub const DEFAULT_LOG_PATH: &str = "percival.log";

/// Install a global subscriber appending timestamped records to
/// [`DEFAULT_LOG_PATH`]. Fails if the file cannot be opened or another
/// subscriber is already installed.
pub fn init() -> io::Result<()> {
    init_to(DEFAULT_LOG_PATH)
}

/// Install the subscriber over an explicit path. Exposed for hosts that
/// relocate their log directory at deploy time.
pub fn init_to(path: impl AsRef<Path>) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .try_init()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))
}
