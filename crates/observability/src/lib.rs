//! Process-wide log setup shared by the gatekeep binaries and tests.

pub mod tracing;

pub use crate::tracing::{LOG_FORMAT_ENV, LogFormat, init_with};

/// Install the global subscriber, with the format taken from [`LOG_FORMAT_ENV`].
///
/// Later calls are no-ops.
pub fn init() {
    crate::tracing::init();
}
