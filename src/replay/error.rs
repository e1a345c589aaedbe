use tracing::{error, warn};

use crate::engine::EngineError;
use crate::io::IoError;

/// Policy for handling errors during command replay
pub trait ErrorPolicy: Send + Sync {
    /// Handle an IO error (CSV parsing, reading).
    /// Return true to continue processing, false to abort.
    fn handle_io_error(&self, error: IoError) -> bool;

    /// Handle an engine error (rejected operation).
    /// Return true to continue processing, false to abort.
    fn handle_engine_error(&self, error: EngineError) -> bool;
}

/// Log and skip errors, keep processing
pub struct SkipErrors;

impl ErrorPolicy for SkipErrors {
    fn handle_io_error(&self, error: IoError) -> bool {
        warn!(error = %error, "skipping malformed command");
        true
    }

    fn handle_engine_error(&self, error: EngineError) -> bool {
        warn!(error = %error, "skipping rejected operation");
        true
    }
}

/// Abort on first error
pub struct AbortOnError;

impl ErrorPolicy for AbortOnError {
    fn handle_io_error(&self, error: IoError) -> bool {
        error!(error = %error, "aborting replay on malformed command");
        false
    }

    fn handle_engine_error(&self, error: EngineError) -> bool {
        error!(error = %error, "aborting replay on rejected operation");
        false
    }
}

/// Skip errors without logging
pub struct SilentSkip;

impl ErrorPolicy for SilentSkip {
    fn handle_io_error(&self, _error: IoError) -> bool {
        true
    }

    fn handle_engine_error(&self, _error: EngineError) -> bool {
        true
    }
}
