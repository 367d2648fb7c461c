//! Error types for the display-sync governor.

use thiserror::Error;

/// Errors raised by the checked display-sync constructors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Invalid frame rate range: min {min}, max {max}, preferred {preferred}")]
    InvalidFrameRateRange { min: i32, max: i32, preferred: i32 },

    #[error("Unknown refresh rate mode {mode}")]
    UnknownRefreshRateMode { mode: i32 },
}
