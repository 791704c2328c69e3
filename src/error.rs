// error.rs: Error type for the boundary of the crate.
//
// The aggregation functions never fail: malformed records are treated as
// "not counted" or "incomplete". Only the edges return `Result`: reading
// JSON written by the web client, validating a record before it is stored,
// and saving settings.

use thiserror::Error;

use crate::models::MediaType;

/// Shorthand type alias: `Result<T>` is `Result<T, medialog::Error>`
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The JSON document itself could not be read.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Progress exceeds its total (e.g. 12 of 10 volumes read).
    #[error("{media_type}: {field} ({value}) cannot be greater than the total ({total})")]
    Validation {
        media_type: MediaType,
        field:      &'static str,
        value:      u32,
        total:      u32,
    },

    /// Settings were saved with every category switched off.
    #[error("at least one media type must be enabled")]
    NoMediaTypeSelected,
}
