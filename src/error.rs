//! Error types for the harvesting engine.
//!
//! Fetch failures are values, not panics: the paged fetcher returns a
//! [`FetchError`] and the loop-owning component absorbs it at the loop
//! boundary, so a fetch failure never escapes as a [`GatherError`]. Only
//! precondition violations (null identifiers) and a missing credential halt
//! a run.

use std::fmt;

use thiserror::Error;

/// Failure of a single HTTP fetch: one page or one batch.
///
/// Carries the HTTP status code and reason when the server answered, or just
/// a reason for network-level failures. Context about which resource and
/// offset failed is logged by the caller that owns the loop.
#[derive(Debug, Clone)]
pub struct FetchError {
    pub status: Option<u16>,
    pub reason: String,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "HTTP {code}: {}", self.reason),
            None => write!(f, "network error: {}", self.reason),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// A fetch that got a non-2xx HTTP response.
    pub fn status(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            reason: reason.into(),
        }
    }

    /// A fetch that failed before any HTTP status was available.
    pub fn network(reason: impl Into<String>) -> Self {
        Self {
            status: None,
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the gathering engine and the table operations.
#[derive(Debug, Error)]
pub enum GatherError {
    /// No usable credential; fatal to the whole run.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The identifier column handed to the batch joiner contains nulls.
    /// Batch boundaries are strict, so this must be fixed upstream.
    #[error("identifier column `{column}` contains null values; filter them out before batching")]
    NullIdentifier { column: String },

    /// A named column does not exist in the table.
    #[error("column `{column}` not found")]
    MissingColumn { column: String },

    /// A join could not disambiguate overlapping column names.
    #[error("join error: {0}")]
    Join(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
