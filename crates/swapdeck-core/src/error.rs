use thiserror::Error;

use swapdeck_store::StoreError;

/// Faults surfaced by the engines.
///
/// Only collaborator failures travel this way. Business outcomes — a
/// declined offer, a code mismatch, an empty deck — are ordinary result
/// values on the operation that produced them, and content-provider failures
/// are swallowed into fallbacks before they reach the engines.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The repository failed a read or write. The triggering mutation was
    /// not committed to in-memory state.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoreError>;
