//! Error types for the recommendation engine.
//!
//! The engine itself degrades rather than fails: empty catalogs, unknown
//! users, and missing models all produce empty results. Errors are reserved
//! for malformed requests caught at the dispatch boundary.

use thiserror::Error;

/// Errors surfaced to the serving layer
#[derive(Error, Debug)]
pub enum EngineError {
    /// The request was malformed (unknown strategy name, zero limit)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
