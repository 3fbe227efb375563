//! Shared error type.
//!
//! Sub-crates define their own error enums and either convert them into
//! `MetroError` via `From` impls or wrap `MetroError` as one variant.  Both
//! patterns are acceptable; prefer whichever keeps error sites clean.

use thiserror::Error;

use crate::{CitizenId, NodeId, VehicleId};

/// The top-level error type for `metro-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum MetroError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("vehicle {0} not found")]
    VehicleNotFound(VehicleId),

    #[error("citizen {0} not found")]
    CitizenNotFound(CitizenId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `metro-*` crates.
pub type MetroResult<T> = Result<T, MetroError>;
