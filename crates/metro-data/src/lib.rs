//! `metro-data` — CSV dataset ingestion and institution directories.
//!
//! # Crate layout
//!
//! | Module        | Contents                                               |
//! |---------------|--------------------------------------------------------|
//! | [`loader`]    | CSV loaders for facilities, institutions, population   |
//! | [`directory`] | `Directory`: hash-backed `by_id` / `in_sector` lookups |
//!
//! The loaders run **before** simulation starts and feed the graph's smart
//! placement; the resulting [`Directory`] maps external dataset IDs to graph
//! nodes for the transfer API and the school-bus wiring.

pub mod directory;
pub mod error;
pub mod loader;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use directory::{Directory, Institution};
pub use error::{DataError, DataResult};
pub use loader::{
    load_facilities_csv, load_facilities_reader, load_institutions_csv,
    load_institutions_reader, load_population_csv, load_population_reader,
};
