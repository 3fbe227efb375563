//! `metro-sim` — the tick-loop orchestrator.
//!
//! # Crate layout
//!
//! | Module       | Contents                                           |
//! |--------------|----------------------------------------------------|
//! | [`sim`]      | `CitySim`: the phased tick loop                    |
//! | [`builder`]  | `SimBuilder`: validated construction               |
//! | [`observer`] | `SimObserver` trait, `NoopObserver`                |
//! | [`stats`]    | `TickStats` snapshot                               |
//! | [`error`]    | `SimError`, `SimResult`                            |
//!
//! # Concurrency model
//!
//! Single-threaded, tick-driven cooperative scheduling.  All shared mutable
//! state (edge loads, vehicle registries, the transfer queue) is touched
//! from one logical thread per tick; there is no locking and no
//! parallelism.  Routing during a tick reads the congestion snapshot taken
//! at the top of that tick, never fresher.

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod stats;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::CitySim;
pub use stats::TickStats;
