//! `metro-core` — foundational types for the metro urban-mobility simulation.
//!
//! This crate is a dependency of every other `metro-*` crate.  It
//! intentionally has no `metro-*` dependencies and minimal external ones
//! (only `rand` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                               |
//! |-----------------|--------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `SectorId`, `VehicleId`, `CitizenId`, …      |
//! | [`geo`]         | `GeoPoint`, `BoundingBox`, flat-earth distance         |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                        |
//! | [`rng`]         | `SimRng` (deterministic, seedable)                     |
//! | [`facility`]    | `FacilityKind`, `NodeKind` enums                       |
//! | [`error`]       | `MetroError`, `MetroResult`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.         |

pub mod error;
pub mod facility;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{MetroError, MetroResult};
pub use facility::{FacilityKind, NodeKind};
pub use geo::{BoundingBox, GeoPoint, M_PER_DEG_LAT};
pub use ids::{CitizenId, FacilityId, NodeId, SectorId, TransferId, VehicleId};
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, Tick};
