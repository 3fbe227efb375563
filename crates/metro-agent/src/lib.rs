//! `metro-agent` — citizen needs, walking paths, and the decision table.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`needs`]   | `CitizenNeeds` vector and linear decay                    |
//! | [`path`]    | `CitizenPath`, fractional edge progress, `TripPurpose`    |
//! | [`citizen`] | `Citizen` record, `Activity` state                        |
//! | [`decide`]  | per-tick `step`: decay → walk → priority rule table       |
//!
//! The agent layer never mutates the graph: it only *reads* routes and
//! facility locations.  Citizens walk; riding vehicles is the fleet layer's
//! concern, reached by walking to a transit stop.

pub mod citizen;
pub mod decide;
pub mod needs;
pub mod path;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use citizen::{Activity, Citizen};
pub use decide::{step, MEAL_COST, WALK_SPEED_MPS, WALK_THRESHOLD_M};
pub use needs::CitizenNeeds;
pub use path::{CitizenPath, TripPurpose};
