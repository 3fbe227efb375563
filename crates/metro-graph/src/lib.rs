//! `metro-graph` — sector-based road graph, routing, and traffic model.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`node`]      | `Node`, `Edge`, `RoadClass`, facility weight penalties   |
//! | [`sector`]    | `SectorLayout`, skeleton generation, sub-cells           |
//! | [`graph`]     | `CityGraph` arena, road insertion, R-tree snap           |
//! | [`place`]     | smart facility placement (`add_location`)                |
//! | [`route`]     | Dijkstra (base + congested), nearest-facility search     |
//! | [`traffic`]   | edge occupancy and the congestion weight model           |
//!
//! # Typical construction sequence
//!
//! ```
//! use metro_core::{FacilityKind, GeoPoint};
//! use metro_graph::{CityGraph, SectorLayout};
//!
//! let layout = SectorLayout::grid(GeoPoint::new(30.0, -88.0), 2, 2, 0.02);
//! let mut graph = CityGraph::new(layout, 42);
//! let hospital = graph
//!     .add_facility("General Hospital", FacilityKind::Hospital,
//!                   GeoPoint::new(30.005, -87.995), None)
//!     .unwrap();
//! assert!(graph.node(hospital).is_some());
//! ```

pub mod error;
pub mod graph;
pub mod node;
pub mod place;
pub mod route;
pub mod sector;
pub mod traffic;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{GraphError, GraphResult};
pub use graph::{CityGraph, LinkOutcome};
pub use node::{Edge, Node, RoadClass, FACILITY_CORNER_PENALTY, FACILITY_FACILITY_PENALTY};
pub use route::{PathOutcome, Route};
pub use sector::{SectorLayout, SectorSpec, BOUNDARY_EPS_DEG, CELL_GRID, CELL_NODE_CAP, CORNER_GRID};
