//! Smart placement of facility and transit-stop nodes into sector sub-cells.
//!
//! # Placement algorithm
//!
//! 1. Resolve the owning sector from the coordinates and generate its
//!    skeleton if needed.
//! 2. Resolve the owning sub-cell; if it already holds its maximum of four
//!    placed nodes, spill over to the **nearest non-full** cell of the same
//!    sector (center-to-point distance — deterministic).
//! 3. Snap the position to one of four quadrant offsets within the cell,
//!    with a small seeded jitter, clamped to a margin inside the cell bounds
//!    so placed nodes never collide with skeleton roads.
//! 4. Wire the node into the cell's local graph (see below) with
//!    [`RoadClass::Access`] roads, bounding node degree while keeping the
//!    cell connected.
//!
//! # Connectivity rule
//!
//! - The **first** node in a cell connects to all four of the cell's corners.
//! - A later node connects to its nearest corner.  If an existing cell node
//!   currently *owns* that corner (has a direct edge to it) and the newcomer
//!   is strictly closer, ownership transfers: the incumbent's corner edge is
//!   replaced by an incumbent→newcomer edge.  Otherwise the incumbent keeps
//!   the corner and the newcomer additionally links to it.
//! - Finally the newcomer links to up to two of the closest cell nodes it is
//!   not already linked to.
//!
//! The only randomness is the position jitter, which flows through the
//! graph's seeded RNG — structural outcomes (degrees, connectivity, cell
//! occupancy) are deterministic for a given insertion sequence.

use log::debug;
use metro_core::{FacilityId, FacilityKind, GeoPoint, NodeId, NodeKind};

use crate::graph::CityGraph;
use crate::sector::CELL_GRID;
use crate::{GraphError, GraphResult, RoadClass};

/// Quadrant centers within a cell, as `(fx, fy)` fractions.
const QUADRANTS: [(f32, f32); 4] = [(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)];

/// Jitter half-range around a quadrant center, as a fraction of cell size.
const JITTER_FRAC: f32 = 0.08;

/// Placed nodes stay at least this fraction inside the cell bounds.
const MARGIN_FRAC: f32 = 0.1;

impl CityGraph {
    /// Place a named facility node at `pos`, wiring it into the owning
    /// sector's road skeleton.  Returns the new node's ID.
    pub fn add_facility(
        &mut self,
        name: impl Into<String>,
        kind: FacilityKind,
        pos: GeoPoint,
        external: Option<FacilityId>,
    ) -> GraphResult<NodeId> {
        self.add_location(name.into(), NodeKind::Facility(kind), pos, external)
    }

    /// Place a transit stop at `pos`.
    pub fn add_transit_stop(
        &mut self,
        name: impl Into<String>,
        pos: GeoPoint,
    ) -> GraphResult<NodeId> {
        self.add_location(name.into(), NodeKind::TransitStop, pos, None)
    }

    /// Place a non-corner node at `pos`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::CornerNotPlaceable`] for `NodeKind::Corner` (corners
    ///   are generated with their sector, never placed).
    /// - [`GraphError::OutsideCity`] if no sector contains `pos`.
    /// - [`GraphError::SectorFull`] if every sub-cell of the owning sector
    ///   already holds four placed nodes.
    pub fn add_location(
        &mut self,
        name: String,
        kind: NodeKind,
        pos: GeoPoint,
        external: Option<FacilityId>,
    ) -> GraphResult<NodeId> {
        if kind.is_corner() {
            return Err(GraphError::CornerNotPlaceable);
        }
        let sector_id = self
            .layout
            .sector_at(pos)
            .ok_or(GraphError::OutsideCity { lat: pos.lat, lon: pos.lon })?;
        self.ensure_sector(sector_id)?;

        // ── Resolve the target cell, spilling over if full ────────────────
        let cell_idx = {
            let sector = &self.sectors[sector_id.index()];
            let home = cell_index_for(sector.bounds, pos);
            if !sector.cells[home].is_full() {
                home
            } else {
                let fallback = sector
                    .cells
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| !c.is_full())
                    .min_by(|(_, x), (_, y)| {
                        let dx = x.bounds.center().distance_m(pos);
                        let dy = y.bounds.center().distance_m(pos);
                        dx.total_cmp(&dy)
                    })
                    .map(|(i, _)| i)
                    .ok_or(GraphError::SectorFull(sector_id))?;
                debug!(
                    "sector {}: cell {home} full, spilling to cell {fallback}",
                    self.sectors[sector_id.index()].name
                );
                fallback
            }
        };

        // ── Quadrant snap with seeded jitter ──────────────────────────────
        let (cell_bounds, cell_corners, occupants) = {
            let cell = &self.sectors[sector_id.index()].cells[cell_idx];
            (cell.bounds, cell.corners, cell.nodes.clone())
        };
        let (qx, qy) = QUADRANTS[occupants.len().min(QUADRANTS.len() - 1)];
        let fx = (qx + self.rng.gen_range(-JITTER_FRAC..JITTER_FRAC))
            .clamp(MARGIN_FRAC, 1.0 - MARGIN_FRAC);
        let fy = (qy + self.rng.gen_range(-JITTER_FRAC..JITTER_FRAC))
            .clamp(MARGIN_FRAC, 1.0 - MARGIN_FRAC);
        let snapped = cell_bounds.at_fraction(fx, fy);

        let id = self.push_node(name, kind, sector_id, snapped, external);

        // ── Wire into the cell ────────────────────────────────────────────
        if occupants.is_empty() {
            // First node in the cell: connect to all four corners.
            for corner in cell_corners {
                self.add_road(id, corner, RoadClass::Access)?;
            }
        } else {
            self.wire_into_occupied_cell(id, snapped, &cell_corners, &occupants)?;
        }

        self.sectors[sector_id.index()].cells[cell_idx].nodes.push(id);
        Ok(id)
    }

    /// Connectivity for the second and later nodes of a cell: nearest-corner
    /// linking with ownership transfer, then up to two nearest-neighbor links.
    fn wire_into_occupied_cell(
        &mut self,
        id: NodeId,
        pos: GeoPoint,
        corners: &[NodeId; 4],
        occupants: &[NodeId],
    ) -> GraphResult<()> {
        let nearest_corner = *corners
            .iter()
            .min_by(|&&a, &&b| {
                let da = self.nodes[a.index()].pos.distance_m(pos);
                let db = self.nodes[b.index()].pos.distance_m(pos);
                da.total_cmp(&db)
            })
            .expect("cells always have four corners");
        let corner_pos = self.nodes[nearest_corner.index()].pos;

        // The occupant closest to the corner among those holding a direct
        // edge to it is the corner's current owner.
        let owner = occupants
            .iter()
            .filter(|&&n| self.nodes[n.index()].edge_to(nearest_corner).is_some())
            .min_by(|&&a, &&b| {
                let da = self.nodes[a.index()].pos.distance_m(corner_pos);
                let db = self.nodes[b.index()].pos.distance_m(corner_pos);
                da.total_cmp(&db)
            })
            .copied();

        match owner {
            Some(owner)
                if pos.distance_m(corner_pos)
                    < self.nodes[owner.index()].pos.distance_m(corner_pos) =>
            {
                // Newcomer is strictly closer: take over the corner.
                self.remove_road(owner, nearest_corner)?;
                self.add_road(owner, id, RoadClass::Access)?;
                self.add_road(id, nearest_corner, RoadClass::Access)?;
            }
            Some(owner) => {
                // Incumbent keeps the corner; newcomer links to both.
                self.add_road(id, nearest_corner, RoadClass::Access)?;
                self.add_road(id, owner, RoadClass::Access)?;
            }
            None => {
                self.add_road(id, nearest_corner, RoadClass::Access)?;
            }
        }

        // Up to two closest cell nodes the newcomer is not already linked to.
        let mut candidates: Vec<(NodeId, f32)> = occupants
            .iter()
            .filter(|&&n| n != id && self.nodes[id.index()].edge_to(n).is_none())
            .map(|&n| (n, self.nodes[n.index()].pos.distance_m(pos)))
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
        for (neighbor, _) in candidates.into_iter().take(2) {
            self.add_road(id, neighbor, RoadClass::Access)?;
        }
        Ok(())
    }
}

/// Row-major index of the sub-cell containing `pos` within `bounds`.
/// Points on the far boundary land in the last cell.
fn cell_index_for(bounds: metro_core::BoundingBox, pos: GeoPoint) -> usize {
    let g = CELL_GRID as f32;
    let fx = (pos.lon - bounds.min.lon) / bounds.lon_span();
    let fy = (pos.lat - bounds.min.lat) / bounds.lat_span();
    let i = ((fx * g) as usize).min(CELL_GRID - 1);
    let j = ((fy * g) as usize).min(CELL_GRID - 1);
    j * CELL_GRID + i
}
