//! Sector layout, corner-skeleton generation, and sub-cell bookkeeping.
//!
//! # Layout vs. runtime state
//!
//! [`SectorLayout`] is the **declarative** description of the city: a list of
//! named sectors with bounding boxes on a coarse grid.  It is built once at
//! startup (from config or [`SectorLayout::grid`]) and handed to the graph —
//! there is no global sector table, so multiple independent cities can
//! coexist in one process.
//!
//! [`Sector`] is the **runtime** state the graph owns for each layout entry:
//! the 5×5 corner-node skeleton and the 4×4 sub-cells.  It is generated
//! lazily on first use, guarded by `initialized`, and never torn down.
//!
//! # Order independence
//!
//! When a sector initializes, it cross-connects its boundary corners to any
//! *already initialized* neighbor whose bounding-box edge coincides with its
//! own (within [`BOUNDARY_EPS_DEG`]).  Because [`CityGraph::add_road`] treats
//! a duplicate link as a benign no-op, initialization order does not matter.

use log::debug;
use metro_core::{BoundingBox, GeoPoint, NodeId, NodeKind, SectorId};

use crate::graph::CityGraph;
use crate::{GraphError, GraphResult, RoadClass};

/// Corner-skeleton dimension: each sector owns a 5×5 grid of corner nodes.
pub const CORNER_GRID: usize = 5;

/// Sub-cell dimension: the skeleton encloses 4×4 cells.
pub const CELL_GRID: usize = 4;

/// Maximum placed (non-corner) nodes per sub-cell.
pub const CELL_NODE_CAP: usize = 4;

/// Two sector bounding-box edges closer than this (degrees) are considered
/// shared, triggering boundary cross-connection.
pub const BOUNDARY_EPS_DEG: f32 = 1e-4;

// ── Declarative layout ────────────────────────────────────────────────────────

/// One named sector in the city layout.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectorSpec {
    /// Display name, e.g. `"B3"`.
    pub name: String,
    /// Grid row (letter axis in the conventional naming).
    pub row: u8,
    /// Grid column (number axis).
    pub col: u8,
    /// Geographic bounds.
    pub bounds: BoundingBox,
}

/// The declarative sector grid for one city.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectorLayout {
    pub sectors: Vec<SectorSpec>,
}

impl SectorLayout {
    /// Build a regular `rows × cols` grid of square sectors starting at
    /// `origin` (south-west corner), each `sector_deg` degrees on a side.
    ///
    /// Sectors are named letter-row + number-column: `A1` is the south-west
    /// sector, `B3` is one row north and three columns east.
    pub fn grid(origin: GeoPoint, rows: u8, cols: u8, sector_deg: f32) -> Self {
        let mut sectors = Vec::with_capacity(rows as usize * cols as usize);
        for r in 0..rows {
            for c in 0..cols {
                let min = GeoPoint::new(
                    origin.lat + r as f32 * sector_deg,
                    origin.lon + c as f32 * sector_deg,
                );
                let max = GeoPoint::new(min.lat + sector_deg, min.lon + sector_deg);
                sectors.push(SectorSpec {
                    name: format!("{}{}", (b'A' + r) as char, c + 1),
                    row: r,
                    col: c,
                    bounds: BoundingBox::new(min, max),
                });
            }
        }
        Self { sectors }
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// The sector whose bounds contain `p`, if any.
    ///
    /// Linear scan — city layouts are a handful of sectors, and this is only
    /// called on placement, never in the tick loop.
    pub fn sector_at(&self, p: GeoPoint) -> Option<SectorId> {
        self.sectors
            .iter()
            .position(|s| s.bounds.contains(p))
            .map(|i| SectorId(i as u16))
    }

    /// Look up a sector by display name.
    pub fn by_name(&self, name: &str) -> Option<SectorId> {
        self.sectors
            .iter()
            .position(|s| s.name == name)
            .map(|i| SectorId(i as u16))
    }

    pub fn spec(&self, id: SectorId) -> Option<&SectorSpec> {
        self.sectors.get(id.index())
    }

    /// Grid neighbors of `id`: every sector within Chebyshev distance 1 on
    /// the (row, col) grid, excluding `id` itself.  This is the "numeric and
    /// letter neighbors" set used for ambulance coverage areas.
    pub fn neighbors(&self, id: SectorId) -> Vec<SectorId> {
        let Some(home) = self.spec(id) else {
            return Vec::new();
        };
        self.sectors
            .iter()
            .enumerate()
            .filter(|(i, s)| {
                *i != id.index()
                    && s.row.abs_diff(home.row) <= 1
                    && s.col.abs_diff(home.col) <= 1
            })
            .map(|(i, _)| SectorId(i as u16))
            .collect()
    }
}

// ── Runtime sector state ──────────────────────────────────────────────────────

/// One sub-cell: a quarter-by-quarter partition of the sector, bounded by
/// four skeleton corners, holding up to [`CELL_NODE_CAP`] placed nodes.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    pub bounds: BoundingBox,
    /// Bounding corners: `[sw, se, nw, ne]`.
    pub corners: [NodeId; 4],
    /// Placed (non-corner) nodes, in placement order.
    pub nodes: Vec<NodeId>,
}

impl Cell {
    #[inline]
    pub fn is_full(&self) -> bool {
        self.nodes.len() >= CELL_NODE_CAP
    }
}

/// Runtime state for one sector.
#[derive(Clone, Debug)]
pub(crate) struct Sector {
    pub id: SectorId,
    pub name: String,
    pub bounds: BoundingBox,
    /// Corner node IDs, indexed `[lat_row][lon_col]`.  All `INVALID` until
    /// the sector initializes.
    pub corners: [[NodeId; CORNER_GRID]; CORNER_GRID],
    /// Row-major 4×4 sub-cells.  Empty until the sector initializes.
    pub cells: Vec<Cell>,
    /// Skeleton generated; set exactly once.
    pub initialized: bool,
}

impl Sector {
    pub fn from_spec(id: SectorId, spec: &SectorSpec) -> Self {
        Self {
            id,
            name: spec.name.clone(),
            bounds: spec.bounds,
            corners: [[NodeId::INVALID; CORNER_GRID]; CORNER_GRID],
            cells: Vec::new(),
            initialized: false,
        }
    }
}

// ── Skeleton generation ───────────────────────────────────────────────────────

impl CityGraph {
    /// Generate the sector's corner skeleton and sub-cells if it has not been
    /// generated yet.  Idempotent; returns `true` if generation ran.
    ///
    /// Perimeter skeleton roads are [`RoadClass::Highway`], interior ones
    /// [`RoadClass::Street`].  Boundary corners are cross-connected to every
    /// already-initialized sector sharing a bounding-box edge, which makes
    /// initialization order-independent.
    pub fn ensure_sector(&mut self, id: SectorId) -> GraphResult<bool> {
        if id.index() >= self.sectors.len() {
            return Err(GraphError::UnknownSector(id));
        }
        if self.sectors[id.index()].initialized {
            return Ok(false);
        }

        let bounds = self.sectors[id.index()].bounds;
        let name = self.sectors[id.index()].name.clone();

        // ── Corner nodes ──────────────────────────────────────────────────
        let mut corners = [[NodeId::INVALID; CORNER_GRID]; CORNER_GRID];
        for (j, row) in corners.iter_mut().enumerate() {
            for (i, slot) in row.iter_mut().enumerate() {
                let pos = bounds.at_fraction(
                    i as f32 / (CORNER_GRID - 1) as f32,
                    j as f32 / (CORNER_GRID - 1) as f32,
                );
                *slot = self.push_node(
                    format!("{name}/{i}.{j}"),
                    NodeKind::Corner,
                    id,
                    pos,
                    None,
                );
            }
        }

        // ── Skeleton roads ────────────────────────────────────────────────
        // Horizontal: row j, columns i and i+1.  Perimeter rows are highways.
        for j in 0..CORNER_GRID {
            for i in 0..CORNER_GRID - 1 {
                let class = if j == 0 || j == CORNER_GRID - 1 {
                    RoadClass::Highway
                } else {
                    RoadClass::Street
                };
                self.add_road(corners[j][i], corners[j][i + 1], class)?;
            }
        }
        // Vertical: column i, rows j and j+1.  Perimeter columns are highways.
        for i in 0..CORNER_GRID {
            for j in 0..CORNER_GRID - 1 {
                let class = if i == 0 || i == CORNER_GRID - 1 {
                    RoadClass::Highway
                } else {
                    RoadClass::Street
                };
                self.add_road(corners[j][i], corners[j + 1][i], class)?;
            }
        }

        // ── Sub-cells ─────────────────────────────────────────────────────
        let mut cells = Vec::with_capacity(CELL_GRID * CELL_GRID);
        for j in 0..CELL_GRID {
            for i in 0..CELL_GRID {
                let min = bounds.at_fraction(
                    i as f32 / CELL_GRID as f32,
                    j as f32 / CELL_GRID as f32,
                );
                let max = bounds.at_fraction(
                    (i + 1) as f32 / CELL_GRID as f32,
                    (j + 1) as f32 / CELL_GRID as f32,
                );
                cells.push(Cell {
                    bounds: BoundingBox::new(min, max),
                    corners: [
                        corners[j][i],
                        corners[j][i + 1],
                        corners[j + 1][i],
                        corners[j + 1][i + 1],
                    ],
                    nodes: Vec::new(),
                });
            }
        }

        {
            let sector = &mut self.sectors[id.index()];
            sector.corners = corners;
            sector.cells = cells;
            sector.initialized = true;
        }

        self.cross_connect_neighbors(id)?;

        debug!(
            "sector {name}: generated {} corners, {} cells",
            CORNER_GRID * CORNER_GRID,
            CELL_GRID * CELL_GRID
        );
        Ok(true)
    }

    /// Eagerly initialize every sector in the layout.
    pub fn init_all_sectors(&mut self) -> GraphResult<()> {
        for i in 0..self.sectors.len() {
            self.ensure_sector(SectorId(i as u16))?;
        }
        Ok(())
    }

    /// Connect `id`'s boundary corners to those of every already-initialized
    /// sector whose bounding box shares an edge with `id`'s.
    fn cross_connect_neighbors(&mut self, id: SectorId) -> GraphResult<()> {
        const G: usize = CORNER_GRID;
        let my_bounds = self.sectors[id.index()].bounds;
        let my_corners = self.sectors[id.index()].corners;

        let eq = |a: f32, b: f32| (a - b).abs() < BOUNDARY_EPS_DEG;

        let pairs: Vec<(NodeId, NodeId)> = self
            .sectors
            .iter()
            .filter(|other| other.id != id && other.initialized)
            .flat_map(|other| {
                let ob = other.bounds;
                let lat_aligned =
                    eq(ob.min.lat, my_bounds.min.lat) && eq(ob.max.lat, my_bounds.max.lat);
                let lon_aligned =
                    eq(ob.min.lon, my_bounds.min.lon) && eq(ob.max.lon, my_bounds.max.lon);

                let mut links = Vec::new();
                if lat_aligned && eq(ob.max.lon, my_bounds.min.lon) {
                    // `other` is directly west: match each boundary row.
                    links.extend((0..G).map(|j| (my_corners[j][0], other.corners[j][G - 1])));
                } else if lat_aligned && eq(ob.min.lon, my_bounds.max.lon) {
                    // East.
                    links.extend((0..G).map(|j| (my_corners[j][G - 1], other.corners[j][0])));
                } else if lon_aligned && eq(ob.max.lat, my_bounds.min.lat) {
                    // South.
                    links.extend((0..G).map(|i| (my_corners[0][i], other.corners[G - 1][i])));
                } else if lon_aligned && eq(ob.min.lat, my_bounds.max.lat) {
                    // North.
                    links.extend((0..G).map(|i| (my_corners[G - 1][i], other.corners[0][i])));
                }
                links
            })
            .collect();

        for (a, b) in pairs {
            self.add_road(a, b, RoadClass::Highway)?;
        }
        Ok(())
    }
}
