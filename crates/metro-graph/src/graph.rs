//! The `CityGraph`: node arena, road insertion/removal, and spatial snap.
//!
//! # Data layout
//!
//! Nodes live in a growable arena `Vec<Node>`; a `NodeId` is the arena slot,
//! so ID-based access is O(1) without any lifetime juggling.  Each node owns
//! its adjacency list.  Roads are always inserted in both directions with
//! equal capacity; the traffic layer keeps the two loads in lock-step.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  Used
//! by dataset loaders to snap citizen home/work coordinates to road nodes.
//! Nodes are inserted incrementally as they are created.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use metro_core::{FacilityId, GeoPoint, NodeId, NodeKind, SectorId, SimRng};

use crate::sector::{Sector, SectorLayout};
use crate::{Edge, GraphError, GraphResult, Node, RoadClass};
use crate::node::{FACILITY_CORNER_PENALTY, FACILITY_FACILITY_PENALTY};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f32; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for
    /// nearest-node queries within a city.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// Result of a successful [`CityGraph::add_road`] call.
///
/// Distinguishes "the road now exists because we just built it" from "the
/// road already existed" — conflating the two behind a silent no-op makes
/// duplicate-insertion bugs invisible.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LinkOutcome {
    /// A new road was inserted (both directions).
    Added,
    /// The road already existed; nothing changed.
    AlreadyLinked,
}

// ── CityGraph ─────────────────────────────────────────────────────────────────

/// The spatially-indexed, capacity-aware road graph for one city.
///
/// Owns the sector runtime state and all placement randomness, so two
/// `CityGraph` instances are fully independent — there is no global sector
/// table.
pub struct CityGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) sectors: Vec<Sector>,
    pub(crate) layout: SectorLayout,
    pub(crate) rng: SimRng,
    spatial_idx: RTree<NodeEntry>,
}

impl CityGraph {
    /// Create an empty graph over `layout`.  `seed` drives placement jitter;
    /// the same seed and call sequence always produce an identical city.
    pub fn new(layout: SectorLayout, seed: u64) -> Self {
        let sectors = layout
            .sectors
            .iter()
            .enumerate()
            .map(|(i, spec)| Sector::from_spec(SectorId(i as u16), spec))
            .collect();
        Self {
            nodes: Vec::new(),
            sectors,
            layout,
            rng: SimRng::new(seed),
            spatial_idx: RTree::new(),
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges (twice the number of roads).
    pub fn directed_edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// Number of roads (undirected).
    pub fn road_count(&self) -> usize {
        self.directed_edge_count() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Node access ───────────────────────────────────────────────────────

    /// The node with the given ID, or `None` if out of range.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// All nodes, indexed by `NodeId`.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Position of `id`, or `None` if out of range.
    #[inline]
    pub fn position(&self, id: NodeId) -> Option<GeoPoint> {
        self.nodes.get(id.index()).map(|n| n.pos)
    }

    /// Sector of `id`, or `None` if out of range.
    #[inline]
    pub fn sector_of(&self, id: NodeId) -> Option<SectorId> {
        self.nodes.get(id.index()).map(|n| n.sector)
    }

    /// The declarative layout this graph was built over.
    pub fn layout(&self) -> &SectorLayout {
        &self.layout
    }

    /// `true` once `ensure_sector(id)` has generated the skeleton.
    pub fn sector_initialized(&self, id: SectorId) -> bool {
        self.sectors
            .get(id.index())
            .is_some_and(|s| s.initialized)
    }

    /// Placed-node count of each of the sector's 16 sub-cells, row-major.
    /// Empty if the sector has not initialized yet.
    pub fn cell_population(&self, id: SectorId) -> GraphResult<Vec<usize>> {
        let sector = self
            .sectors
            .get(id.index())
            .ok_or(GraphError::UnknownSector(id))?;
        Ok(sector.cells.iter().map(|c| c.nodes.len()).collect())
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest graph node to `pos`.
    ///
    /// Returns `None` only if the graph has no nodes.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// Return up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }

    // ── Road insertion / removal ──────────────────────────────────────────

    /// Insert a road between `a` and `b` (both directions, equal capacity).
    ///
    /// The base weight is the flat-earth distance between the endpoints;
    /// [`RoadClass::Access`] roads additionally carry the facility penalty
    /// (1.5× when one endpoint is a corner, 1.3× between two placed nodes).
    ///
    /// # Errors
    ///
    /// - [`GraphError::SelfLoop`] if `a == b`.
    /// - [`GraphError::UnknownNode`] if either ID is out of range.
    ///
    /// A pre-existing road is **not** an error: the call returns
    /// [`LinkOutcome::AlreadyLinked`] and changes nothing.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, class: RoadClass) -> GraphResult<LinkOutcome> {
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        if a.index() >= self.nodes.len() {
            return Err(GraphError::UnknownNode(a));
        }
        if b.index() >= self.nodes.len() {
            return Err(GraphError::UnknownNode(b));
        }
        if self.nodes[a.index()].edge_to(b).is_some() {
            debug_assert!(
                self.nodes[b.index()].edge_to(a).is_some(),
                "edge mirror invariant violated between {a} and {b}"
            );
            return Ok(LinkOutcome::AlreadyLinked);
        }

        let factor = match class {
            RoadClass::Access => {
                let corner_involved = self.nodes[a.index()].kind.is_corner()
                    || self.nodes[b.index()].kind.is_corner();
                if corner_involved {
                    FACILITY_CORNER_PENALTY
                } else {
                    FACILITY_FACILITY_PENALTY
                }
            }
            _ => 1.0,
        };

        let base_m =
            self.nodes[a.index()].pos.distance_m(self.nodes[b.index()].pos) * factor;

        self.nodes[a.index()].edges.push(Edge::new(b, base_m, class));
        self.nodes[b.index()].edges.push(Edge::new(a, base_m, class));
        Ok(LinkOutcome::Added)
    }

    /// Remove the road between `a` and `b` (both directions).
    ///
    /// Returns `Ok(true)` if a road was removed, `Ok(false)` if none existed.
    pub fn remove_road(&mut self, a: NodeId, b: NodeId) -> GraphResult<bool> {
        if a.index() >= self.nodes.len() {
            return Err(GraphError::UnknownNode(a));
        }
        if b.index() >= self.nodes.len() {
            return Err(GraphError::UnknownNode(b));
        }
        let before = self.nodes[a.index()].edges.len();
        self.nodes[a.index()].edges.retain(|e| e.to != b);
        let removed = self.nodes[a.index()].edges.len() != before;
        self.nodes[b.index()].edges.retain(|e| e.to != a);
        Ok(removed)
    }

    // ── Internal node creation ────────────────────────────────────────────

    /// Append a node to the arena and the spatial index.  The returned ID is
    /// the arena slot and is stable for the process lifetime.
    pub(crate) fn push_node(
        &mut self,
        name: String,
        kind: NodeKind,
        sector: SectorId,
        pos: GeoPoint,
        external: Option<FacilityId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            name,
            kind,
            sector,
            external,
            pos,
            edges: Vec::new(),
        });
        self.spatial_idx.insert(NodeEntry {
            point: [pos.lat, pos.lon],
            id,
        });
        id
    }
}
