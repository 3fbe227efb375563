//! Shortest-path routing and nearest-facility search.
//!
//! # Two weight views, one algorithm
//!
//! [`CityGraph::shortest_path`] routes over the immutable base weights;
//! [`CityGraph::shortest_path_dynamic`] routes over the traffic-adjusted
//! congested weights refreshed once per tick.  Both share one Dijkstra
//! implementation: a binary min-heap keyed by tentative distance, lazy
//! deletion of stale heap entries via a `visited` array, and parent-array
//! path reconstruction.
//!
//! # Reachability is explicit
//!
//! A query returns [`PathOutcome`], never an ambiguous empty-path/zero-
//! distance pair: `start == end` is `Found` with a one-node route of
//! distance 0, and a disconnected destination is `Unreachable`.
//! UI callers that want the legacy empty-sequence convention use
//! [`PathOutcome::into_nodes`].

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use metro_core::{NodeId, NodeKind};

use crate::graph::CityGraph;
use crate::{GraphError, GraphResult};

// ── Route / PathOutcome ───────────────────────────────────────────────────────

/// A resolved path: the node sequence from start to destination (inclusive)
/// and its total weight in metres.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub nodes: Vec<NodeId>,
    pub total_m: f32,
}

impl Route {
    /// Number of hops (edges) on the route.
    #[inline]
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// `true` if the route starts and ends at the same node.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() <= 1
    }
}

/// The tri-state result of a routing query (start and end IDs were valid;
/// invalid IDs surface as [`GraphError::UnknownNode`] instead).
#[derive(Debug, Clone, PartialEq)]
pub enum PathOutcome {
    /// A path exists; `start == end` yields a single-node route of distance 0.
    Found(Route),
    /// The destination is not reachable from the start.
    Unreachable,
}

impl PathOutcome {
    #[inline]
    pub fn route(&self) -> Option<&Route> {
        match self {
            PathOutcome::Found(r) => Some(r),
            PathOutcome::Unreachable => None,
        }
    }

    #[inline]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, PathOutcome::Unreachable)
    }

    /// Legacy boundary convention: the node sequence, empty when unreachable.
    pub fn into_nodes(self) -> Vec<NodeId> {
        match self {
            PathOutcome::Found(r) => r.nodes,
            PathOutcome::Unreachable => Vec::new(),
        }
    }
}

// ── Weight view ───────────────────────────────────────────────────────────────

/// Which edge weight a Dijkstra run reads.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum WeightView {
    Base,
    Congested,
}

impl WeightView {
    #[inline]
    fn cost(self, edge: &crate::Edge) -> f32 {
        match self {
            WeightView::Base      => edge.base_m,
            WeightView::Congested => edge.congested_m,
        }
    }
}

// ── Public routing API ────────────────────────────────────────────────────────

impl CityGraph {
    /// Shortest path by base (distance) weight.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> GraphResult<PathOutcome> {
        self.dijkstra_to(from, to, WeightView::Base)
    }

    /// Shortest path by the traffic-adjusted weights of the last
    /// [`refresh_congestion`][CityGraph::refresh_congestion] call.
    pub fn shortest_path_dynamic(&self, from: NodeId, to: NodeId) -> GraphResult<PathOutcome> {
        self.dijkstra_to(from, to, WeightView::Congested)
    }

    /// Nearest node of the given kind by base-weight distance, or `None` if
    /// no such node is reachable.  The start node itself never matches.
    pub fn nearest_facility(
        &self,
        from: NodeId,
        target: NodeKind,
    ) -> GraphResult<Option<(NodeId, f32)>> {
        Ok(self.nearest_facilities(from, target, 1)?.into_iter().next())
    }

    /// Up to `limit` nearest nodes of the given kind, ascending by distance.
    ///
    /// This is the same Dijkstra expansion as routing; because Dijkstra
    /// settles nodes in non-decreasing distance order, collecting matches as
    /// they are settled yields the true k-nearest set.
    pub fn nearest_facilities(
        &self,
        from: NodeId,
        target: NodeKind,
        limit: usize,
    ) -> GraphResult<Vec<(NodeId, f32)>> {
        if from.index() >= self.nodes.len() {
            return Err(GraphError::UnknownNode(from));
        }
        let mut found = Vec::with_capacity(limit.min(8));
        if limit == 0 {
            return Ok(found);
        }

        let n = self.nodes.len();
        let mut dist = vec![f32::INFINITY; n];
        let mut visited = vec![false; n];
        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f32>, NodeId)>> = BinaryHeap::new();

        dist[from.index()] = 0.0;
        heap.push(Reverse((OrderedFloat(0.0), from)));

        while let Some(Reverse((OrderedFloat(cost), node))) = heap.pop() {
            if visited[node.index()] {
                continue;
            }
            visited[node.index()] = true;

            if node != from && self.nodes[node.index()].kind.matches(target) {
                found.push((node, cost));
                if found.len() >= limit {
                    break;
                }
            }

            for edge in &self.nodes[node.index()].edges {
                if visited[edge.to.index()] {
                    continue;
                }
                let next = cost + edge.base_m;
                if next < dist[edge.to.index()] {
                    dist[edge.to.index()] = next;
                    heap.push(Reverse((OrderedFloat(next), edge.to)));
                }
            }
        }
        Ok(found)
    }

    // ── Dijkstra core ─────────────────────────────────────────────────────

    fn dijkstra_to(
        &self,
        from: NodeId,
        to: NodeId,
        view: WeightView,
    ) -> GraphResult<PathOutcome> {
        if from.index() >= self.nodes.len() {
            return Err(GraphError::UnknownNode(from));
        }
        if to.index() >= self.nodes.len() {
            return Err(GraphError::UnknownNode(to));
        }
        if from == to {
            return Ok(PathOutcome::Found(Route { nodes: vec![from], total_m: 0.0 }));
        }

        let n = self.nodes.len();
        let mut dist = vec![f32::INFINITY; n];
        let mut visited = vec![false; n];
        let mut parent = vec![NodeId::INVALID; n];

        dist[from.index()] = 0.0;

        // Min-heap: Reverse makes BinaryHeap (max) behave as min-heap.
        // Secondary key NodeId ensures deterministic tie-breaking.
        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f32>, NodeId)>> = BinaryHeap::new();
        heap.push(Reverse((OrderedFloat(0.0), from)));

        while let Some(Reverse((OrderedFloat(cost), node))) = heap.pop() {
            if visited[node.index()] {
                continue; // stale heap entry
            }
            visited[node.index()] = true;

            if node == to {
                return Ok(PathOutcome::Found(self.reconstruct(&parent, from, to, cost)));
            }

            for edge in &self.nodes[node.index()].edges {
                if visited[edge.to.index()] {
                    continue;
                }
                let next = cost + view.cost(edge);
                if next < dist[edge.to.index()] {
                    dist[edge.to.index()] = next;
                    parent[edge.to.index()] = node;
                    heap.push(Reverse((OrderedFloat(next), edge.to)));
                }
            }
        }

        Ok(PathOutcome::Unreachable)
    }

    fn reconstruct(&self, parent: &[NodeId], from: NodeId, to: NodeId, total_m: f32) -> Route {
        let mut nodes = vec![to];
        let mut cur = to;
        while cur != from {
            cur = parent[cur.index()];
            debug_assert_ne!(cur, NodeId::INVALID, "broken parent chain");
            nodes.push(cur);
        }
        nodes.reverse();
        Route { nodes, total_m }
    }
}
