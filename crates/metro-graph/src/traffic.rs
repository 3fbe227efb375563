//! Road occupancy bookkeeping and the congestion weight model.
//!
//! # Model
//!
//! Every road tracks a per-direction vehicle count, kept in lock-step on the
//! two mirror edges.  Once per simulation tick the graph recomputes every
//! edge's congested weight as
//!
//!   congested = base × (1 + (load / capacity)²)
//!
//! The quadratic term makes near-saturated roads disproportionately
//! expensive without ever removing them from routing: at zero load the
//! congested weight equals the base weight, at full capacity it is exactly
//! twice the base weight.
//!
//! # Backpressure
//!
//! [`try_enter_edge`][CityGraph::try_enter_edge] is the system's only
//! backpressure mechanism: a full road rejects the entry and the vehicle
//! state machine retries on a later tick.  Entries and exits are
//! non-blocking and never fatal.

use metro_core::NodeId;

use crate::graph::CityGraph;
use crate::{Edge, GraphError, GraphResult};

impl CityGraph {
    /// Occupy one slot on the road `a`↔`b` (both directions, lock-step).
    ///
    /// Returns `Ok(true)` if the vehicle entered, `Ok(false)` if the road is
    /// at capacity.  Unknown nodes or a missing road are errors — a capacity
    /// rejection is the only non-error failure.
    pub fn try_enter_edge(&mut self, a: NodeId, b: NodeId) -> GraphResult<bool> {
        let (ai, bi) = self.edge_pair(a, b)?;
        let fwd = &self.nodes[a.index()].edges[ai];
        if fwd.load >= fwd.capacity {
            return Ok(false);
        }
        self.nodes[a.index()].edges[ai].load += 1;
        self.nodes[b.index()].edges[bi].load += 1;
        Ok(true)
    }

    /// Release one slot on the road `a`↔`b` (both directions, lock-step).
    ///
    /// Load is floored at zero, so a spurious extra release is harmless.
    pub fn leave_edge(&mut self, a: NodeId, b: NodeId) -> GraphResult<()> {
        let (ai, bi) = self.edge_pair(a, b)?;
        {
            let e = &mut self.nodes[a.index()].edges[ai];
            e.load = e.load.saturating_sub(1);
        }
        {
            let e = &mut self.nodes[b.index()].edges[bi];
            e.load = e.load.saturating_sub(1);
        }
        Ok(())
    }

    /// Recompute every edge's congested weight from its current load.
    ///
    /// Called once per simulation tick, *before* vehicles and agents move,
    /// so all routing during a tick sees the previous tick's congestion
    /// snapshot.
    pub fn refresh_congestion(&mut self) {
        for node in &mut self.nodes {
            for edge in &mut node.edges {
                let c = edge.congestion();
                edge.congested_m = edge.base_m * (1.0 + c * c);
            }
        }
    }

    /// The edge `a`→`b`, or `None` if the nodes are unknown or unlinked.
    pub fn edge(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
        self.nodes.get(a.index()).and_then(|n| n.edge_to(b))
    }

    /// Current load of the edge `a`→`b`, or `None` if it does not exist.
    pub fn edge_load(&self, a: NodeId, b: NodeId) -> Option<u16> {
        self.edge(a, b).map(|e| e.load)
    }

    /// Total vehicles currently on roads (each occupies one directed pair,
    /// counted once).
    pub fn vehicles_on_roads(&self) -> usize {
        let directed: usize = self
            .nodes
            .iter()
            .flat_map(|n| n.edges.iter())
            .map(|e| e.load as usize)
            .sum();
        directed / 2
    }

    /// Indices of the mirror edges `a`→`b` and `b`→`a` in their respective
    /// adjacency lists.
    fn edge_pair(&self, a: NodeId, b: NodeId) -> GraphResult<(usize, usize)> {
        if a.index() >= self.nodes.len() {
            return Err(GraphError::UnknownNode(a));
        }
        if b.index() >= self.nodes.len() {
            return Err(GraphError::UnknownNode(b));
        }
        let ai = self.nodes[a.index()]
            .edges
            .iter()
            .position(|e| e.to == b)
            .ok_or(GraphError::NoSuchRoad { a, b })?;
        let bi = self.nodes[b.index()]
            .edges
            .iter()
            .position(|e| e.to == a)
            .ok_or(GraphError::NoSuchRoad { a: b, b: a })?;
        Ok((ai, bi))
    }
}
