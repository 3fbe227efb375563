//! Shared vehicle mechanics: route following, edge occupancy, and capacity.
//!
//! # Hop model
//!
//! A vehicle advances at most one route hop per tick.  Starting a hop
//! occupies the road (both directions, via the graph's traffic layer); the
//! road stays occupied until the vehicle either services its arrival stop or
//! starts the next hop — so every hop contributes one tick of load that the
//! *next* tick's congestion refresh observes.
//!
//! A capacity rejection from [`CityGraph::try_enter_edge`] leaves the
//! vehicle parked at its current node; the state machine simply retries the
//! same hop next tick.  This is the only backpressure in the system.

use metro_core::{NodeId, SectorId, VehicleId};
use metro_graph::{CityGraph, PathOutcome, Route};

use crate::{FleetError, FleetResult};

// ── RouteNode ─────────────────────────────────────────────────────────────────

/// One stop of a vehicle route: a graph node plus the distance travelled
/// from the route start to reach it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RouteNode {
    pub node: NodeId,
    pub cumulative_m: f32,
}

/// Convert a routing result into `RouteNode`s with running distance.
pub(crate) fn route_to_nodes(graph: &CityGraph, route: &Route) -> Vec<RouteNode> {
    let mut out = Vec::with_capacity(route.nodes.len());
    let mut cumulative = 0.0f32;
    for (i, &node) in route.nodes.iter().enumerate() {
        if i > 0 {
            let prev = route.nodes[i - 1];
            // Every consecutive pair on a routed path shares an edge.
            if let Some(edge) = graph.edge(prev, node) {
                cumulative += edge.base_m;
            }
        }
        out.push(RouteNode { node, cumulative_m: cumulative });
    }
    out
}

/// Expand an ordered list of stops into a full graph path by routing each
/// consecutive pair, so that every hop of the resulting route is a real
/// road.  Returns [`FleetError::UnroutableLeg`] if any pair is disconnected.
pub(crate) fn expand_stops(graph: &CityGraph, stops: &[NodeId]) -> FleetResult<Vec<RouteNode>> {
    if stops.len() < 2 {
        return Err(FleetError::RouteTooShort(stops.len()));
    }
    let mut nodes: Vec<NodeId> = Vec::new();
    for pair in stops.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        match graph.shortest_path(from, to)? {
            PathOutcome::Found(leg) => {
                let skip = usize::from(!nodes.is_empty()); // avoid repeating the joint
                nodes.extend(leg.nodes.into_iter().skip(skip));
            }
            PathOutcome::Unreachable => {
                return Err(FleetError::UnroutableLeg { from, to });
            }
        }
    }
    Ok(route_to_nodes(graph, &Route { total_m: 0.0, nodes }))
}

// ── Hop outcome ───────────────────────────────────────────────────────────────

/// Result of one movement attempt.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum HopOutcome {
    /// Moved one hop; the vehicle now occupies the road it just entered.
    Advanced,
    /// The next road is at capacity; retry next tick.
    Blocked,
    /// Already at the final route node; nothing to advance.
    AtEnd,
}

// ── VehicleCore ───────────────────────────────────────────────────────────────

/// State shared by every fleet vehicle: identity, route progress, occupancy,
/// and the road currently being occupied.
#[derive(Debug)]
pub struct VehicleCore {
    pub id: VehicleId,
    /// Registration / call sign, e.g. `"BUS-012"`.
    pub name: String,
    /// Operating company; indexed by the fleet manager.
    pub company: String,
    pub home_sector: SectorId,
    pub home_node: NodeId,

    /// Ordered route; empty while idle.
    pub route: Vec<RouteNode>,
    /// Index of the current route node.
    pub position: usize,

    pub capacity: u16,
    pub occupancy: u16,

    /// Road entered by the last hop, not yet released.
    occupied_edge: Option<(NodeId, NodeId)>,
}

impl VehicleCore {
    pub fn new(
        id: VehicleId,
        name: String,
        company: String,
        home_sector: SectorId,
        home_node: NodeId,
        capacity: u16,
    ) -> Self {
        Self {
            id,
            name,
            company,
            home_sector,
            home_node,
            route: Vec::new(),
            position: 0,
            capacity,
            occupancy: 0,
            occupied_edge: None,
        }
    }

    // ── Route state ───────────────────────────────────────────────────────

    /// The node the vehicle is currently at (its route position), or its
    /// home node while idle.
    #[inline]
    pub fn current_node(&self) -> NodeId {
        self.route
            .get(self.position)
            .map(|r| r.node)
            .unwrap_or(self.home_node)
    }

    #[inline]
    pub fn at_route_end(&self) -> bool {
        self.route.is_empty() || self.position + 1 >= self.route.len()
    }

    /// Distance travelled so far on the current route.
    #[inline]
    pub fn distance_travelled_m(&self) -> f32 {
        self.route
            .get(self.position)
            .map(|r| r.cumulative_m)
            .unwrap_or(0.0)
    }

    /// Install a new route and rewind to its start.  Any occupied road is
    /// released first.
    pub fn set_route(&mut self, graph: &mut CityGraph, route: Vec<RouteNode>) {
        self.release_edge(graph);
        self.route = route;
        self.position = 0;
    }

    /// Rewind to the route start without changing the route.
    pub fn reset_route(&mut self, graph: &mut CityGraph) {
        self.release_edge(graph);
        self.position = 0;
    }

    /// Drop the route entirely (vehicle becomes idle at its last node).
    pub fn clear_route(&mut self, graph: &mut CityGraph) {
        self.release_edge(graph);
        let last = self.current_node();
        self.route = vec![RouteNode { node: last, cumulative_m: 0.0 }];
        self.position = 0;
    }

    // ── Movement ──────────────────────────────────────────────────────────

    /// Attempt to advance one hop.  See the module docs for the occupancy
    /// protocol.
    pub fn advance(&mut self, graph: &mut CityGraph) -> HopOutcome {
        if self.at_route_end() {
            self.release_edge(graph);
            return HopOutcome::AtEnd;
        }
        self.release_edge(graph);

        let from = self.route[self.position].node;
        let to = self.route[self.position + 1].node;
        match graph.try_enter_edge(from, to) {
            Ok(true) => {
                self.occupied_edge = Some((from, to));
                self.position += 1;
                HopOutcome::Advanced
            }
            Ok(false) => HopOutcome::Blocked,
            Err(e) => {
                // A route hop without a road means the route predates a
                // removed road; treat as blocked and log once per attempt.
                log::warn!("vehicle {}: hop {from}->{to} failed: {e}", self.id);
                HopOutcome::Blocked
            }
        }
    }

    /// Release the road occupied by the last hop, if any.
    pub fn release_edge(&mut self, graph: &mut CityGraph) {
        if let Some((a, b)) = self.occupied_edge.take() {
            if let Err(e) = graph.leave_edge(a, b) {
                log::warn!("vehicle {}: releasing {a}->{b} failed: {e}", self.id);
            }
        }
    }

    /// `true` while the vehicle occupies a road (mid-hop).
    #[inline]
    pub fn on_road(&self) -> bool {
        self.occupied_edge.is_some()
    }

    // ── Occupancy ─────────────────────────────────────────────────────────

    #[inline]
    pub fn is_full(&self) -> bool {
        self.occupancy >= self.capacity
    }

    /// Take one passenger on board.  Returns `false` when full.
    pub fn add_passenger(&mut self) -> bool {
        if self.is_full() {
            return false;
        }
        self.occupancy += 1;
        true
    }

    /// Let one passenger off.  Floored at zero.
    pub fn remove_passenger(&mut self) {
        self.occupancy = self.occupancy.saturating_sub(1);
    }
}
