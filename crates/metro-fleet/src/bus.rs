//! City buses: fixed routes, per-stop waiting queues, fares.
//!
//! # Stop protocol
//!
//! A bus services the stop it just arrived at before moving again, and it
//! always alights before boarding so freed seats are available to the
//! waiting queue.  Boarding only admits passengers whose destination lies
//! **later** on the route than the bus's current position — anyone else
//! would ride away from their stop and never reach it.
//!
//! Round-trip buses reverse their route and swap start/end stops on trip
//! completion instead of terminating.

use std::collections::VecDeque;

use log::{debug, info};
use metro_core::{CitizenId, NodeId};
use metro_graph::CityGraph;
use rustc_hash::FxHashMap;

use crate::vehicle::{HopOutcome, RouteNode, VehicleCore};

/// Bounded length of each stop's waiting queue.
pub const STOP_QUEUE_CAP: usize = 8;

// ── Passenger ─────────────────────────────────────────────────────────────────

/// A fare-paying rider waiting at a stop or on board.
#[derive(Clone, Debug, PartialEq)]
pub struct Passenger {
    pub id: CitizenId,
    /// The route node where this passenger wants to get off.
    pub destination: NodeId,
    pub fare: f32,
}

// ── Bus ───────────────────────────────────────────────────────────────────────

/// A fixed-route city bus.
#[derive(Debug)]
pub struct Bus {
    pub core: VehicleCore,

    /// Waiting passengers keyed by stop, each queue bounded at
    /// [`STOP_QUEUE_CAP`], FIFO.
    waiting: FxHashMap<NodeId, VecDeque<Passenger>>,

    pub onboard: Vec<Passenger>,

    /// Whether the bus reverses at the route end instead of terminating.
    pub round_trip: bool,
    pub start_stop: NodeId,
    pub end_stop: NodeId,

    /// `false` once a one-way bus has completed its trip.
    pub active: bool,

    /// The current stop has been serviced; next action is movement.
    stop_serviced: bool,

    pub total_passengers_served: u64,
    pub total_fare_collected: f32,
    pub trips_completed: u32,
}

impl Bus {
    /// Create a bus on `route` (already expanded to a hop-connected path).
    pub(crate) fn new(mut core: VehicleCore, route: Vec<RouteNode>, round_trip: bool) -> Self {
        let start_stop = route.first().map(|r| r.node).unwrap_or(core.home_node);
        let end_stop = route.last().map(|r| r.node).unwrap_or(core.home_node);
        core.route = route;
        Self {
            core,
            waiting: FxHashMap::default(),
            onboard: Vec::new(),
            round_trip,
            start_stop,
            end_stop,
            active: true,
            stop_serviced: false,
            total_passengers_served: 0,
            total_fare_collected: 0.0,
            trips_completed: 0,
        }
    }

    // ── Passenger intake ──────────────────────────────────────────────────

    /// Queue a passenger at `stop`.  Fails (returns `false`) if the stop is
    /// not on the route, the queue is full, or the destination is not on the
    /// route at all.
    pub fn add_waiting_passenger(&mut self, stop: NodeId, passenger: Passenger) -> bool {
        let on_route = |node: NodeId| self.core.route.iter().any(|r| r.node == node);
        if !on_route(stop) || !on_route(passenger.destination) {
            return false;
        }
        let queue = self.waiting.entry(stop).or_default();
        if queue.len() >= STOP_QUEUE_CAP {
            return false;
        }
        queue.push_back(passenger);
        true
    }

    /// Number of passengers waiting at `stop`.
    pub fn waiting_at(&self, stop: NodeId) -> usize {
        self.waiting.get(&stop).map(VecDeque::len).unwrap_or(0)
    }

    // ── Stop servicing ────────────────────────────────────────────────────

    /// Alight then board at the current stop.  Returns `(alighted, boarded)`.
    pub fn process_stop(&mut self) -> (usize, usize) {
        let here = self.core.current_node();

        // Alight first: frees capacity before boarding.
        let before = self.onboard.len();
        let mut collected = 0.0f32;
        self.onboard.retain(|p| {
            if p.destination == here {
                collected += p.fare;
                false
            } else {
                true
            }
        });
        let alighted = before - self.onboard.len();
        for _ in 0..alighted {
            self.core.remove_passenger();
        }
        self.total_passengers_served += alighted as u64;
        self.total_fare_collected += collected;

        // Board: only passengers whose destination is still ahead.
        let mut boarded = 0usize;
        if let Some(queue) = self.waiting.get_mut(&here) {
            // One pass over the queue; non-boardable passengers rotate to
            // the back and wait for the return trip.
            for _ in 0..queue.len() {
                if self.core.is_full() {
                    break;
                }
                let Some(p) = queue.pop_front() else { break };
                let ahead = self.core.route[self.core.position + 1..]
                    .iter()
                    .any(|r| r.node == p.destination);
                if ahead {
                    self.core.add_passenger();
                    self.onboard.push(p);
                    boarded += 1;
                } else {
                    queue.push_back(p);
                }
            }
        }

        if alighted + boarded > 0 {
            debug!(
                "{}: stop {here}: {alighted} off, {boarded} on ({} aboard)",
                self.core.name, self.core.occupancy
            );
        }
        (alighted, boarded)
    }

    // ── Trip completion ───────────────────────────────────────────────────

    /// Handle arrival at the final stop: reverse for round-trip buses,
    /// retire one-way buses.
    pub fn complete_trip(&mut self, graph: &mut CityGraph) {
        self.trips_completed += 1;
        if self.round_trip {
            self.core.release_edge(graph);
            let mut nodes: Vec<NodeId> = self.core.route.iter().map(|r| r.node).collect();
            nodes.reverse();
            // Rebuild cumulative distances for the reversed direction.
            let mut route = Vec::with_capacity(nodes.len());
            let mut cumulative = 0.0f32;
            for (i, &node) in nodes.iter().enumerate() {
                if i > 0 {
                    if let Some(edge) = graph.edge(nodes[i - 1], node) {
                        cumulative += edge.base_m;
                    }
                }
                route.push(RouteNode { node, cumulative_m: cumulative });
            }
            self.core.route = route;
            self.core.position = 0;
            std::mem::swap(&mut self.start_stop, &mut self.end_stop);
            self.stop_serviced = false;
            debug!("{}: reversed at {}", self.core.name, self.start_stop);
        } else {
            self.core.clear_route(graph);
            self.active = false;
            info!("{}: one-way trip complete", self.core.name);
        }
    }

    // ── Per-tick driver ───────────────────────────────────────────────────

    /// One simulation tick: service the current stop, else move one hop,
    /// else complete the trip.
    pub fn step(&mut self, graph: &mut CityGraph) {
        if !self.active {
            return;
        }
        if !self.stop_serviced {
            self.core.release_edge(graph);
            self.process_stop();
            self.stop_serviced = true;
            return;
        }
        match self.core.advance(graph) {
            HopOutcome::Advanced => {
                self.stop_serviced = false;
            }
            HopOutcome::Blocked => {
                // Road full; retry next tick.
            }
            HopOutcome::AtEnd => self.complete_trip(graph),
        }
    }
}
