//! School buses: a home-pickup sweep followed by a school delivery leg.
//!
//! # State machine
//!
//! ```text
//! Available → EnRouteHomePickup → AtPickupPoint ─┐
//!      ▲                ▲                        │ more pickups, not full
//!      │                └────────────────────────┘
//!      │                                         │ full or no pickups left
//!      │                                         ▼
//!      └── Returning ← Unloading ← AtSchool ← EnRouteToSchool
//! ```
//!
//! Each transition is an explicit method on the status enum's match arms —
//! there is no string tag to mistype and no fall-through.

use log::debug;
use metro_core::{CitizenId, NodeId};
use metro_graph::{CityGraph, PathOutcome};

use crate::vehicle::{route_to_nodes, HopOutcome, VehicleCore};

// ── Status ────────────────────────────────────────────────────────────────────

/// Where a school bus is in its pickup/delivery cycle.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum SchoolBusStatus {
    #[default]
    Available,
    EnRouteHomePickup,
    AtPickupPoint,
    EnRouteToSchool,
    AtSchool,
    Unloading,
    Returning,
}

// ── Student ───────────────────────────────────────────────────────────────────

/// A student waiting at (or picked up from) a pickup point.
#[derive(Clone, Debug, PartialEq)]
pub struct Student {
    pub id: CitizenId,
    /// The pickup-point node this student waits at.
    pub pickup: NodeId,
}

// ── SchoolBus ─────────────────────────────────────────────────────────────────

/// A bus that sweeps an ordered list of pickup points, then delivers the
/// collected students to its assigned school.
#[derive(Debug)]
pub struct SchoolBus {
    pub core: VehicleCore,
    pub school_node: NodeId,
    pub status: SchoolBusStatus,

    /// Remaining pickup points for the current sweep, in visit order.
    pickups_remaining: Vec<NodeId>,
    /// The full pickup list, restored when a new sweep starts.
    pickup_points: Vec<NodeId>,

    /// Students waiting at pickup points.
    waiting: Vec<Student>,
    pub onboard: Vec<Student>,

    pub total_students_delivered: u64,
    pub sweeps_completed: u32,
}

impl SchoolBus {
    pub(crate) fn new(core: VehicleCore, school_node: NodeId, pickup_points: Vec<NodeId>) -> Self {
        Self {
            core,
            school_node,
            status: SchoolBusStatus::Available,
            pickups_remaining: Vec::new(),
            pickup_points,
            waiting: Vec::new(),
            onboard: Vec::new(),
            total_students_delivered: 0,
            sweeps_completed: 0,
        }
    }

    // ── Student intake ────────────────────────────────────────────────────

    /// Register a student waiting at one of this bus's pickup points.
    /// Returns `false` if `pickup` is not on the pickup list.
    pub fn board_student(&mut self, student: Student) -> bool {
        if !self.pickup_points.contains(&student.pickup) {
            return false;
        }
        self.waiting.push(student);
        true
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    // ── Sweep control ─────────────────────────────────────────────────────

    /// Begin the morning sweep.  No-op unless the bus is `Available` and has
    /// pickup points.
    pub fn start_sweep(&mut self, graph: &mut CityGraph) {
        if self.status != SchoolBusStatus::Available || self.pickup_points.is_empty() {
            return;
        }
        self.pickups_remaining = self.pickup_points.clone();
        debug!("{}: starting sweep of {} pickups", self.core.name, self.pickups_remaining.len());
        if self.core.current_node() == self.pickups_remaining[0] {
            // The depot doubles as the first pickup point.
            self.status = SchoolBusStatus::AtPickupPoint;
        } else if self.route_to(graph, self.pickups_remaining[0]) {
            self.status = SchoolBusStatus::EnRouteHomePickup;
        }
    }

    // ── Per-tick driver ───────────────────────────────────────────────────

    pub fn step(&mut self, graph: &mut CityGraph) {
        match self.status {
            SchoolBusStatus::Available => {}

            SchoolBusStatus::EnRouteHomePickup => {
                if self.arrived(graph) {
                    self.status = SchoolBusStatus::AtPickupPoint;
                }
            }

            SchoolBusStatus::AtPickupPoint => {
                let here = self.core.current_node();
                // Load every waiting student at this point, capacity permitting.
                let mut loaded = 0usize;
                let mut i = 0;
                while i < self.waiting.len() {
                    if self.core.is_full() {
                        break;
                    }
                    if self.waiting[i].pickup == here {
                        let s = self.waiting.swap_remove(i);
                        self.core.add_passenger();
                        self.onboard.push(s);
                        loaded += 1;
                    } else {
                        i += 1;
                    }
                }
                if loaded > 0 {
                    debug!("{}: picked up {loaded} at {here}", self.core.name);
                }
                self.pickups_remaining.retain(|&p| p != here);

                if self.core.is_full() || self.pickups_remaining.is_empty() {
                    if self.route_to(graph, self.school_node) {
                        self.status = SchoolBusStatus::EnRouteToSchool;
                    } else {
                        // Pickup point doubles as the school node.
                        self.status = SchoolBusStatus::AtSchool;
                    }
                } else {
                    let next = self.pickups_remaining[0];
                    if self.route_to(graph, next) {
                        self.status = SchoolBusStatus::EnRouteHomePickup;
                    } else {
                        // Unroutable pickup: drop it and re-evaluate next tick.
                        self.pickups_remaining.retain(|&p| p != next);
                    }
                }
            }

            SchoolBusStatus::EnRouteToSchool => {
                if self.arrived(graph) {
                    self.status = SchoolBusStatus::AtSchool;
                }
            }

            SchoolBusStatus::AtSchool => {
                self.core.release_edge(graph);
                self.status = SchoolBusStatus::Unloading;
            }

            SchoolBusStatus::Unloading => {
                let delivered = self.onboard.len();
                for _ in 0..delivered {
                    self.core.remove_passenger();
                }
                self.onboard.clear();
                self.total_students_delivered += delivered as u64;
                debug!("{}: delivered {delivered} students", self.core.name);
                if self.route_to(graph, self.core.home_node) {
                    self.status = SchoolBusStatus::Returning;
                } else {
                    // Already at home (school == home): sweep is done.
                    self.finish_sweep(graph);
                }
            }

            SchoolBusStatus::Returning => {
                if self.arrived(graph) {
                    self.finish_sweep(graph);
                }
            }
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Advance one hop; `true` once the current leg's target is reached.
    fn arrived(&mut self, graph: &mut CityGraph) -> bool {
        match self.core.advance(graph) {
            HopOutcome::AtEnd => {
                self.core.release_edge(graph);
                true
            }
            HopOutcome::Advanced | HopOutcome::Blocked => false,
        }
    }

    /// Route from the current node to `target` over congested weights.
    /// Returns `false` (and stays put) when the leg is trivial or unroutable.
    fn route_to(&mut self, graph: &mut CityGraph, target: NodeId) -> bool {
        let from = self.core.current_node();
        if from == target {
            return false;
        }
        match graph.shortest_path_dynamic(from, target) {
            Ok(PathOutcome::Found(route)) => {
                let nodes = route_to_nodes(graph, &route);
                self.core.set_route(graph, nodes);
                true
            }
            Ok(PathOutcome::Unreachable) | Err(_) => {
                log::warn!("{}: no route {from} -> {target}", self.core.name);
                false
            }
        }
    }

    fn finish_sweep(&mut self, graph: &mut CityGraph) {
        self.core.clear_route(graph);
        self.status = SchoolBusStatus::Available;
        self.sweeps_completed += 1;
    }
}
