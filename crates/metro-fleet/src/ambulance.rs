//! Ambulances and the inter-hospital patient-transfer lifecycle.
//!
//! # State machine
//!
//! ```text
//! Available → Dispatched → AtPickup → LoadingPatient → Transporting
//!     ▲                                                     │
//!     │                                                     ▼
//!     └───── Returning ← Unloading ← AtDestination ─────────┘
//!
//! Available ⇄ OutOfService   (maintenance side-state)
//! ```
//!
//! An ambulance owns its active [`PatientTransfer`] by value; the transfer
//! is dropped (consumed) on completion.

use log::{debug, info};
use metro_core::{NodeId, SectorId};
use metro_graph::{CityGraph, PathOutcome};

use crate::transfer::PatientTransfer;
use crate::vehicle::{route_to_nodes, HopOutcome, VehicleCore};

// ── Status ────────────────────────────────────────────────────────────────────

/// Where an ambulance is in the transfer lifecycle.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum AmbulanceStatus {
    #[default]
    Available,
    Dispatched,
    AtPickup,
    LoadingPatient,
    Transporting,
    AtDestination,
    Unloading,
    Returning,
    /// Maintenance; reachable only from `Available`.
    OutOfService,
}

// ── Ambulance ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Ambulance {
    pub core: VehicleCore,
    pub status: AmbulanceStatus,

    /// The transfer currently being executed, owned by value.
    pub current_transfer: Option<PatientTransfer>,

    /// Priority sector set: home sector plus its grid neighbors, computed
    /// once at registration.  Used as a cheap pre-filter before distance.
    pub coverage: Vec<SectorId>,

    pub has_advanced_life_support: bool,
    pub has_ventilator: bool,

    pub total_transfers_completed: u64,
}

impl Ambulance {
    pub(crate) fn new(core: VehicleCore, coverage: Vec<SectorId>) -> Self {
        Self {
            core,
            status: AmbulanceStatus::Available,
            current_transfer: None,
            coverage,
            has_advanced_life_support: false,
            has_ventilator: false,
            total_transfers_completed: 0,
        }
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == AmbulanceStatus::Available
    }

    /// Pre-filter for dispatch: does this transfer touch the ambulance's
    /// priority sectors?
    pub fn should_handle_transfer(&self, transfer: &PatientTransfer, graph: &CityGraph) -> bool {
        let covers = |node: NodeId| {
            graph
                .sector_of(node)
                .is_some_and(|s| self.coverage.contains(&s))
        };
        covers(transfer.source_node) || covers(transfer.dest_node)
    }

    // ── Service state ─────────────────────────────────────────────────────

    /// Take the ambulance out of service.  Only possible while `Available`;
    /// returns whether the state changed.
    pub fn set_out_of_service(&mut self) -> bool {
        if self.status == AmbulanceStatus::Available {
            self.status = AmbulanceStatus::OutOfService;
            true
        } else {
            false
        }
    }

    /// Return to service from maintenance.
    pub fn return_to_service(&mut self) -> bool {
        if self.status == AmbulanceStatus::OutOfService {
            self.status = AmbulanceStatus::Available;
            true
        } else {
            false
        }
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Accept a transfer and start driving to the source hospital.
    /// Returns `false` (leaving the transfer untouched) if the ambulance is
    /// not available or the pickup is unreachable.
    pub(crate) fn begin_transfer(
        &mut self,
        graph: &mut CityGraph,
        transfer: PatientTransfer,
    ) -> Result<(), PatientTransfer> {
        if !self.is_available() {
            return Err(transfer);
        }
        if !self.route_to(graph, transfer.source_node) {
            // Already at the source hospital: skip straight to pickup.
            if self.core.current_node() == transfer.source_node {
                self.status = AmbulanceStatus::AtPickup;
                self.current_transfer = Some(transfer);
                return Ok(());
            }
            return Err(transfer);
        }
        info!(
            "{}: dispatched for {} ({} priority)",
            self.core.name, transfer.patient, transfer.priority
        );
        self.status = AmbulanceStatus::Dispatched;
        self.current_transfer = Some(transfer);
        Ok(())
    }

    // ── Per-tick driver ───────────────────────────────────────────────────

    pub fn step(&mut self, graph: &mut CityGraph) {
        match self.status {
            AmbulanceStatus::Available | AmbulanceStatus::OutOfService => {}

            AmbulanceStatus::Dispatched => {
                if self.arrived(graph) {
                    self.status = AmbulanceStatus::AtPickup;
                }
            }

            AmbulanceStatus::AtPickup => {
                self.status = AmbulanceStatus::LoadingPatient;
            }

            AmbulanceStatus::LoadingPatient => {
                self.core.add_passenger();
                let dest = self
                    .current_transfer
                    .as_ref()
                    .map(|t| t.dest_node)
                    .unwrap_or(self.core.home_node);
                if self.route_to(graph, dest) {
                    self.status = AmbulanceStatus::Transporting;
                } else {
                    // Source and destination share a node.
                    self.status = AmbulanceStatus::AtDestination;
                }
            }

            AmbulanceStatus::Transporting => {
                if self.arrived(graph) {
                    self.status = AmbulanceStatus::AtDestination;
                }
            }

            AmbulanceStatus::AtDestination => {
                self.status = AmbulanceStatus::Unloading;
            }

            AmbulanceStatus::Unloading => {
                self.core.remove_passenger();
                if let Some(t) = self.current_transfer.take() {
                    self.total_transfers_completed += 1;
                    info!("{}: transfer {} complete", self.core.name, t.id);
                }
                if self.route_to(graph, self.core.home_node) {
                    self.status = AmbulanceStatus::Returning;
                } else {
                    self.go_available(graph);
                }
            }

            AmbulanceStatus::Returning => {
                if self.arrived(graph) {
                    self.go_available(graph);
                }
            }
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn arrived(&mut self, graph: &mut CityGraph) -> bool {
        match self.core.advance(graph) {
            HopOutcome::AtEnd => {
                self.core.release_edge(graph);
                true
            }
            HopOutcome::Advanced | HopOutcome::Blocked => false,
        }
    }

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

    fn go_available(&mut self, graph: &mut CityGraph) {
        self.core.clear_route(graph);
        self.status = AmbulanceStatus::Available;
        debug!("{}: available at {}", self.core.name, self.core.current_node());
    }
}
