//! The fleet manager: vehicle registries, lookup indexes, transfer triage,
//! and the per-tick fleet driver.

use log::{debug, info};
use metro_core::{NodeId, SectorId, TransferId, VehicleId};
use metro_graph::CityGraph;
use rustc_hash::FxHashMap;

use crate::ambulance::Ambulance;
use crate::bus::Bus;
use crate::school_bus::SchoolBus;
use crate::transfer::{PatientTransfer, TransferPriority, TransferQueue};
use crate::vehicle::{expand_stops, VehicleCore};
use crate::{FleetError, FleetResult};

// ── Lookup plumbing ───────────────────────────────────────────────────────────

/// Which registry a `VehicleId` lives in.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum VehicleKind {
    Bus,
    SchoolBus,
    Ambulance,
}

// ── Transfer request ──────────────────────────────────────────────────────────

/// Input to [`FleetManager::request_transfer`].  Hospital node IDs are
/// resolved by the caller (the medical directory knows the mapping).
#[derive(Clone, Debug)]
pub struct TransferRequest {
    pub patient: String,
    pub source_hospital: metro_core::FacilityId,
    pub dest_hospital: metro_core::FacilityId,
    pub source_node: NodeId,
    pub dest_node: NodeId,
    pub priority: TransferPriority,
    pub condition: String,
}

// ── Stats ─────────────────────────────────────────────────────────────────────

/// Point-in-time fleet statistics for UI layers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FleetStats {
    pub buses: usize,
    pub school_buses: usize,
    pub ambulances: usize,
    pub available_ambulances: usize,
    pub pending_transfers: usize,
    pub passengers_onboard: usize,
    pub students_onboard: usize,
    pub total_passengers_served: u64,
    pub total_transfers_completed: u64,
    pub vehicles_on_roads: usize,
}

// ── FleetManager ──────────────────────────────────────────────────────────────

/// Owns every fleet vehicle for its lifetime and drives them each tick.
#[derive(Default)]
pub struct FleetManager {
    buses: Vec<Bus>,
    school_buses: Vec<SchoolBus>,
    ambulances: Vec<Ambulance>,

    index: FxHashMap<VehicleId, (VehicleKind, usize)>,
    by_company: FxHashMap<String, Vec<VehicleId>>,
    by_sector: FxHashMap<SectorId, Vec<VehicleId>>,

    pending: TransferQueue,

    next_vehicle: u32,
    next_transfer: u32,
}

impl FleetManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Register a city bus on an ordered stop list.  Consecutive stops are
    /// expanded to full road paths, so every hop of the final route is a
    /// real road.
    pub fn register_bus(
        &mut self,
        graph: &mut CityGraph,
        name: impl Into<String>,
        company: impl Into<String>,
        stops: &[NodeId],
        capacity: u16,
        round_trip: bool,
    ) -> FleetResult<VehicleId> {
        let route = expand_stops(graph, stops)?;
        let home_node = stops[0];
        let core = self.make_core(graph, name.into(), company.into(), home_node, capacity);
        let id = core.id;
        let bus = Bus::new(core, route, round_trip);
        self.index.insert(id, (VehicleKind::Bus, self.buses.len()));
        self.buses.push(bus);
        debug!("registered bus {id} with {} stops", stops.len());
        Ok(id)
    }

    /// Register a school bus with its assigned school and ordered pickup
    /// points.
    pub fn register_school_bus(
        &mut self,
        graph: &mut CityGraph,
        name: impl Into<String>,
        company: impl Into<String>,
        home_node: NodeId,
        school_node: NodeId,
        pickup_points: Vec<NodeId>,
        capacity: u16,
    ) -> FleetResult<VehicleId> {
        if graph.node(school_node).is_none() {
            return Err(metro_graph::GraphError::UnknownNode(school_node).into());
        }
        let core = self.make_core(graph, name.into(), company.into(), home_node, capacity);
        let id = core.id;
        let bus = SchoolBus::new(core, school_node, pickup_points);
        self.index
            .insert(id, (VehicleKind::SchoolBus, self.school_buses.len()));
        self.school_buses.push(bus);
        Ok(id)
    }

    /// Register an ambulance stationed at `home_node`.  Its priority sector
    /// set — the home sector plus its grid neighbors — is computed here,
    /// once, from the city layout.
    pub fn register_ambulance(
        &mut self,
        graph: &mut CityGraph,
        name: impl Into<String>,
        company: impl Into<String>,
        home_node: NodeId,
    ) -> FleetResult<VehicleId> {
        let core = self.make_core(graph, name.into(), company.into(), home_node, 1);
        let id = core.id;
        let home_sector = core.home_sector;
        let mut coverage = vec![home_sector];
        coverage.extend(graph.layout().neighbors(home_sector));
        let ambulance = Ambulance::new(core, coverage);
        self.index
            .insert(id, (VehicleKind::Ambulance, self.ambulances.len()));
        self.ambulances.push(ambulance);
        Ok(id)
    }

    fn make_core(
        &mut self,
        graph: &CityGraph,
        name: String,
        company: String,
        home_node: NodeId,
        capacity: u16,
    ) -> VehicleCore {
        let id = VehicleId(self.next_vehicle);
        self.next_vehicle += 1;
        let home_sector = graph.sector_of(home_node).unwrap_or_default();
        self.by_company.entry(company.clone()).or_default().push(id);
        self.by_sector.entry(home_sector).or_default().push(id);
        VehicleCore::new(id, name, company, home_sector, home_node, capacity)
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn kind_of(&self, id: VehicleId) -> Option<VehicleKind> {
        self.index.get(&id).map(|&(k, _)| k)
    }

    pub fn bus(&self, id: VehicleId) -> Option<&Bus> {
        match self.index.get(&id) {
            Some(&(VehicleKind::Bus, i)) => self.buses.get(i),
            _ => None,
        }
    }

    pub fn bus_mut(&mut self, id: VehicleId) -> Option<&mut Bus> {
        match self.index.get(&id) {
            Some(&(VehicleKind::Bus, i)) => self.buses.get_mut(i),
            _ => None,
        }
    }

    pub fn school_bus(&self, id: VehicleId) -> Option<&SchoolBus> {
        match self.index.get(&id) {
            Some(&(VehicleKind::SchoolBus, i)) => self.school_buses.get(i),
            _ => None,
        }
    }

    pub fn school_bus_mut(&mut self, id: VehicleId) -> Option<&mut SchoolBus> {
        match self.index.get(&id) {
            Some(&(VehicleKind::SchoolBus, i)) => self.school_buses.get_mut(i),
            _ => None,
        }
    }

    pub fn ambulance(&self, id: VehicleId) -> Option<&Ambulance> {
        match self.index.get(&id) {
            Some(&(VehicleKind::Ambulance, i)) => self.ambulances.get(i),
            _ => None,
        }
    }

    pub fn ambulance_mut(&mut self, id: VehicleId) -> Option<&mut Ambulance> {
        match self.index.get(&id) {
            Some(&(VehicleKind::Ambulance, i)) => self.ambulances.get_mut(i),
            _ => None,
        }
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn school_buses(&self) -> &[SchoolBus] {
        &self.school_buses
    }

    pub fn school_buses_mut(&mut self) -> &mut [SchoolBus] {
        &mut self.school_buses
    }

    pub fn ambulances(&self) -> &[Ambulance] {
        &self.ambulances
    }

    /// Vehicle IDs registered under `company`.
    pub fn vehicles_of_company(&self, company: &str) -> &[VehicleId] {
        self.by_company.get(company).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Vehicle IDs homed in `sector`.
    pub fn vehicles_in_sector(&self, sector: SectorId) -> &[VehicleId] {
        self.by_sector.get(&sector).map(Vec::as_slice).unwrap_or(&[])
    }

    // ── Maintenance control ───────────────────────────────────────────────

    /// Take an ambulance out of service (`false`) or return it (`true`).
    ///
    /// # Errors
    ///
    /// [`FleetError::UnknownVehicle`] for an unregistered ID or a
    /// non-ambulance, [`FleetError::InvalidState`] if the ambulance is
    /// mid-transfer (only `Available` units can be pulled).
    pub fn set_ambulance_service(
        &mut self,
        id: VehicleId,
        in_service: bool,
    ) -> FleetResult<()> {
        let ambulance = self
            .ambulance_mut(id)
            .ok_or(FleetError::UnknownVehicle(id))?;
        let changed = if in_service {
            ambulance.return_to_service()
        } else {
            ambulance.set_out_of_service()
        };
        if changed {
            Ok(())
        } else {
            Err(FleetError::InvalidState(id))
        }
    }

    // ── Transfer API ──────────────────────────────────────────────────────

    /// Enqueue a patient transfer.  Fire-and-forget: completion is observed
    /// through ambulance status polling and statistics, not a callback.
    pub fn request_transfer(&mut self, req: TransferRequest) -> TransferId {
        let id = TransferId(self.next_transfer);
        self.next_transfer += 1;
        info!(
            "transfer {id}: {} from {} to {} ({})",
            req.patient, req.source_hospital, req.dest_hospital, req.priority
        );
        self.pending.push(PatientTransfer {
            id,
            patient: req.patient,
            source_hospital: req.source_hospital,
            dest_hospital: req.dest_hospital,
            source_node: req.source_node,
            dest_node: req.dest_node,
            priority: req.priority,
            condition: req.condition,
        });
        id
    }

    pub fn pending_transfers(&self) -> usize {
        self.pending.len()
    }

    /// Match the most urgent pending transfer to an available, in-range
    /// ambulance (nearest first, flat distance after the sector pre-filter).
    ///
    /// On success returns the matched pair; if the head transfer cannot be
    /// served this tick it is re-queued and `None` is returned (it keeps its
    /// priority tier and its FIFO position relative to later arrivals of
    /// the same tier is refreshed — acceptable, it is retried every tick).
    pub fn dispatch_next_transfer(
        &mut self,
        graph: &mut CityGraph,
    ) -> Option<(TransferId, VehicleId)> {
        let mut transfer = self.pending.pop()?;
        let Some(source_pos) = graph.position(transfer.source_node) else {
            // Invalid source node: the request can never be served.
            log::warn!("transfer {}: dropped, unknown source node", transfer.id);
            return None;
        };

        // Rank candidate ambulances: available, in coverage, nearest first.
        let mut candidates: Vec<(usize, f32)> = self
            .ambulances
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_available() && a.should_handle_transfer(&transfer, graph))
            .filter_map(|(i, a)| {
                graph
                    .position(a.core.current_node())
                    .map(|p| (i, p.distance_m(source_pos)))
            })
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (i, _) in candidates {
            match self.ambulances[i].begin_transfer(graph, transfer) {
                Ok(()) => {
                    let tid = self
                        .ambulances[i]
                        .current_transfer
                        .as_ref()
                        .map(|t| t.id)
                        .expect("begin_transfer stores the transfer");
                    return Some((tid, self.ambulances[i].core.id));
                }
                Err(returned) => transfer = returned,
            }
        }

        debug!("transfer {}: no ambulance available, re-queued", transfer.id);
        self.pending.push(transfer);
        None
    }

    // ── Per-tick driver ───────────────────────────────────────────────────

    /// Advance every fleet one tick, then drain the transfer queue as far
    /// as available ambulances allow.
    pub fn tick(&mut self, graph: &mut CityGraph) {
        for bus in &mut self.buses {
            bus.step(graph);
        }
        for bus in &mut self.school_buses {
            bus.step(graph);
        }
        for ambulance in &mut self.ambulances {
            ambulance.step(graph);
        }
        // Terminates: a failed match re-queues the transfer and yields None.
        while self.dispatch_next_transfer(graph).is_some() {}
    }

    /// Send every available school bus on its pickup sweep.  Typically
    /// invoked at the morning school hour.
    pub fn start_school_sweeps(&mut self, graph: &mut CityGraph) {
        for bus in &mut self.school_buses {
            bus.start_sweep(graph);
        }
    }

    // ── Stats ─────────────────────────────────────────────────────────────

    pub fn stats(&self, graph: &CityGraph) -> FleetStats {
        FleetStats {
            buses: self.buses.len(),
            school_buses: self.school_buses.len(),
            ambulances: self.ambulances.len(),
            available_ambulances: self.ambulances.iter().filter(|a| a.is_available()).count(),
            pending_transfers: self.pending.len(),
            passengers_onboard: self.buses.iter().map(|b| b.onboard.len()).sum(),
            students_onboard: self.school_buses.iter().map(|b| b.onboard.len()).sum(),
            total_passengers_served: self.buses.iter().map(|b| b.total_passengers_served).sum(),
            total_transfers_completed: self
                .ambulances
                .iter()
                .map(|a| a.total_transfers_completed)
                .sum(),
            vehicles_on_roads: graph.vehicles_on_roads(),
        }
    }
}
