//! Keyed directories of named institutions (hospitals, schools, malls).
//!
//! The core treats these as opaque reference data: a transfer request looks
//! up a hospital's graph node here, the school-bus wiring looks up school
//! nodes, and the UI layers query by sector.  Lookups are hash-backed —
//! `by_id` is O(1), `in_sector` is O(1) to the bucket.

use metro_core::{FacilityId, FacilityKind, NodeId, SectorId};
use rustc_hash::FxHashMap;

/// One institution row, resolved against the graph.
#[derive(Clone, Debug)]
pub struct Institution {
    pub id: FacilityId,
    pub name: String,
    pub kind: FacilityKind,
    pub sector: SectorId,
    /// Domain capacity (hospital beds, school seats, mall shops…); opaque
    /// to the core.
    pub capacity: u32,
    /// The graph node this institution was placed at.
    pub node: NodeId,
}

/// A registry of institutions for one domain (medical, education,
/// commercial), built by the dataset loaders before simulation starts.
#[derive(Default)]
pub struct Directory {
    entries: FxHashMap<FacilityId, Institution>,
    by_sector: FxHashMap<SectorId, Vec<FacilityId>>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, institution: Institution) {
        self.by_sector
            .entry(institution.sector)
            .or_default()
            .push(institution.id);
        self.entries.insert(institution.id, institution);
    }

    /// O(1) lookup by external ID.
    pub fn by_id(&self, id: FacilityId) -> Option<&Institution> {
        self.entries.get(&id)
    }

    /// The graph node of an institution, if registered.
    pub fn node_of(&self, id: FacilityId) -> Option<NodeId> {
        self.entries.get(&id).map(|i| i.node)
    }

    /// All institution IDs homed in `sector`.
    pub fn in_sector(&self, sector: SectorId) -> &[FacilityId] {
        self.by_sector.get(&sector).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All institutions of the given kind, in arbitrary order.
    pub fn of_kind(&self, kind: FacilityKind) -> Vec<&Institution> {
        self.entries.values().filter(|i| i.kind == kind).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Institution> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
