//! CSV dataset loaders.
//!
//! All loaders come in `_csv` (path) and `_reader` (any `Read`) variants;
//! the reader form takes a `std::io::Cursor` in tests.  Rows are plain
//! serde-derived records, errors carry the offending value.
//!
//! # Formats
//!
//! **Facilities** — points of interest placed with smart insertion:
//!
//! ```csv
//! name,kind,lat,lon
//! Corner Diner,restaurant,30.6912,-88.0432
//! Greenfield Park,park,30.6944,-88.0401
//! ```
//!
//! **Institutions** — hospitals/schools/malls with external IDs, placed on
//! the graph *and* registered in a [`Directory`]:
//!
//! ```csv
//! id,name,kind,capacity,lat,lon
//! 301,Riverton General,hospital,420,30.6905,-88.0410
//! ```
//!
//! **Population** — one citizen per row; coordinates are snapped to the
//! nearest existing graph node, so load facilities first:
//!
//! ```csv
//! id,name,role,wallet,home_lat,home_lon,dest_lat,dest_lon
//! 0,Sam Okafor,worker,120.0,30.6921,-88.0440,30.6950,-88.0390
//! 1,Ada Lin,student,15.0,30.6933,-88.0421,30.6940,-88.0402
//! 2,Rosa Vega,resident,60.0,30.6918,-88.0436,,
//! ```

use std::io::Read;
use std::path::Path;

use log::info;
use serde::Deserialize;

use metro_agent::Citizen;
use metro_core::{CitizenId, FacilityId, FacilityKind, GeoPoint, NodeId};
use metro_graph::CityGraph;

use crate::directory::{Directory, Institution};
use crate::{DataError, DataResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct FacilityRecord {
    name: String,
    kind: String,
    lat: f32,
    lon: f32,
}

#[derive(Deserialize)]
struct InstitutionRecord {
    id: u32,
    name: String,
    kind: String,
    capacity: u32,
    lat: f32,
    lon: f32,
}

#[derive(Deserialize)]
struct PopulationRecord {
    id: u32,
    name: String,
    role: String,
    wallet: f32,
    home_lat: f32,
    home_lon: f32,
    dest_lat: Option<f32>,
    dest_lon: Option<f32>,
}

// ── Facilities ────────────────────────────────────────────────────────────────

/// Load generic points of interest and place them on the graph.
pub fn load_facilities_csv(path: &Path, graph: &mut CityGraph) -> DataResult<Vec<NodeId>> {
    load_facilities_reader(std::fs::File::open(path)?, graph)
}

/// Like [`load_facilities_csv`] but accepts any `Read` source.
pub fn load_facilities_reader<R: Read>(
    reader: R,
    graph: &mut CityGraph,
) -> DataResult<Vec<NodeId>> {
    let mut out = Vec::new();
    for result in csv::Reader::from_reader(reader).deserialize::<FacilityRecord>() {
        let row = result.map_err(|e| DataError::Parse(e.to_string()))?;
        let kind = FacilityKind::parse(&row.kind).ok_or(DataError::UnknownKind(row.kind))?;
        let node = graph.add_facility(row.name, kind, GeoPoint::new(row.lat, row.lon), None)?;
        out.push(node);
    }
    info!("loaded {} facilities", out.len());
    Ok(out)
}

// ── Institutions ──────────────────────────────────────────────────────────────

/// Load hospitals/schools/malls: place each on the graph and register it in
/// the returned [`Directory`].
pub fn load_institutions_csv(path: &Path, graph: &mut CityGraph) -> DataResult<Directory> {
    load_institutions_reader(std::fs::File::open(path)?, graph)
}

/// Like [`load_institutions_csv`] but accepts any `Read` source.
pub fn load_institutions_reader<R: Read>(
    reader: R,
    graph: &mut CityGraph,
) -> DataResult<Directory> {
    let mut directory = Directory::new();
    for result in csv::Reader::from_reader(reader).deserialize::<InstitutionRecord>() {
        let row = result.map_err(|e| DataError::Parse(e.to_string()))?;
        let kind = FacilityKind::parse(&row.kind).ok_or(DataError::UnknownKind(row.kind))?;
        let external = FacilityId(row.id);
        let node = graph.add_facility(
            row.name.clone(),
            kind,
            GeoPoint::new(row.lat, row.lon),
            Some(external),
        )?;
        let sector = graph.sector_of(node).unwrap_or_default();
        directory.insert(Institution {
            id: external,
            name: row.name,
            kind,
            sector,
            capacity: row.capacity,
            node,
        });
    }
    info!("loaded {} institutions", directory.len());
    Ok(directory)
}

// ── Population ────────────────────────────────────────────────────────────────

/// Load the population.  Home and destination coordinates are snapped to
/// the nearest existing graph node, so the road skeleton and facilities
/// must be loaded first.
pub fn load_population_csv(path: &Path, graph: &CityGraph) -> DataResult<Vec<Citizen>> {
    load_population_reader(std::fs::File::open(path)?, graph)
}

/// Like [`load_population_csv`] but accepts any `Read` source.
pub fn load_population_reader<R: Read>(
    reader: R,
    graph: &CityGraph,
) -> DataResult<Vec<Citizen>> {
    let mut citizens = Vec::new();
    for result in csv::Reader::from_reader(reader).deserialize::<PopulationRecord>() {
        let row = result.map_err(|e| DataError::Parse(e.to_string()))?;

        let home = snap(graph, row.home_lat, row.home_lon)?;
        let mut citizen = Citizen::new(CitizenId(row.id), row.name, home, row.wallet);

        let dest = match (row.dest_lat, row.dest_lon) {
            (Some(lat), Some(lon)) => Some(snap(graph, lat, lon)?),
            _ => None,
        };
        citizen = match (row.role.as_str(), dest) {
            ("worker", Some(node)) => citizen.with_work(node),
            ("student", Some(node)) => citizen.with_school(node),
            ("worker" | "student", None) | ("resident", _) => citizen,
            (other, _) => return Err(DataError::UnknownRole(other.to_string())),
        };
        citizens.push(citizen);
    }
    info!("loaded {} citizens", citizens.len());
    Ok(citizens)
}

fn snap(graph: &CityGraph, lat: f32, lon: f32) -> DataResult<NodeId> {
    graph
        .snap_to_node(GeoPoint::new(lat, lon))
        .ok_or_else(|| DataError::Parse("cannot snap coordinates: graph has no nodes".into()))
}
