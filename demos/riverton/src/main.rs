//! Riverton: a 2×2-sector demo town.
//!
//! Builds the road skeleton from a declarative sector layout, ingests the
//! embedded CSV datasets, registers a bus line, a school bus, and two
//! ambulances, fires a few patient transfers, and runs two simulated days.
//!
//! ```sh
//! RUST_LOG=info cargo run -p riverton
//! ```

use std::io::Cursor;

use anyhow::{Context, Result};
use log::info;

use metro_core::{FacilityId, GeoPoint, SimConfig, Tick};
use metro_data::{load_institutions_reader, load_population_reader, load_facilities_reader};
use metro_fleet::{FleetManager, TransferPriority, TransferRequest};
use metro_graph::{CityGraph, SectorLayout};
use metro_sim::{CitySim, SimBuilder, SimObserver, TickStats};

// Embedded datasets: the same formats the CSV loaders accept from disk.

const FACILITIES_CSV: &str = "\
name,kind,lat,lon
Corner Diner,restaurant,30.6910,-88.0560
Harbor Grill,restaurant,30.7050,-88.0150
Greenfield Park,park,30.6950,-88.0520
Bayside Park,park,30.7110,-88.0160
Pine Pharmacy,pharmacy,30.6930,-88.0540
Riverton Logistics,office,30.7070,-88.0120
Old Mill Apartments,residence,30.6905,-88.0575
Dockside Flats,residence,30.7100,-88.0130
";

const INSTITUTIONS_CSV: &str = "\
id,name,kind,capacity,lat,lon
301,Riverton General,hospital,420,30.6920,-88.0530
302,Eastside Medical,hospital,150,30.7080,-88.0100
410,Northside Elementary,school,600,30.7060,-88.0530
510,Riverton Mall,mall,80,30.6940,-88.0130
";

const POPULATION_CSV: &str = "\
id,name,role,wallet,home_lat,home_lon,dest_lat,dest_lon
0,Sam Okafor,worker,120.0,30.6905,-88.0575,30.7070,-88.0120
1,Ada Lin,student,15.0,30.6905,-88.0575,30.7060,-88.0530
2,Rosa Vega,resident,60.0,30.7100,-88.0090,,
3,Miles Tran,worker,85.0,30.7100,-88.0090,30.7070,-88.0120
";

struct HourlyReport;

impl SimObserver for HourlyReport {
    fn on_stats(&mut self, tick: Tick, stats: &TickStats) {
        info!(
            "{tick}: {} walking, {} sleeping, {} working | {} on roads, {} transfers pending",
            stats.citizens_walking,
            stats.citizens_sleeping,
            stats.citizens_working,
            stats.fleet.vehicles_on_roads,
            stats.fleet.pending_transfers,
        );
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        info!("simulation complete at {final_tick}");
    }
}

fn main() -> Result<()> {
    env_logger::init();

    // ── City ──────────────────────────────────────────────────────────────
    let layout = SectorLayout::grid(GeoPoint::new(30.68, -88.06), 2, 2, 0.025);
    let mut graph = CityGraph::new(layout, 2024);
    graph.init_all_sectors()?;

    load_facilities_reader(Cursor::new(FACILITIES_CSV), &mut graph)?;
    let institutions = load_institutions_reader(Cursor::new(INSTITUTIONS_CSV), &mut graph)?;
    let citizens = load_population_reader(Cursor::new(POPULATION_CSV), &graph)?;

    // Transit stops strung along the A1 → B2 diagonal.
    let stops = [
        graph.add_transit_stop("Mill Rd", GeoPoint::new(30.6890, -88.0550))?,
        graph.add_transit_stop("Center St", GeoPoint::new(30.6960, -88.0430))?,
        graph.add_transit_stop("Market Sq", GeoPoint::new(30.7020, -88.0260))?,
        graph.add_transit_stop("Dockside", GeoPoint::new(30.7090, -88.0110))?,
    ];

    info!(
        "built Riverton: {} nodes, {} roads",
        graph.node_count(),
        graph.road_count()
    );

    // ── Fleet ─────────────────────────────────────────────────────────────
    let mut fleet = FleetManager::new();
    fleet.register_bus(&mut graph, "BUS-01", "Riverton Transit", &stops, 24, true)?;

    let school = institutions
        .node_of(FacilityId(410))
        .context("school 410 missing from dataset")?;
    fleet.register_school_bus(
        &mut graph,
        "SCH-01",
        "District 5",
        stops[0],
        school,
        vec![stops[0], stops[1]],
        30,
    )?;

    let general = institutions
        .node_of(FacilityId(301))
        .context("hospital 301 missing from dataset")?;
    let eastside = institutions
        .node_of(FacilityId(302))
        .context("hospital 302 missing from dataset")?;
    fleet.register_ambulance(&mut graph, "AMB-01", "City EMS", general)?;
    fleet.register_ambulance(&mut graph, "AMB-02", "City EMS", eastside)?;

    fleet.request_transfer(TransferRequest {
        patient: "J. Alvarez".into(),
        source_hospital: FacilityId(301),
        dest_hospital: FacilityId(302),
        source_node: general,
        dest_node: eastside,
        priority: TransferPriority::Critical,
        condition: "cardiac".into(),
    });
    fleet.request_transfer(TransferRequest {
        patient: "K. Osei".into(),
        source_hospital: FacilityId(302),
        dest_hospital: FacilityId(301),
        source_node: eastside,
        dest_node: general,
        priority: TransferPriority::Routine,
        condition: "observation".into(),
    });

    // ── Run ───────────────────────────────────────────────────────────────
    let config = SimConfig {
        start_unix_secs: 6 * 3600, // 06:00 Monday
        tick_duration_secs: 60,
        total_ticks: 2 * 1440, // two simulated days
        seed: 2024,
        stats_interval_ticks: 60,
    };
    let mut sim: CitySim = SimBuilder::new(config, graph)
        .fleet(fleet)
        .citizens(citizens)
        .build()?;

    sim.run(&mut HourlyReport);

    // ── Summary ───────────────────────────────────────────────────────────
    let stats = sim.stats();
    info!("=== RIVERTON SUMMARY ===");
    info!("citizens: {}", stats.citizens);
    info!("mean health: {:.1}", stats.mean_health);
    info!("passengers served: {}", stats.fleet.total_passengers_served);
    info!("transfers completed: {}", stats.fleet.total_transfers_completed);
    info!("transfers pending: {}", stats.fleet.pending_transfers);

    Ok(())
}
