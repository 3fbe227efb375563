//! The `CitySim` struct and its tick loop.

use log::debug;
use metro_agent::Citizen;
use metro_core::{SimClock, SimConfig};
use metro_fleet::FleetManager;
use metro_graph::CityGraph;

use crate::observer::SimObserver;
use crate::stats::TickStats;

/// School buses leave their depots at this hour, ahead of the 08:00 bell.
const SCHOOL_SWEEP_HOUR: u32 = 7;

/// The main simulation runner.
///
/// One [`CitySim::tick`] advances, strictly in this order:
///
/// 1. **Congestion refresh** — every edge's traffic-adjusted weight is
///    recomputed from the load left by the *previous* tick, so all routing
///    during this tick sees a consistent one-tick-old congestion snapshot.
/// 2. **Fleets** — every bus, school bus, and ambulance takes one action
///    (service a stop, move one hop, or a state transition), then the
///    pending-transfer queue is drained against available ambulances.
/// 3. **Citizens** — every citizen decays, walks, or runs its decision
///    table, issuing at most one path request.
///
/// There is one logical thread of control: no operation blocks, suspends,
/// or observes a partially-updated tick.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct CitySim {
    pub config: SimConfig,
    pub clock: SimClock,
    pub graph: CityGraph,
    pub fleet: FleetManager,
    pub citizens: Vec<Citizen>,
}

impl std::fmt::Debug for CitySim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CitySim")
            .field("clock", &self.clock)
            .field("node_count", &self.graph.node_count())
            .field("citizen_count", &self.citizens.len())
            .finish_non_exhaustive()
    }
}

impl CitySim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()`, invoking observer
    /// hooks at every tick boundary.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        while self.clock.current_tick < self.config.end_tick() {
            self.observed_tick(observer);
        }
        observer.on_sim_end(self.clock.current_tick);
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.observed_tick(observer);
        }
    }

    /// Advance the simulation by one tick without observer callbacks.
    pub fn tick(&mut self) {
        let now = self.clock.current_tick;

        // Phase 1: congestion snapshot from last tick's loads.
        self.graph.refresh_congestion();

        // Phase 2: scheduled fleet events, then one fleet action each.
        if self.clock.hour_of_day() == SCHOOL_SWEEP_HOUR && self.at_hour_start() {
            debug!("{now}: school sweep hour, dispatching school buses");
            self.fleet.start_school_sweeps(&mut self.graph);
        }
        self.fleet.tick(&mut self.graph);

        // Phase 3: citizens.
        for citizen in &mut self.citizens {
            metro_agent::step(citizen, &self.graph, &self.clock);
        }

        self.clock.advance();
    }

    /// Statistics snapshot for the current state.
    pub fn stats(&self) -> TickStats {
        TickStats::collect(self.fleet.stats(&self.graph), &self.citizens)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn observed_tick<O: SimObserver>(&mut self, observer: &mut O) {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        self.tick();
        observer.on_tick_end(now);
        if self.config.stats_interval_ticks > 0
            && now.0.is_multiple_of(self.config.stats_interval_ticks)
        {
            let stats = self.stats();
            observer.on_stats(now, &stats);
        }
    }

    /// `true` on the first tick of the current wall-clock hour.
    fn at_hour_start(&self) -> bool {
        self.clock.current_unix_secs().rem_euclid(3_600)
            < self.clock.tick_duration_secs as i64
    }
}
